/// Team capacity endpoint
///
/// # Endpoint
///
/// ```text
/// GET /v1/capacity?from=2024-01-01T00:00:00Z&to=2024-01-15T00:00:00Z[&team_id=uuid]
/// Authorization: Bearer <jwt_token>
/// Accept: text/csv
/// ```
///
/// Returns one record per team (or only `team_id`) classifying its
/// availability over the window. `Accept: text/csv` or `application/csv`
/// selects the CSV report, anything else JSON.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use vacadm_shared::{
    auth::middleware::AuthContext,
    capacity::{
        report::{render, ReportFormat},
        CapacityQuery,
    },
};

/// Query string of the capacity endpoint
#[derive(Debug, Deserialize)]
pub struct CapacityParams {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub team_id: Option<Uuid>,
}

impl From<CapacityParams> for CapacityQuery {
    fn from(params: CapacityParams) -> Self {
        CapacityQuery {
            from: params.from,
            to: params.to,
            team_id: params.team_id,
        }
    }
}

/// Computes and renders team capacity
///
/// # Errors
///
/// - `400 Bad Request`: `from` is not before `to`
/// - `404 Not Found`: `team_id` names an unknown team
/// - `503 Service Unavailable`: server shutting down
pub async fn get_capacity(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    headers: HeaderMap,
    Query(params): Query<CapacityParams>,
) -> ApiResult<Response> {
    let format = ReportFormat::from_accept(
        headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok()),
    );

    let token = state.request_token();
    let records = state
        .capacity()
        .compute(&params.into(), auth.user_id, &token)
        .await?;

    let body = render(&records, format).await?;

    Ok(([(header::CONTENT_TYPE, format.content_type())], body).into_response())
}
