/// Vacation request endpoints
///
/// # Endpoints
///
/// - `PUT /v1/users/:user_id/vacation-requests` - File a request
/// - `GET /v1/users/:user_id/vacation-requests` - List requests
/// - `GET /v1/users/:user_id/vacation-requests/:request_id` - Get request
/// - `PATCH /v1/users/:user_id/vacation-requests/:request_id` - Change interval
/// - `DELETE /v1/users/:user_id/vacation-requests/:request_id` - Withdraw
/// - `PUT /v1/users/:user_id/vacation-requests/:request_id/approve/:parent_id` - Approve
///
/// Filing or changing a request notifies the user's direct parent.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;
use vacadm_shared::{
    auth::middleware::AuthContext,
    models::{
        vacation::Vacation,
        vacation_request::{CreateVacationRequest, UpdateVacationRequest, VacationRequest},
    },
    notify::vacation_request_message,
};

/// Requested interval
#[derive(Debug, Deserialize)]
pub struct VacationRequestBody {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

async fn owned_request(
    state: &AppState,
    user_id: Uuid,
    request_id: Uuid,
) -> ApiResult<VacationRequest> {
    let request = state.repo.get_vacation_request_by_id(request_id).await?;
    if request.user_id != user_id {
        return Err(ApiError::NotFound(format!(
            "vacation request not found: {}",
            request_id
        )));
    }
    Ok(request)
}

/// Tells the requester's direct parent about a new or changed request
///
/// Best-effort: failures are logged and never fail the request.
async fn notify_parent(state: &AppState, request: &VacationRequest) {
    let user = match state.repo.get_user_by_id(request.user_id).await {
        Ok(user) => user,
        Err(e) => {
            warn!(user_id = %request.user_id, error = %e, "Cannot load requester for notification");
            return;
        }
    };

    let Some(parent_id) = user.parent_id else {
        return;
    };

    let message = vacation_request_message(&user.first_name, &user.last_name, request.id);
    if let Err(e) = state.notifier.notify_user(parent_id, &message).await {
        warn!(
            request_id = %request.id,
            parent_id = %parent_id,
            error = %e,
            "Vacation request notification failed"
        );
    }
}

/// File a vacation request
///
/// # Endpoint
///
/// ```text
/// PUT /v1/users/:user_id/vacation-requests
/// Authorization: Bearer <jwt_token>
///
/// { "from": "2024-07-01T00:00:00Z", "to": "2024-07-14T00:00:00Z" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: `to` is not after `from`
pub async fn create_vacation_request(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<VacationRequestBody>,
) -> ApiResult<(StatusCode, Json<VacationRequest>)> {
    let request = state
        .repo
        .create_vacation_request(CreateVacationRequest {
            user_id,
            from: body.from,
            to: body.to,
        })
        .await?;

    info!(request_id = %request.id, user_id = %user_id, "Vacation request filed");
    notify_parent(&state, &request).await;

    Ok((StatusCode::CREATED, Json(request)))
}

pub async fn list_vacation_requests(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<VacationRequest>>> {
    Ok(Json(state.repo.list_user_vacation_requests(user_id).await?))
}

pub async fn get_vacation_request(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<VacationRequest>> {
    Ok(Json(owned_request(&state, user_id, request_id).await?))
}

/// Replace the requested interval
pub async fn update_vacation_request(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<VacationRequestBody>,
) -> ApiResult<Json<VacationRequest>> {
    owned_request(&state, user_id, request_id).await?;

    let request = state
        .repo
        .update_vacation_request(
            request_id,
            UpdateVacationRequest {
                from: body.from,
                to: body.to,
            },
        )
        .await?;

    notify_parent(&state, &request).await;

    Ok(Json(request))
}

pub async fn delete_vacation_request(
    State(state): State<AppState>,
    Path((user_id, request_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    owned_request(&state, user_id, request_id).await?;
    state.repo.delete_vacation_request(request_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Approve a vacation request
///
/// The caller must be the approver named in the path, and the approver must
/// be a transitive parent of the requesting user.
///
/// # Errors
///
/// - `403 Forbidden`: caller is not `parent_id`, or `parent_id` is not an
///   ancestor of `user_id`
/// - `404 Not Found`: request unknown or not owned by `user_id`
pub async fn approve_vacation_request(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((user_id, request_id, parent_id)): Path<(Uuid, Uuid, Uuid)>,
) -> ApiResult<(StatusCode, Json<Vacation>)> {
    if auth.user_id != parent_id {
        return Err(ApiError::Forbidden(
            "Only the named approver may approve this request".to_string(),
        ));
    }

    let token = state.request_token();
    let vacation = state
        .approval()
        .approve(request_id, user_id, parent_id, &token)
        .await?;

    Ok((StatusCode::CREATED, Json(vacation)))
}
