/// Vacation entitlement endpoints
///
/// # Endpoints
///
/// - `PUT /v1/users/:user_id/vacation-resources` - Create entitlement
/// - `GET /v1/users/:user_id/vacation-resources` - List entitlements
/// - `GET /v1/users/:user_id/vacation-resources/:resource_id` - Get entitlement
/// - `PATCH /v1/users/:user_id/vacation-resources/:resource_id` - Replace entitlement
/// - `DELETE /v1/users/:user_id/vacation-resources/:resource_id` - Delete entitlement

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;
use vacadm_shared::models::vacation_resource::{
    CreateVacationResource, UpdateVacationResource, VacationResource,
};

/// Entitlement body, used for both create and replace
#[derive(Debug, Deserialize, Validate)]
pub struct VacationResourceBody {
    #[validate(range(min = 0, max = 366, message = "Yearly days must be between 0 and 366"))]
    pub yearly_days: i32,

    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

async fn owned_resource(
    state: &AppState,
    user_id: Uuid,
    resource_id: Uuid,
) -> ApiResult<VacationResource> {
    let resource = state.repo.get_vacation_resource_by_id(resource_id).await?;
    if resource.user_id != user_id {
        return Err(ApiError::NotFound(format!(
            "vacation resource not found: {}",
            resource_id
        )));
    }
    Ok(resource)
}

pub async fn create_vacation_resource(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<VacationResourceBody>,
) -> ApiResult<(StatusCode, Json<VacationResource>)> {
    body.validate()?;

    let resource = state
        .repo
        .create_vacation_resource(CreateVacationResource {
            user_id,
            yearly_days: body.yearly_days,
            from: body.from,
            to: body.to,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(resource)))
}

pub async fn list_vacation_resources(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<VacationResource>>> {
    Ok(Json(state.repo.list_user_vacation_resources(user_id).await?))
}

pub async fn get_vacation_resource(
    State(state): State<AppState>,
    Path((user_id, resource_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<VacationResource>> {
    Ok(Json(owned_resource(&state, user_id, resource_id).await?))
}

pub async fn update_vacation_resource(
    State(state): State<AppState>,
    Path((user_id, resource_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<VacationResourceBody>,
) -> ApiResult<Json<VacationResource>> {
    body.validate()?;
    owned_resource(&state, user_id, resource_id).await?;

    let resource = state
        .repo
        .update_vacation_resource(
            resource_id,
            UpdateVacationResource {
                yearly_days: body.yearly_days,
                from: body.from,
                to: body.to,
            },
        )
        .await?;

    Ok(Json(resource))
}

pub async fn delete_vacation_resource(
    State(state): State<AppState>,
    Path((user_id, resource_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    owned_resource(&state, user_id, resource_id).await?;
    state.repo.delete_vacation_resource(resource_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
