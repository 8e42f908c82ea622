/// Approved vacation endpoints
///
/// # Endpoints
///
/// - `GET /v1/users/:user_id/vacations` - List vacations
/// - `GET /v1/users/:user_id/vacations/:vacation_id` - Get vacation
/// - `DELETE /v1/users/:user_id/vacations/:vacation_id` - Delete vacation
///
/// Vacations are created only by approving a vacation request.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::info;
use uuid::Uuid;
use vacadm_shared::{auth::middleware::AuthContext, models::vacation::Vacation};

/// Loads a vacation, reporting one owned by somebody else as missing
async fn owned_vacation(state: &AppState, user_id: Uuid, vacation_id: Uuid) -> ApiResult<Vacation> {
    let vacation = state.repo.get_vacation_by_id(vacation_id).await?;
    if vacation.user_id != user_id {
        return Err(ApiError::NotFound(format!("vacation not found: {}", vacation_id)));
    }
    Ok(vacation)
}

pub async fn list_vacations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<Vec<Vacation>>> {
    Ok(Json(state.repo.list_user_vacations(user_id).await?))
}

pub async fn get_vacation(
    State(state): State<AppState>,
    Path((user_id, vacation_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vacation>> {
    Ok(Json(owned_vacation(&state, user_id, vacation_id).await?))
}

pub async fn delete_vacation(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path((user_id, vacation_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<StatusCode> {
    owned_vacation(&state, user_id, vacation_id).await?;
    state.repo.delete_vacation(vacation_id).await?;

    info!(
        vacation_id = %vacation_id,
        user_id = %user_id,
        deleted_by = %auth.user_id,
        "Vacation deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
