/// Team management endpoints
///
/// # Endpoints
///
/// - `PUT /v1/teams` - Create team
/// - `GET /v1/teams` - List teams
/// - `GET /v1/teams/:team_id` - Get team
/// - `PATCH /v1/teams/:team_id` - Update team
/// - `DELETE /v1/teams/:team_id` - Delete team
/// - `GET /v1/teams/:team_id/users` - List team members
///
/// Routes carrying `:team_id` are only reachable by members and the owner.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;
use vacadm_shared::{
    auth::middleware::AuthContext,
    models::{
        team::{CreateTeam, Team, UpdateTeam},
        user::User,
    },
};

/// Create team request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTeamRequest {
    /// Owner of the team; defaults to the caller
    pub owner_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
}

/// Update team request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTeamRequest {
    pub owner_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
}

/// Create team
///
/// # Endpoint
///
/// ```text
/// PUT /v1/teams
/// Authorization: Bearer <jwt_token>
///
/// { "name": "Platform" }
/// ```
pub async fn create_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateTeamRequest>,
) -> ApiResult<(StatusCode, Json<Team>)> {
    req.validate()?;

    let team = state
        .repo
        .create_team(CreateTeam {
            owner_id: req.owner_id.unwrap_or(auth.user_id),
            name: req.name,
        })
        .await?;

    info!(team_id = %team.id, owner_id = %team.owner_id, "Team created");

    Ok((StatusCode::CREATED, Json(team)))
}

pub async fn list_teams(State(state): State<AppState>) -> ApiResult<Json<Vec<Team>>> {
    Ok(Json(state.repo.list_teams().await?))
}

pub async fn get_team(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Team>> {
    Ok(Json(state.repo.get_team_by_id(team_id).await?))
}

pub async fn update_team(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
    Json(req): Json<UpdateTeamRequest>,
) -> ApiResult<Json<Team>> {
    req.validate()?;

    let team = state
        .repo
        .update_team(
            team_id,
            UpdateTeam {
                owner_id: req.owner_id,
                name: req.name,
            },
        )
        .await?;

    Ok(Json(team))
}

pub async fn delete_team(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.repo.delete_team(team_id).await?;
    info!(team_id = %team_id, deleted_by = %auth.user_id, "Team deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Live members of a team
pub async fn list_team_users(
    State(state): State<AppState>,
    Path(team_id): Path<Uuid>,
) -> ApiResult<Json<Vec<User>>> {
    // Distinguish an unknown team from an empty one
    state.repo.get_team_by_id(team_id).await?;
    Ok(Json(state.repo.list_team_users(team_id).await?))
}
