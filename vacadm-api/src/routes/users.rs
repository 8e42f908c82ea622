/// User management endpoints
///
/// # Endpoints
///
/// - `PUT /v1/users` - Create user
/// - `GET /v1/users` - List users
/// - `GET /v1/users/:user_id` - Get user
/// - `PATCH /v1/users/:user_id` - Update user
/// - `DELETE /v1/users/:user_id` - Delete user

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
    models::user::{CreateUser, UpdateUser, User},
};

/// Create user request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Direct parent of the new user
    pub parent_id: Option<Uuid>,

    pub team_id: Option<Uuid>,

    #[validate(length(max = 255, message = "First name must be at most 255 characters"))]
    #[serde(default)]
    pub first_name: String,

    #[validate(length(max = 255, message = "Last name must be at most 255 characters"))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Update user request; absent fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    pub parent_id: Option<Uuid>,

    pub team_id: Option<Uuid>,

    #[validate(length(max = 255, message = "First name must be at most 255 characters"))]
    pub first_name: Option<String>,

    #[validate(length(max = 255, message = "Last name must be at most 255 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Create user
///
/// # Endpoint
///
/// ```text
/// PUT /v1/users
/// Authorization: Bearer <jwt_token>
///
/// {
///   "parent_id": "uuid",
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "email": "ada@example.com"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: unknown parent or team
/// - `409 Conflict`: e-mail already in use
/// - `422 Unprocessable Entity`: validation failed
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    req.validate()?;

    let user = state
        .repo
        .create_user(CreateUser {
            parent_id: req.parent_id,
            team_id: req.team_id,
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
        })
        .await?;

    info!(user_id = %user.id, created_by = %auth.user_id, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// List all users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.repo.list_users().await?))
}

/// Get a single user
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<User>> {
    Ok(Json(state.repo.get_user_by_id(user_id).await?))
}

/// Partially update a user
pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    req.validate()?;

    let user = state
        .repo
        .update_user(
            user_id,
            UpdateUser {
                parent_id: req.parent_id,
                team_id: req.team_id,
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
            },
        )
        .await?;

    Ok(Json(user))
}

/// Delete a user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    state.repo.delete_user(user_id).await?;
    info!(user_id = %user_id, deleted_by = %auth.user_id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}
