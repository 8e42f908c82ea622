/// Token issuance
///
/// # Endpoints
///
/// - `GET /token/new/:user_id` - Issue a fresh token for a user
///
/// The access layer has already established that the caller is the user
/// or one of its ancestors.

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;
use vacadm_shared::auth::{
    jwt::{create_token, Claims},
    middleware::AuthContext,
};

/// Token response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed bearer token
    pub token: String,

    /// Subject of the token
    pub user_id: Uuid,

    /// Expiry of the token
    pub expires_at: Option<DateTime<Utc>>,
}

/// Issues a token carrying the user's id and team
///
/// # Errors
///
/// - `403 Forbidden`: caller is neither the user nor an ancestor
/// - `404 Not Found`: unknown user
pub async fn new_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> ApiResult<Json<TokenResponse>> {
    let user = state.repo.get_user_by_id(user_id).await?;

    let claims = Claims::new(user.id, user.team_id, state.config.token_validity());
    let token = create_token(&claims, state.jwt_secret())?;

    info!(user_id = %user.id, issued_by = %auth.user_id, "Token issued");

    Ok(Json(TokenResponse {
        token,
        user_id: user.id,
        expires_at: Utc.timestamp_opt(claims.exp, 0).single(),
    }))
}
