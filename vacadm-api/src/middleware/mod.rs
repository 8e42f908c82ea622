/// Middleware for the API server
///
/// - [`jwt_auth_layer`]: bearer token authentication
/// - [`access::access_layer`]: per-route access decision on path identities

pub mod access;

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use vacadm_shared::auth::middleware::jwt_auth_middleware;

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects an `AuthContext` into the request
/// extensions.
pub async fn jwt_auth_layer(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    Ok(jwt_auth_middleware(state.jwt_secret(), req, next).await?)
}
