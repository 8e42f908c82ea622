/// Authentication middleware for Axum
///
/// Validates the `Authorization: Bearer <token>` header and stores an
/// [`AuthContext`] in the request extensions. Handlers read it back with
/// Axum's `Extension` extractor:
///
/// ```no_run
/// use axum::Extension;
/// use vacadm_shared::auth::middleware::AuthContext;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     format!("user {}", auth.user_id)
/// }
/// ```

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use super::jwt::{verify_token, JwtError};

/// Verified caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user
    pub user_id: Uuid,

    /// Team claim carried by the token
    pub team_id: Option<Uuid>,
}

impl AuthContext {
    pub fn new(user_id: Uuid, team_id: Option<Uuid>) -> Self {
        Self { user_id, team_id }
    }
}

/// Error type for authentication
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header
    MissingCredentials,

    /// Header present but not a bearer token
    InvalidFormat(String),

    /// Token verification failed
    InvalidToken(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AuthError::MissingCredentials => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing credentials".to_string(),
            ),
            AuthError::InvalidFormat(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg),
        };

        (status, Json(json!({ "error": code, "message": message }))).into_response()
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AuthError::InvalidFormat("Expected Bearer token".to_string()))?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidFormat("Empty bearer token".to_string()));
    }
    Ok(token)
}

/// Verifies the request's bearer token and attaches an [`AuthContext`]
///
/// # Errors
///
/// - 401 if the header is missing or the token is invalid or expired
/// - 400 if the header is not a bearer token
pub async fn jwt_auth_middleware(
    secret: &str,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let token = bearer_token(req.headers())?;

    let (user_id, team_id) = verify_token(token, secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Token expired".to_string()),
        JwtError::InvalidIssuer => AuthError::InvalidToken("Invalid issuer".to_string()),
        other => AuthError::InvalidToken(format!("Invalid token: {}", other)),
    })?;

    debug!(user_id = %user_id, "Request authenticated");
    req.extensions_mut().insert(AuthContext::new(user_id, team_id));

    Ok(next.run(req).await)
}
