/// Access decision middleware
///
/// Runs after authentication on every matched protected route. The
/// `user_id` and `team_id` path parameters, when the route has them, form
/// the [`ResourceScope`] checked against the caller; routes without either
/// pass through unchanged.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
    Extension,
};
use std::collections::HashMap;
use uuid::Uuid;
use vacadm_shared::auth::{
    authorization::{require_access, ResourceScope},
    middleware::AuthContext,
};

fn path_uuid(params: &HashMap<String, String>, key: &str) -> Result<Option<Uuid>, ApiError> {
    params
        .get(key)
        .map(|raw| {
            Uuid::parse_str(raw).map_err(|_| ApiError::BadRequest(format!("Invalid {}: {}", key, raw)))
        })
        .transpose()
}

/// Scope named by the matched route's path parameters
pub fn scope_from_params(params: &HashMap<String, String>) -> Result<ResourceScope, ApiError> {
    Ok(ResourceScope {
        user_id: path_uuid(params, "user_id")?,
        team_id: path_uuid(params, "team_id")?,
    })
}

/// Rejects the request with 403 unless the caller may access the scope
pub async fn access_layer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    params: Option<Path<HashMap<String, String>>>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let scope = match params {
        Some(Path(params)) => scope_from_params(&params)?,
        None => ResourceScope::default(),
    };

    require_access(state.relations.as_ref(), &auth, &scope).await?;

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_from_params() {
        let user_id = Uuid::new_v4();
        let team_id = Uuid::new_v4();

        let mut params = HashMap::new();
        assert_eq!(scope_from_params(&params).unwrap(), ResourceScope::default());

        params.insert("user_id".to_string(), user_id.to_string());
        params.insert("request_id".to_string(), Uuid::new_v4().to_string());
        assert_eq!(scope_from_params(&params).unwrap(), ResourceScope::user(user_id));

        params.insert("team_id".to_string(), team_id.to_string());
        let scope = scope_from_params(&params).unwrap();
        assert_eq!(scope.user_id, Some(user_id));
        assert_eq!(scope.team_id, Some(team_id));
    }

    #[test]
    fn test_scope_rejects_malformed_ids() {
        let mut params = HashMap::new();
        params.insert("team_id".to_string(), "not-a-uuid".to_string());
        assert!(matches!(
            scope_from_params(&params),
            Err(ApiError::BadRequest(_))
        ));
    }
}
