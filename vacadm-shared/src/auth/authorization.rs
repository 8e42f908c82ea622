/// Per-request access decision
///
/// Combines the verified caller identity with the user and team ids found in
/// the request path:
///
/// | path carries       | allowed when                                              |
/// |--------------------|-----------------------------------------------------------|
/// | nothing            | always                                                    |
/// | `user_id`          | caller is that user, or a transitive parent of that user  |
/// | `team_id`          | caller is a member or the owner of that team              |
/// | both               | both of the above                                         |
///
/// The decision only reads relations. Any failure to evaluate a predicate
/// denies the request.

use tracing::{debug, error};
use uuid::Uuid;

use super::middleware::AuthContext;
use super::relation::RelationChecker;
use crate::repository::RepositoryError;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// The caller cannot be shown to be related to the resource
    #[error("Access denied")]
    Forbidden,

    /// A relation predicate could not be evaluated
    #[error("Failed to evaluate access: {0}")]
    Repository(#[from] RepositoryError),
}

/// Resource identities taken from the request path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceScope {
    pub user_id: Option<Uuid>,
    pub team_id: Option<Uuid>,
}

impl ResourceScope {
    pub fn user(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
            team_id: None,
        }
    }

    pub fn team(team_id: Uuid) -> Self {
        Self {
            user_id: None,
            team_id: Some(team_id),
        }
    }
}

async fn user_scope_allows(
    relations: &dyn RelationChecker,
    caller: &AuthContext,
    path_user_id: Uuid,
) -> Result<bool, RepositoryError> {
    if caller.user_id == path_user_id {
        return Ok(true);
    }
    relations.is_parent_user(path_user_id, caller.user_id).await
}

async fn team_scope_allows(
    relations: &dyn RelationChecker,
    caller: &AuthContext,
    path_team_id: Uuid,
) -> Result<bool, RepositoryError> {
    // Membership comes from the repository; the token's team claim may be stale
    if relations.is_team_member(path_team_id, caller.user_id).await? {
        return Ok(true);
    }
    relations.is_team_owner(path_team_id, caller.user_id).await
}

/// Evaluates the decision, surfacing predicate failures
pub async fn evaluate_access(
    relations: &dyn RelationChecker,
    caller: &AuthContext,
    scope: &ResourceScope,
) -> Result<bool, RepositoryError> {
    if let Some(user_id) = scope.user_id {
        if !user_scope_allows(relations, caller, user_id).await? {
            return Ok(false);
        }
    }
    if let Some(team_id) = scope.team_id {
        if !team_scope_allows(relations, caller, team_id).await? {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Allow/deny; a failed predicate counts as deny
pub async fn check_access(
    relations: &dyn RelationChecker,
    caller: &AuthContext,
    scope: &ResourceScope,
) -> bool {
    match evaluate_access(relations, caller, scope).await {
        Ok(allowed) => allowed,
        Err(e) => {
            error!(error = %e, caller = %caller.user_id, "Access check failed, denying");
            false
        }
    }
}

/// Like [`check_access`] but returns why access was refused
///
/// # Errors
///
/// - `AuthzError::Forbidden` if the relations do not hold
/// - `AuthzError::Repository` if they could not be evaluated
pub async fn require_access(
    relations: &dyn RelationChecker,
    caller: &AuthContext,
    scope: &ResourceScope,
) -> Result<(), AuthzError> {
    if evaluate_access(relations, caller, scope).await? {
        Ok(())
    } else {
        debug!(
            caller = %caller.user_id,
            user_id = ?scope.user_id,
            team_id = ?scope.team_id,
            "Access denied"
        );
        Err(AuthzError::Forbidden)
    }
}
