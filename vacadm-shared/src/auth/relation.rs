/// Relation predicates over the repository
///
/// Three read-only questions decide every delegated permission in vacadm:
///
/// - is `candidate` a (transitive) parent of `user`?
/// - is `user` a member of `team`?
/// - is `user` the owner of `team`?
///
/// An unknown user or team means the relation cannot be proven, so the
/// predicate answers `false` instead of failing. Any other repository error
/// is propagated and callers deny access.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::repository::{Repository, RepositoryError};

/// Upper bound on the parent chain walked by [`RelationChecker::is_parent_user`]
pub const MAX_PARENT_DEPTH: usize = 64;

/// Authorization predicates
#[async_trait]
pub trait RelationChecker: Send + Sync {
    /// True iff `candidate_parent_id` appears on `user_id`'s parent chain
    ///
    /// A user without a parent has no ancestors, and a user is never its own
    /// parent.
    async fn is_parent_user(
        &self,
        user_id: Uuid,
        candidate_parent_id: Uuid,
    ) -> Result<bool, RepositoryError>;

    /// True iff `user_id` belongs to `team_id`
    async fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError>;

    /// True iff `user_id` owns `team_id`
    async fn is_team_owner(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError>;
}

/// Turns `NotFound` into `None` and keeps every other error
fn found<T>(result: Result<T, RepositoryError>) -> Result<Option<T>, RepositoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// [`RelationChecker`] backed by a [`Repository`]
#[derive(Clone)]
pub struct RepositoryRelations {
    repo: Arc<dyn Repository>,
}

impl RepositoryRelations {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl RelationChecker for RepositoryRelations {
    async fn is_parent_user(
        &self,
        user_id: Uuid,
        candidate_parent_id: Uuid,
    ) -> Result<bool, RepositoryError> {
        let Some(user) = found(self.repo.get_user_by_id(user_id).await)? else {
            return Ok(false);
        };

        let mut visited = HashSet::from([user.id]);
        let mut next = user.parent_id;

        while let Some(parent_id) = next {
            if parent_id == candidate_parent_id {
                return Ok(true);
            }
            if !visited.insert(parent_id) || visited.len() > MAX_PARENT_DEPTH {
                warn!(
                    user_id = %user_id,
                    parent_id = %parent_id,
                    "Parent chain is cyclic or too deep, stopping walk"
                );
                return Ok(false);
            }

            next = match found(self.repo.get_user_by_id(parent_id).await)? {
                Some(parent) => parent.parent_id,
                None => None,
            };
        }

        Ok(false)
    }

    async fn is_team_member(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(found(self.repo.get_user_by_id(user_id).await)?
            .map(|user| user.team_id == Some(team_id))
            .unwrap_or(false))
    }

    async fn is_team_owner(&self, team_id: Uuid, user_id: Uuid) -> Result<bool, RepositoryError> {
        Ok(found(self.repo.get_team_by_id(team_id).await)?
            .map(|team| team.owner_id == user_id)
            .unwrap_or(false))
    }
}
