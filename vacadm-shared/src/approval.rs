/// Vacation request approval
///
/// A vacation request is pending until a proven ancestor of the requesting
/// user approves it. Approval creates a [`Vacation`] and notifies the
/// requester. There is no rejection state.
///
/// # Consistency
///
/// - Nothing is written before the parent relation has been proven.
/// - A repository error at any step aborts the approval.
/// - Notification happens after the vacation is stored; a delivery failure is
///   logged and the vacation stays.
/// - The request itself is left in place, so approving it twice stores two
///   vacations.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::relation::RelationChecker;
use crate::models::vacation::{CreateVacation, Vacation};
use crate::models::vacation_request::VacationRequest;
use crate::notify::Notifier;
use crate::repository::{cancellable, Repository, RepositoryError};

/// Error type for approvals
#[derive(Debug, thiserror::Error)]
pub enum ApprovalError {
    /// The request does not exist or does not belong to the acting user
    #[error("Vacation request not found: {0}")]
    NotFound(Uuid),

    /// The approver is not an ancestor of the acting user
    #[error("Approver is not a parent of the requesting user")]
    Unauthorized,

    /// The request-scoped token was cancelled
    #[error("Approval cancelled")]
    Cancelled,

    #[error("Repository failure: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ApprovalError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Cancelled => ApprovalError::Cancelled,
            other => ApprovalError::Repository(other),
        }
    }
}

/// Converts pending requests into vacations
#[derive(Clone)]
pub struct ApprovalWorkflow {
    repo: Arc<dyn Repository>,
    relations: Arc<dyn RelationChecker>,
    notifier: Arc<dyn Notifier>,
}

impl ApprovalWorkflow {
    pub fn new(
        repo: Arc<dyn Repository>,
        relations: Arc<dyn RelationChecker>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            repo,
            relations,
            notifier,
        }
    }

    /// Approves `request_id` on behalf of `acting_user_id` by `approver_id`
    ///
    /// # Arguments
    ///
    /// * `request_id` - the pending vacation request
    /// * `acting_user_id` - the user the request must belong to
    /// * `approver_id` - the user approving; must be a transitive parent of
    ///   `acting_user_id`
    /// * `token` - request-scoped cancellation
    ///
    /// # Errors
    ///
    /// - `NotFound` if the request is unknown or belongs to another user
    /// - `Unauthorized` if `approver_id` is not an ancestor of `acting_user_id`
    /// - `Cancelled` if `token` fires before the vacation is stored
    /// - `Repository` for any other storage failure
    pub async fn approve(
        &self,
        request_id: Uuid,
        acting_user_id: Uuid,
        approver_id: Uuid,
        token: &CancellationToken,
    ) -> Result<Vacation, ApprovalError> {
        let request = self.load_request(request_id, acting_user_id, token).await?;

        let is_parent = cancellable(
            token,
            self.relations.is_parent_user(acting_user_id, approver_id),
        )
        .await?;
        if !is_parent {
            warn!(
                request_id = %request_id,
                user_id = %acting_user_id,
                approver_id = %approver_id,
                "Approval denied"
            );
            return Err(ApprovalError::Unauthorized);
        }

        let approver = cancellable(token, self.repo.get_user_by_id(approver_id)).await?;

        let vacation = cancellable(
            token,
            self.repo.create_vacation(CreateVacation {
                user_id: request.user_id,
                approved_by: approver_id,
                from: request.from,
                to: request.to,
            }),
        )
        .await?;

        info!(
            request_id = %request_id,
            vacation_id = %vacation.id,
            user_id = %vacation.user_id,
            approved_by = %approver_id,
            "Vacation request approved"
        );

        let message = format!(
            "your vacation from {} to {} was approved by {}",
            vacation.from.format("%Y-%m-%d %H:%M"),
            vacation.to.format("%Y-%m-%d %H:%M"),
            approver.display_name()
        );
        if let Err(e) = self.notifier.notify_user(request.user_id, &message).await {
            warn!(
                vacation_id = %vacation.id,
                error = %e,
                "Failed to notify user about approved vacation"
            );
        }

        Ok(vacation)
    }

    async fn load_request(
        &self,
        request_id: Uuid,
        acting_user_id: Uuid,
        token: &CancellationToken,
    ) -> Result<VacationRequest, ApprovalError> {
        match cancellable(token, self.repo.get_vacation_request_by_id(request_id)).await {
            Ok(request) if request.user_id == acting_user_id => Ok(request),
            Ok(_) => Err(ApprovalError::NotFound(request_id)),
            Err(e) if e.is_not_found() => Err(ApprovalError::NotFound(request_id)),
            Err(e) => Err(e.into()),
        }
    }
}
