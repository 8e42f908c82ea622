/// Outbound notifications
///
/// Delivery is best-effort everywhere it is used: a failed notification is
/// logged by the caller and never undoes the write that triggered it.

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;

/// Error type for notification delivery
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    Delivery(String),
}

/// Sends human-readable messages to users and teams
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify_user(&self, user_id: Uuid, message: &str) -> Result<(), NotifyError>;

    async fn notify_team(&self, team_id: Uuid, message: &str) -> Result<(), NotifyError>;
}

/// Delivers notifications as structured log events
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify_user(&self, user_id: Uuid, message: &str) -> Result<(), NotifyError> {
        info!(target_user = %user_id, message, "Notification to user");
        Ok(())
    }

    async fn notify_team(&self, team_id: Uuid, message: &str) -> Result<(), NotifyError> {
        info!(target_team = %team_id, message, "Notification to team");
        Ok(())
    }
}

/// Message sent to a user's parent when a vacation request is filed or changed
pub fn vacation_request_message(first_name: &str, last_name: &str, request_id: Uuid) -> String {
    format!(
        "new vacation request from {} {}, id: {}",
        first_name, last_name, request_id
    )
}
