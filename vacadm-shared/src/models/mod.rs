/// Domain models for vacadm
///
/// Every model carries its own PostgreSQL queries; the in-memory backend in
/// [`crate::repository::memory`] works on the same types.
///
/// # Models
///
/// - `user`: Users, forming a parent forest and optionally belonging to a team
/// - `team`: Teams with exactly one owner
/// - `vacation`: Confirmed absences
/// - `vacation_request`: Pending absences awaiting approval
/// - `vacation_resource`: Yearly vacation entitlements
///
/// # Example
///
/// ```no_run
/// use vacadm_shared::models::user::{CreateUser, User};
/// use vacadm_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     parent_id: None,
///     team_id: None,
///     first_name: "Nina".to_string(),
///     last_name: "Olear".to_string(),
///     email: "nina@example.com".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod team;
pub mod user;
pub mod vacation;
pub mod vacation_request;
pub mod vacation_resource;

use chrono::{DateTime, Utc};

/// Returns true when `to` lies strictly after `from`
pub(crate) fn is_valid_interval(from: DateTime<Utc>, to: DateTime<Utc>) -> bool {
    to > from
}
