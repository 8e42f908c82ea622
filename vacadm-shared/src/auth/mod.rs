/// Authentication and authorization for vacadm
///
/// # Modules
///
/// - [`jwt`]: HS256 token issuing and verification
/// - [`middleware`]: bearer token extraction and the request [`middleware::AuthContext`]
/// - [`relation`]: the parent / team-member / team-owner predicates
/// - [`authorization`]: the per-request access decision built on those predicates
///
/// # Example
///
/// ```
/// use vacadm_shared::auth::jwt::{create_token, verify_token, Claims};
/// use chrono::Duration;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-key-of-at-least-32-bytes!!";
/// let user_id = Uuid::new_v4();
///
/// let token = create_token(&Claims::new(user_id, None, Duration::days(1)), secret)?;
/// let (sub, team_id) = verify_token(&token, secret)?;
/// assert_eq!(sub, user_id);
/// assert!(team_id.is_none());
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod relation;
