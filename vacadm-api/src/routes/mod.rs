/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `token`: Token issuance
/// - `users` / `teams`: Directory management
/// - `vacations`, `vacation_requests`, `vacation_resources`: Per-user absences
/// - `capacity`: Team availability reports

pub mod capacity;
pub mod health;
pub mod teams;
pub mod token;
pub mod users;
pub mod vacation_requests;
pub mod vacation_resources;
pub mod vacations;
