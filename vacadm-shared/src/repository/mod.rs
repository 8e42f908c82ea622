/// Storage abstraction for vacadm
///
/// The [`Repository`] trait is the single seam between the business logic
/// (relations, approval, capacity) and persistence. Two implementations exist:
///
/// - [`memory::InMemoryRepository`]: transient storage, physical deletion
/// - [`postgres::PgRepository`]: PostgreSQL storage, logical deletion
///
/// Both enforce the same creation invariants:
///
/// - a user's e-mail is non-empty and unique among live users
/// - a user's parent and team, when given, exist
/// - a user is never its own parent
/// - a team's owner exists
/// - every `user_id` / `approved_by` references an existing user
/// - every interval satisfies `to > from`
///
/// # Example
///
/// ```
/// use vacadm_shared::repository::{memory::InMemoryRepository, Repository};
/// use vacadm_shared::models::user::CreateUser;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let repo = InMemoryRepository::new();
/// let user = repo
///     .create_user(CreateUser {
///         email: "root@example.com".to_string(),
///         ..Default::default()
///     })
///     .await?;
///
/// assert_eq!(repo.get_user_by_id(user.id).await?.email, "root@example.com");
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::future::Future;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::models::team::{CreateTeam, Team, UpdateTeam};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::models::vacation::{CreateVacation, Vacation};
use crate::models::vacation_request::{
    CreateVacationRequest, UpdateVacationRequest, VacationRequest,
};
use crate::models::vacation_resource::{
    CreateVacationResource, UpdateVacationResource, VacationResource,
};

/// Repository errors
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// No live entity with this id
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: Uuid },

    /// A uniqueness constraint would be violated
    #[error("conflict: {0}")]
    Conflict(String),

    /// The input violates a creation or update invariant
    #[error("invalid input: {0}")]
    Invalid(String),

    /// The request-scoped cancellation token fired
    #[error("operation cancelled")]
    Cancelled,

    /// Underlying database failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// True for [`RepositoryError::NotFound`]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// CRUD operations over all vacadm entities
///
/// `get_*` methods return [`RepositoryError::NotFound`] for unknown or
/// deleted ids; `list_*` methods return an empty vector instead.
#[async_trait]
pub trait Repository: Send + Sync {
    // Users
    async fn create_user(&self, data: CreateUser) -> Result<User, RepositoryError>;
    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError>;
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;
    async fn list_team_users(&self, team_id: Uuid) -> Result<Vec<User>, RepositoryError>;
    /// Partial update: only `Some` fields change
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<User, RepositoryError>;
    async fn delete_user(&self, id: Uuid) -> Result<(), RepositoryError>;

    // Teams
    async fn create_team(&self, data: CreateTeam) -> Result<Team, RepositoryError>;
    async fn get_team_by_id(&self, id: Uuid) -> Result<Team, RepositoryError>;
    async fn list_teams(&self) -> Result<Vec<Team>, RepositoryError>;
    /// Partial update: only `Some` fields change
    async fn update_team(&self, id: Uuid, data: UpdateTeam) -> Result<Team, RepositoryError>;
    async fn delete_team(&self, id: Uuid) -> Result<(), RepositoryError>;

    // Vacations
    async fn create_vacation(&self, data: CreateVacation) -> Result<Vacation, RepositoryError>;
    async fn get_vacation_by_id(&self, id: Uuid) -> Result<Vacation, RepositoryError>;
    async fn list_user_vacations(&self, user_id: Uuid) -> Result<Vec<Vacation>, RepositoryError>;
    /// Vacations of every live member of the team
    async fn get_vacations_by_team_id(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Vacation>, RepositoryError>;
    async fn delete_vacation(&self, id: Uuid) -> Result<(), RepositoryError>;

    // Vacation requests
    async fn create_vacation_request(
        &self,
        data: CreateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError>;
    async fn get_vacation_request_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationRequest, RepositoryError>;
    async fn list_user_vacation_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationRequest>, RepositoryError>;
    /// Full replacement of the requested interval
    async fn update_vacation_request(
        &self,
        id: Uuid,
        data: UpdateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError>;
    async fn delete_vacation_request(&self, id: Uuid) -> Result<(), RepositoryError>;

    // Vacation resources
    async fn create_vacation_resource(
        &self,
        data: CreateVacationResource,
    ) -> Result<VacationResource, RepositoryError>;
    async fn get_vacation_resource_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationResource, RepositoryError>;
    async fn list_user_vacation_resources(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationResource>, RepositoryError>;
    /// Full replacement of yearly days and validity window
    async fn update_vacation_resource(
        &self,
        id: Uuid,
        data: UpdateVacationResource,
    ) -> Result<VacationResource, RepositoryError>;
    async fn delete_vacation_resource(&self, id: Uuid) -> Result<(), RepositoryError>;
}

/// Races a repository call against a cancellation token
///
/// If the token fires first the call is dropped and
/// [`RepositoryError::Cancelled`] is returned. A token that is already
/// cancelled wins even if the call would complete immediately.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T, RepositoryError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RepositoryError::Cancelled),
        result = fut => result,
    }
}
