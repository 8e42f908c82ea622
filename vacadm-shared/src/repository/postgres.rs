/// PostgreSQL repository
///
/// Adapts the query methods on the model types to the [`Repository`] trait.
/// Existence checks run before writes so that callers get a precise
/// [`RepositoryError::Invalid`]; constraint violations raised by the
/// database itself (for example two concurrent inserts with the same e-mail)
/// are still mapped to the same taxonomy by [`map_db_error`].

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{Repository, RepositoryError};
use crate::models::is_valid_interval;
use crate::models::team::{CreateTeam, Team, UpdateTeam};
use crate::models::user::{CreateUser, UpdateUser, User};
use crate::models::vacation::{CreateVacation, Vacation};
use crate::models::vacation_request::{
    CreateVacationRequest, UpdateVacationRequest, VacationRequest,
};
use crate::models::vacation_resource::{
    CreateVacationResource, UpdateVacationResource, VacationResource,
};

/// Maps constraint violations to domain errors, everything else to `Database`
fn map_db_error(err: sqlx::Error) -> RepositoryError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return RepositoryError::Conflict(db_err.message().to_string());
        }
        if db_err.is_foreign_key_violation() || db_err.is_check_violation() {
            return RepositoryError::Invalid(db_err.message().to_string());
        }
    }
    RepositoryError::Database(err)
}

fn check_interval(
    from: chrono::DateTime<chrono::Utc>,
    to: chrono::DateTime<chrono::Utc>,
) -> Result<(), RepositoryError> {
    if is_valid_interval(from, to) {
        Ok(())
    } else {
        Err(RepositoryError::Invalid("to must be after from".into()))
    }
}

/// PostgreSQL implementation of [`Repository`]
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn require_user(&self, id: Uuid, field: &str) -> Result<(), RepositoryError> {
        match User::find_by_id(&self.pool, id).await? {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Invalid(format!(
                "{} references unknown user {}",
                field, id
            ))),
        }
    }

    async fn require_team(&self, id: Uuid) -> Result<(), RepositoryError> {
        match Team::find_by_id(&self.pool, id).await? {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Invalid(format!(
                "team_id references unknown team {}",
                id
            ))),
        }
    }

    async fn check_email(&self, email: &str, except: Option<Uuid>) -> Result<(), RepositoryError> {
        if email.trim().is_empty() {
            return Err(RepositoryError::Invalid("email must not be empty".into()));
        }
        match User::find_by_email(&self.pool, email).await? {
            Some(existing) if Some(existing.id) != except => Err(RepositoryError::Conflict(
                format!("email {} is already in use", email),
            )),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn create_user(&self, data: CreateUser) -> Result<User, RepositoryError> {
        self.check_email(&data.email, None).await?;
        if let Some(parent_id) = data.parent_id {
            self.require_user(parent_id, "parent_id").await?;
        }
        if let Some(team_id) = data.team_id {
            self.require_team(team_id).await?;
        }

        let user = User::create(&self.pool, data).await.map_err(map_db_error)?;
        debug!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        User::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(User::list(&self.pool).await?)
    }

    async fn list_team_users(&self, team_id: Uuid) -> Result<Vec<User>, RepositoryError> {
        Ok(User::list_by_team(&self.pool, team_id).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<User, RepositoryError> {
        if let Some(email) = &data.email {
            self.check_email(email, Some(id)).await?;
        }
        if let Some(parent_id) = data.parent_id {
            if parent_id == id {
                return Err(RepositoryError::Invalid(
                    "a user cannot be its own parent".into(),
                ));
            }
            self.require_user(parent_id, "parent_id").await?;
        }
        if let Some(team_id) = data.team_id {
            self.require_team(team_id).await?;
        }

        User::update(&self.pool, id, data)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepositoryError> {
        if User::delete(&self.pool, id).await? {
            debug!(user_id = %id, "User deleted");
            Ok(())
        } else {
            Err(RepositoryError::not_found("user", id))
        }
    }

    async fn create_team(&self, data: CreateTeam) -> Result<Team, RepositoryError> {
        self.require_user(data.owner_id, "owner_id").await?;
        let team = Team::create(&self.pool, data).await.map_err(map_db_error)?;
        debug!(team_id = %team.id, owner_id = %team.owner_id, "Team created");
        Ok(team)
    }

    async fn get_team_by_id(&self, id: Uuid) -> Result<Team, RepositoryError> {
        Team::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("team", id))
    }

    async fn list_teams(&self) -> Result<Vec<Team>, RepositoryError> {
        Ok(Team::list(&self.pool).await?)
    }

    async fn update_team(&self, id: Uuid, data: UpdateTeam) -> Result<Team, RepositoryError> {
        if let Some(owner_id) = data.owner_id {
            self.require_user(owner_id, "owner_id").await?;
        }
        Team::update(&self.pool, id, data)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| RepositoryError::not_found("team", id))
    }

    async fn delete_team(&self, id: Uuid) -> Result<(), RepositoryError> {
        if Team::delete(&self.pool, id).await? {
            debug!(team_id = %id, "Team deleted");
            Ok(())
        } else {
            Err(RepositoryError::not_found("team", id))
        }
    }

    async fn create_vacation(&self, data: CreateVacation) -> Result<Vacation, RepositoryError> {
        self.require_user(data.user_id, "user_id").await?;
        self.require_user(data.approved_by, "approved_by").await?;
        check_interval(data.from, data.to)?;
        Vacation::create(&self.pool, data).await.map_err(map_db_error)
    }

    async fn get_vacation_by_id(&self, id: Uuid) -> Result<Vacation, RepositoryError> {
        Vacation::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("vacation", id))
    }

    async fn list_user_vacations(&self, user_id: Uuid) -> Result<Vec<Vacation>, RepositoryError> {
        Ok(Vacation::list_by_user(&self.pool, user_id).await?)
    }

    async fn get_vacations_by_team_id(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Vacation>, RepositoryError> {
        Ok(Vacation::list_by_team(&self.pool, team_id).await?)
    }

    async fn delete_vacation(&self, id: Uuid) -> Result<(), RepositoryError> {
        if Vacation::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::not_found("vacation", id))
        }
    }

    async fn create_vacation_request(
        &self,
        data: CreateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        self.require_user(data.user_id, "user_id").await?;
        check_interval(data.from, data.to)?;
        VacationRequest::create(&self.pool, data)
            .await
            .map_err(map_db_error)
    }

    async fn get_vacation_request_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationRequest, RepositoryError> {
        VacationRequest::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("vacation request", id))
    }

    async fn list_user_vacation_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        Ok(VacationRequest::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_vacation_request(
        &self,
        id: Uuid,
        data: UpdateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        check_interval(data.from, data.to)?;
        VacationRequest::update(&self.pool, id, data)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| RepositoryError::not_found("vacation request", id))
    }

    async fn delete_vacation_request(&self, id: Uuid) -> Result<(), RepositoryError> {
        if VacationRequest::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::not_found("vacation request", id))
        }
    }

    async fn create_vacation_resource(
        &self,
        data: CreateVacationResource,
    ) -> Result<VacationResource, RepositoryError> {
        self.require_user(data.user_id, "user_id").await?;
        check_interval(data.from, data.to)?;
        VacationResource::create(&self.pool, data)
            .await
            .map_err(map_db_error)
    }

    async fn get_vacation_resource_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationResource, RepositoryError> {
        VacationResource::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| RepositoryError::not_found("vacation resource", id))
    }

    async fn list_user_vacation_resources(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationResource>, RepositoryError> {
        Ok(VacationResource::list_by_user(&self.pool, user_id).await?)
    }

    async fn update_vacation_resource(
        &self,
        id: Uuid,
        data: UpdateVacationResource,
    ) -> Result<VacationResource, RepositoryError> {
        check_interval(data.from, data.to)?;
        VacationResource::update(&self.pool, id, data)
            .await
            .map_err(map_db_error)?
            .ok_or_else(|| RepositoryError::not_found("vacation resource", id))
    }

    async fn delete_vacation_resource(&self, id: Uuid) -> Result<(), RepositoryError> {
        if VacationResource::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(RepositoryError::not_found("vacation resource", id))
        }
    }
}
