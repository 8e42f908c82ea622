/// Transient in-memory repository
///
/// All entities live in vectors behind a single `tokio::sync::RwLock`, so
/// every write validates and mutates under one lock and readers never see a
/// half-applied change. Deletion is physical. Listing preserves insertion
/// order.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use tokio::sync::RwLock;
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

#[derive(Debug, Default)]
struct Store {
    users: Vec<User>,
    teams: Vec<Team>,
    vacations: Vec<Vacation>,
    vacation_requests: Vec<VacationRequest>,
    vacation_resources: Vec<VacationResource>,
}

impl Store {
    fn user(&self, id: Uuid) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    fn team(&self, id: Uuid) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    fn require_user(&self, id: Uuid, field: &str) -> Result<(), RepositoryError> {
        match self.user(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Invalid(format!(
                "{} references unknown user {}",
                field, id
            ))),
        }
    }

    fn require_team(&self, id: Uuid) -> Result<(), RepositoryError> {
        match self.team(id) {
            Some(_) => Ok(()),
            None => Err(RepositoryError::Invalid(format!(
                "team_id references unknown team {}",
                id
            ))),
        }
    }

    /// E-mail must be non-empty and unused by any user other than `except`
    fn check_email(&self, email: &str, except: Option<Uuid>) -> Result<(), RepositoryError> {
        if email.trim().is_empty() {
            return Err(RepositoryError::Invalid("email must not be empty".into()));
        }
        let taken = self
            .users
            .iter()
            .any(|u| u.email == email && Some(u.id) != except);
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "email {} is already in use",
                email
            )));
        }
        Ok(())
    }
}

fn check_interval(
    from: chrono::DateTime<Utc>,
    to: chrono::DateTime<Utc>,
) -> Result<(), RepositoryError> {
    if is_valid_interval(from, to) {
        Ok(())
    } else {
        Err(RepositoryError::Invalid("to must be after from".into()))
    }
}

/// In-memory implementation of [`Repository`]
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn create_user(&self, data: CreateUser) -> Result<User, RepositoryError> {
        let mut store = self.store.write().await;

        store.check_email(&data.email, None)?;
        if let Some(parent_id) = data.parent_id {
            store.require_user(parent_id, "parent_id")?;
        }
        if let Some(team_id) = data.team_id {
            store.require_team(team_id)?;
        }

        let user = User {
            id: Uuid::new_v4(),
            parent_id: data.parent_id,
            team_id: data.team_id,
            first_name: data.first_name,
            last_name: data.last_name,
            email: data.email,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        store.users.push(user.clone());

        debug!(user_id = %user.id, "User created");
        Ok(user)
    }

    async fn get_user_by_id(&self, id: Uuid) -> Result<User, RepositoryError> {
        let store = self.store.read().await;
        store
            .user(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("user", id))
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        Ok(self.store.read().await.users.clone())
    }

    async fn list_team_users(&self, team_id: Uuid) -> Result<Vec<User>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .users
            .iter()
            .filter(|u| u.team_id == Some(team_id))
            .cloned()
            .collect())
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> Result<User, RepositoryError> {
        let mut store = self.store.write().await;

        if store.user(id).is_none() {
            return Err(RepositoryError::not_found("user", id));
        }
        if let Some(email) = &data.email {
            store.check_email(email, Some(id))?;
        }
        if let Some(parent_id) = data.parent_id {
            if parent_id == id {
                return Err(RepositoryError::Invalid(
                    "a user cannot be its own parent".into(),
                ));
            }
            store.require_user(parent_id, "parent_id")?;
        }
        if let Some(team_id) = data.team_id {
            store.require_team(team_id)?;
        }

        let user = store
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::not_found("user", id))?;

        if let Some(parent_id) = data.parent_id {
            user.parent_id = Some(parent_id);
        }
        if let Some(team_id) = data.team_id {
            user.team_id = Some(team_id);
        }
        if let Some(first_name) = data.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = data.last_name {
            user.last_name = last_name;
        }
        if let Some(email) = data.email {
            user.email = email;
        }
        user.updated_at = Some(Utc::now());

        Ok(user.clone())
    }

    async fn delete_user(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let before = store.users.len();
        store.users.retain(|u| u.id != id);
        if store.users.len() == before {
            return Err(RepositoryError::not_found("user", id));
        }
        debug!(user_id = %id, "User deleted");
        Ok(())
    }

    async fn create_team(&self, data: CreateTeam) -> Result<Team, RepositoryError> {
        let mut store = self.store.write().await;
        store.require_user(data.owner_id, "owner_id")?;

        let team = Team {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            name: data.name,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        store.teams.push(team.clone());

        debug!(team_id = %team.id, owner_id = %team.owner_id, "Team created");
        Ok(team)
    }

    async fn get_team_by_id(&self, id: Uuid) -> Result<Team, RepositoryError> {
        let store = self.store.read().await;
        store
            .team(id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("team", id))
    }

    async fn list_teams(&self) -> Result<Vec<Team>, RepositoryError> {
        Ok(self.store.read().await.teams.clone())
    }

    async fn update_team(&self, id: Uuid, data: UpdateTeam) -> Result<Team, RepositoryError> {
        let mut store = self.store.write().await;

        if let Some(owner_id) = data.owner_id {
            store.require_user(owner_id, "owner_id")?;
        }

        let team = store
            .teams
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| RepositoryError::not_found("team", id))?;

        if let Some(owner_id) = data.owner_id {
            team.owner_id = owner_id;
        }
        if let Some(name) = data.name {
            team.name = name;
        }
        team.updated_at = Some(Utc::now());

        Ok(team.clone())
    }

    async fn delete_team(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let before = store.teams.len();
        store.teams.retain(|t| t.id != id);
        if store.teams.len() == before {
            return Err(RepositoryError::not_found("team", id));
        }
        debug!(team_id = %id, "Team deleted");
        Ok(())
    }

    async fn create_vacation(&self, data: CreateVacation) -> Result<Vacation, RepositoryError> {
        let mut store = self.store.write().await;
        store.require_user(data.user_id, "user_id")?;
        store.require_user(data.approved_by, "approved_by")?;
        check_interval(data.from, data.to)?;

        let vacation = Vacation {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            approved_by: data.approved_by,
            from: data.from,
            to: data.to,
            created_at: Utc::now(),
            deleted_at: None,
        };
        store.vacations.push(vacation.clone());

        Ok(vacation)
    }

    async fn get_vacation_by_id(&self, id: Uuid) -> Result<Vacation, RepositoryError> {
        let store = self.store.read().await;
        store
            .vacations
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("vacation", id))
    }

    async fn list_user_vacations(&self, user_id: Uuid) -> Result<Vec<Vacation>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .vacations
            .iter()
            .filter(|v| v.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_vacations_by_team_id(
        &self,
        team_id: Uuid,
    ) -> Result<Vec<Vacation>, RepositoryError> {
        let store = self.store.read().await;
        let members: HashSet<Uuid> = store
            .users
            .iter()
            .filter(|u| u.team_id == Some(team_id))
            .map(|u| u.id)
            .collect();

        Ok(store
            .vacations
            .iter()
            .filter(|v| members.contains(&v.user_id))
            .cloned()
            .collect())
    }

    async fn delete_vacation(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let before = store.vacations.len();
        store.vacations.retain(|v| v.id != id);
        if store.vacations.len() == before {
            return Err(RepositoryError::not_found("vacation", id));
        }
        Ok(())
    }

    async fn create_vacation_request(
        &self,
        data: CreateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        let mut store = self.store.write().await;
        store.require_user(data.user_id, "user_id")?;
        check_interval(data.from, data.to)?;

        let request = VacationRequest {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            from: data.from,
            to: data.to,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        store.vacation_requests.push(request.clone());

        Ok(request)
    }

    async fn get_vacation_request_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationRequest, RepositoryError> {
        let store = self.store.read().await;
        store
            .vacation_requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("vacation request", id))
    }

    async fn list_user_vacation_requests(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationRequest>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .vacation_requests
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_vacation_request(
        &self,
        id: Uuid,
        data: UpdateVacationRequest,
    ) -> Result<VacationRequest, RepositoryError> {
        let mut store = self.store.write().await;
        let request = store
            .vacation_requests
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::not_found("vacation request", id))?;
        check_interval(data.from, data.to)?;

        request.from = data.from;
        request.to = data.to;
        request.updated_at = Some(Utc::now());

        Ok(request.clone())
    }

    async fn delete_vacation_request(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let before = store.vacation_requests.len();
        store.vacation_requests.retain(|r| r.id != id);
        if store.vacation_requests.len() == before {
            return Err(RepositoryError::not_found("vacation request", id));
        }
        Ok(())
    }

    async fn create_vacation_resource(
        &self,
        data: CreateVacationResource,
    ) -> Result<VacationResource, RepositoryError> {
        let mut store = self.store.write().await;
        store.require_user(data.user_id, "user_id")?;
        check_interval(data.from, data.to)?;
        if data.yearly_days < 0 {
            return Err(RepositoryError::Invalid(
                "yearly_days must not be negative".into(),
            ));
        }

        let resource = VacationResource {
            id: Uuid::new_v4(),
            user_id: data.user_id,
            yearly_days: data.yearly_days,
            from: data.from,
            to: data.to,
            created_at: Utc::now(),
            updated_at: None,
            deleted_at: None,
        };
        store.vacation_resources.push(resource.clone());

        Ok(resource)
    }

    async fn get_vacation_resource_by_id(
        &self,
        id: Uuid,
    ) -> Result<VacationResource, RepositoryError> {
        let store = self.store.read().await;
        store
            .vacation_resources
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| RepositoryError::not_found("vacation resource", id))
    }

    async fn list_user_vacation_resources(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<VacationResource>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store
            .vacation_resources
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_vacation_resource(
        &self,
        id: Uuid,
        data: UpdateVacationResource,
    ) -> Result<VacationResource, RepositoryError> {
        let mut store = self.store.write().await;
        let resource = store
            .vacation_resources
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| RepositoryError::not_found("vacation resource", id))?;
        check_interval(data.from, data.to)?;
        if data.yearly_days < 0 {
            return Err(RepositoryError::Invalid(
                "yearly_days must not be negative".into(),
            ));
        }

        resource.yearly_days = data.yearly_days;
        resource.from = data.from;
        resource.to = data.to;
        resource.updated_at = Some(Utc::now());

        Ok(resource.clone())
    }

    async fn delete_vacation_resource(&self, id: Uuid) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let before = store.vacation_resources.len();
        store.vacation_resources.retain(|r| r.id != id);
        if store.vacation_resources.len() == before {
            return Err(RepositoryError::not_found("vacation resource", id));
        }
        Ok(())
    }
}
