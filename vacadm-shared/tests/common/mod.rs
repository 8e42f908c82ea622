#![allow(dead_code)]

//! Shared fixtures for vacadm-shared integration tests
//!
//! Everything runs on the in-memory repository; no database is needed.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use vacadm_shared::auth::relation::RepositoryRelations;
use vacadm_shared::models::team::{CreateTeam, Team};
use vacadm_shared::models::user::{CreateUser, User};
use vacadm_shared::notify::{Notifier, NotifyError};
use vacadm_shared::repository::memory::InMemoryRepository;
use vacadm_shared::repository::Repository;

/// Notifier that records every message
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Uuid, String)>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(Uuid, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify_user(&self, user_id: Uuid, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((user_id, message.to_string()));
        Ok(())
    }

    async fn notify_team(&self, team_id: Uuid, message: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push((team_id, message.to_string()));
        Ok(())
    }
}

/// Notifier whose delivery always fails
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify_user(&self, _user_id: Uuid, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("mail server down".to_string()))
    }

    async fn notify_team(&self, _team_id: Uuid, _message: &str) -> Result<(), NotifyError> {
        Err(NotifyError::Delivery("mail server down".to_string()))
    }
}

/// Repository plus relation checker over it
pub struct Fixture {
    pub repo: Arc<InMemoryRepository>,
    pub relations: Arc<RepositoryRelations>,
}

impl Fixture {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let relations = Arc::new(RepositoryRelations::new(repo.clone()));
        Self { repo, relations }
    }

    pub async fn user(&self, name: &str, parent_id: Option<Uuid>, team_id: Option<Uuid>) -> User {
        self.repo
            .create_user(CreateUser {
                parent_id,
                team_id,
                first_name: name.to_string(),
                last_name: "Tester".to_string(),
                email: format!("{}-{}@example.com", name, Uuid::new_v4()),
            })
            .await
            .unwrap()
    }

    pub async fn team(&self, name: &str, owner_id: Uuid) -> Team {
        self.repo
            .create_team(CreateTeam {
                owner_id,
                name: name.to_string(),
            })
            .await
            .unwrap()
    }
}
