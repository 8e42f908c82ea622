#![allow(dead_code)]

//! Test harness for the HTTP API
//!
//! Builds the full router over the in-memory repository and drives it
//! in-process with `tower::ServiceExt::oneshot`.

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;
use vacadm_api::{
    app::{build_router, AppState},
    config::{ApiConfig, Config, InitConfig, JwtConfig},
};
use vacadm_shared::{
    auth::jwt::{create_token, Claims},
    models::{
        team::{CreateTeam, Team},
        user::{CreateUser, User},
    },
    notify::{Notifier, NotifyError},
    repository::{memory::InMemoryRepository, Repository},
};

pub const TEST_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

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

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            validity_days: 1,
        },
        init: InitConfig::default(),
    }
}

/// A running app plus direct handles on its storage and notifications
pub struct TestContext {
    pub app: Router,
    pub state: AppState,
    pub repo: Arc<InMemoryRepository>,
    pub notifier: Arc<RecordingNotifier>,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is not UTF-8")
    }
}

impl TestContext {
    pub fn new() -> Self {
        let repo = Arc::new(InMemoryRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let state = AppState::new(repo.clone(), notifier.clone(), test_config());
        let app = build_router(state.clone());

        Self {
            app,
            state,
            repo,
            notifier,
        }
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

    pub fn token_for(&self, user: &User) -> String {
        let claims = Claims::new(user.id, user.team_id, chrono::Duration::hours(1));
        create_token(&claims, TEST_SECRET).unwrap()
    }

    /// Sends a request, with a bearer token and JSON body when given
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        self.send_with_accept(method, uri, token, body, None).await
    }

    pub async fn send_with_accept(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
        accept: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse {
            status,
            content_type,
            body,
        }
    }
}
