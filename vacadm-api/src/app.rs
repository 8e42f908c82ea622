/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use vacadm_api::{app::AppState, config::Config};
/// use vacadm_shared::{notify::LogNotifier, repository::memory::InMemoryRepository};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::new(
///     Arc::new(InMemoryRepository::new()),
///     Arc::new(LogNotifier),
///     config,
/// );
/// let app = vacadm_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    error::ApiResult,
    middleware::{access::access_layer, jwt_auth_layer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use vacadm_shared::{
    approval::ApprovalWorkflow,
    auth::{
        jwt::{create_token, Claims},
        relation::{RelationChecker, RepositoryRelations},
    },
    capacity::CapacityAggregator,
    models::user::{CreateUser, User},
    notify::Notifier,
    repository::Repository,
};

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend
    pub repo: Arc<dyn Repository>,

    /// Relation predicates over `repo`
    pub relations: Arc<dyn RelationChecker>,

    /// Outbound notifications
    pub notifier: Arc<dyn Notifier>,

    /// Connection pool when running on PostgreSQL, for health checks
    pub db: Option<PgPool>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Root cancellation token, cancelled on graceful shutdown
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Creates new application state
    pub fn new(repo: Arc<dyn Repository>, notifier: Arc<dyn Notifier>, config: Config) -> Self {
        let relations: Arc<dyn RelationChecker> = Arc::new(RepositoryRelations::new(repo.clone()));
        Self {
            repo,
            relations,
            notifier,
            db: None,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
        }
    }

    /// Attaches the PostgreSQL pool backing `repo`
    pub fn with_pool(mut self, pool: PgPool) -> Self {
        self.db = Some(pool);
        self
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Token scoped to a single request
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    pub fn approval(&self) -> ApprovalWorkflow {
        ApprovalWorkflow::new(
            self.repo.clone(),
            self.relations.clone(),
            self.notifier.clone(),
        )
    }

    pub fn capacity(&self) -> CapacityAggregator {
        CapacityAggregator::new(self.repo.clone(), self.relations.clone())
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                                  # Health check (public)
/// ├── /token/new/:user_id                      # Issue token (authenticated)
/// └── /v1/                                     # API v1 (authenticated)
///     ├── /users                               # PUT create, GET list
///     │   └── /:user_id                        # GET, PATCH, DELETE
///     │       ├── /vacations[/:vacation_id]
///     │       ├── /vacation-requests[/:request_id]
///     │       │   └── /approve/:parent_id      # PUT approve
///     │       └── /vacation-resources[/:resource_id]
///     ├── /teams                               # PUT create, GET list
///     │   └── /:team_id                        # GET, PATCH, DELETE
///     │       └── /users                       # GET members
///     └── /capacity                            # GET team availability
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first):
/// 1. CORS (tower-http CorsLayer)
/// 2. Logging (tower-http TraceLayer)
/// 3. Authentication (matched routes only)
/// 4. Access decision on the `user_id` / `team_id` path parameters
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let token_routes = Router::new().route("/token/new/:user_id", get(routes::token::new_token));

    let user_routes = Router::new()
        .route(
            "/",
            put(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/:user_id",
            get(routes::users::get_user)
                .patch(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route(
            "/:user_id/vacations",
            get(routes::vacations::list_vacations),
        )
        .route(
            "/:user_id/vacations/:vacation_id",
            get(routes::vacations::get_vacation).delete(routes::vacations::delete_vacation),
        )
        .route(
            "/:user_id/vacation-requests",
            put(routes::vacation_requests::create_vacation_request)
                .get(routes::vacation_requests::list_vacation_requests),
        )
        .route(
            "/:user_id/vacation-requests/:request_id",
            get(routes::vacation_requests::get_vacation_request)
                .patch(routes::vacation_requests::update_vacation_request)
                .delete(routes::vacation_requests::delete_vacation_request),
        )
        .route(
            "/:user_id/vacation-requests/:request_id/approve/:parent_id",
            put(routes::vacation_requests::approve_vacation_request),
        )
        .route(
            "/:user_id/vacation-resources",
            put(routes::vacation_resources::create_vacation_resource)
                .get(routes::vacation_resources::list_vacation_resources),
        )
        .route(
            "/:user_id/vacation-resources/:resource_id",
            get(routes::vacation_resources::get_vacation_resource)
                .patch(routes::vacation_resources::update_vacation_resource)
                .delete(routes::vacation_resources::delete_vacation_resource),
        );

    let team_routes = Router::new()
        .route(
            "/",
            put(routes::teams::create_team).get(routes::teams::list_teams),
        )
        .route(
            "/:team_id",
            get(routes::teams::get_team)
                .patch(routes::teams::update_team)
                .delete(routes::teams::delete_team),
        )
        .route("/:team_id/users", get(routes::teams::list_team_users));

    let v1_routes = Router::new()
        .nest("/users", user_routes)
        .nest("/teams", team_routes)
        .route("/capacity", get(routes::capacity::get_capacity));

    // Everything except /health: authenticate, then decide access
    let protected_routes = Router::new()
        .merge(token_routes)
        .nest("/v1", v1_routes)
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            access_layer,
        ))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .merge(protected_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// Creates the root user named by `INIT_ROOT_EMAIL` and issues it a token
///
/// An existing live user with that e-mail is reused, so restarting against
/// persistent storage does not fail.
pub async fn bootstrap_root(state: &AppState, email: &str) -> ApiResult<(User, String)> {
    let existing = state
        .repo
        .list_users()
        .await?
        .into_iter()
        .find(|user| user.email == email);

    let root = match existing {
        Some(user) => user,
        None => {
            state
                .repo
                .create_user(CreateUser {
                    email: email.to_string(),
                    first_name: "root".to_string(),
                    ..Default::default()
                })
                .await?
        }
    };

    let claims = Claims::new(root.id, root.team_id, state.config.token_validity());
    let token = create_token(&claims, state.jwt_secret())?;

    Ok((root, token))
}
