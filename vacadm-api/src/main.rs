//! # vacadm API Server
//!
//! Vacation administration service: users, teams, vacation requests and
//! their approval, entitlements, and team capacity reports.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) INIT_ROOT_EMAIL=root@example.com \
//!     cargo run -p vacadm-api
//! ```
//!
//! Without `DATABASE_URL` all data lives in memory and is lost on exit.

use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vacadm_api::{
    app::{bootstrap_root, build_router, AppState},
    config::Config,
};
use vacadm_shared::{
    db::{migrations, pool},
    notify::LogNotifier,
    repository::{memory::InMemoryRepository, postgres::PgRepository, Repository},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vacadm_api=debug,vacadm_shared=info,tower_http=debug".into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!(
        "vacadm API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();
    let root_email = config.init.root_email.clone();
    let database = config.database.clone();

    let notifier = Arc::new(LogNotifier);
    let state = match database {
        Some(db) => {
            migrations::ensure_database_exists(&db.url).await?;
            let pool = pool::create_pool(pool::DatabaseConfig {
                max_connections: db.max_connections,
                ..pool::DatabaseConfig::new(db.url.clone())
            })
            .await?;
            migrations::run_migrations(&pool).await?;

            let repo: Arc<dyn Repository> = Arc::new(PgRepository::new(pool.clone()));
            AppState::new(repo, notifier, config).with_pool(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using transient in-memory storage");
            let repo: Arc<dyn Repository> = Arc::new(InMemoryRepository::new());
            AppState::new(repo, notifier, config)
        }
    };

    if let Some(email) = root_email {
        let (root, token) = bootstrap_root(&state, &email).await?;
        tracing::info!(user_id = %root.id, email = %root.email, token = %token, "Root user ready");
    }

    let shutdown = state.shutdown.clone();
    let db = state.db.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    if let Some(db) = db {
        pool::close_pool(db).await;
    }
    tracing::info!("Server stopped");

    Ok(())
}

/// Waits for Ctrl-C or SIGTERM, then cancels in-flight request tokens
async fn shutdown_signal(shutdown: tokio_util::sync::CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, cancelling in-flight requests");
    shutdown.cancel();
}
