/// Configuration management for the API server
///
/// Loaded from environment variables; a `.env` file is honoured in
/// development.
///
/// # Environment Variables
///
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma separated origins, `*` for any (default: `*`)
/// - `DATABASE_URL`: PostgreSQL connection string; without it the server
///   keeps everything in memory
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `JWT_SECRET`: token signing key, at least 32 characters (required)
/// - `JWT_VALIDITY_DAYS`: lifetime of issued tokens (default: 365)
/// - `INIT_ROOT_EMAIL`: create a root user with this address at startup
/// - `RUST_LOG` / `LOG_FORMAT`: see `main.rs`
///
/// # Example
///
/// ```no_run
/// use vacadm_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;
use vacadm_shared::auth::jwt::DEFAULT_VALIDITY_DAYS;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,

    /// None selects the in-memory repository
    pub database: Option<DatabaseConfig>,

    pub jwt: JwtConfig,

    /// Root user bootstrap
    pub init: InitConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing, at least 32 bytes
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    /// Lifetime of issued tokens in days
    pub validity_days: i64,
}

/// Startup bootstrap configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitConfig {
    /// E-mail of the root user to create at startup
    pub root_email: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or too short, or a
    /// numeric variable does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;
        let cors_origins = parse_origins(&env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".into()));

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse::<u32>()?,
            }),
            _ => None,
        };

        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }
        let validity_days = env::var("JWT_VALIDITY_DAYS")
            .unwrap_or_else(|_| DEFAULT_VALIDITY_DAYS.to_string())
            .parse::<i64>()?;
        if validity_days <= 0 {
            anyhow::bail!("JWT_VALIDITY_DAYS must be positive");
        }

        let root_email = env::var("INIT_ROOT_EMAIL")
            .ok()
            .filter(|email| !email.trim().is_empty());

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database,
            jwt: JwtConfig {
                secret,
                validity_days,
            },
            init: InitConfig { root_email },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Lifetime of newly issued tokens
    pub fn token_validity(&self) -> chrono::Duration {
        chrono::Duration::days(self.jwt.validity_days)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
