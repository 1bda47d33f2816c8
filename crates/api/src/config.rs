use std::env;
use std::str::FromStr;
use std::time::Duration;

use shelter_pages_core::editor::DEFAULT_SAVE_CONCURRENCY;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} has an invalid value {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    /// PostgreSQL connection URL. The in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// Token signing secret.
    pub jwt_secret: String,
    /// Argon2 PHC hash of the staff password. Login is refused when unset.
    pub admin_password_hash: Option<String>,
    /// Store calls a save keeps in flight.
    pub save_concurrency: usize,
    /// Largest accepted request body, image uploads included.
    pub max_upload_bytes: usize,
    /// Seconds an edit session may sit untouched before it is discarded.
    pub session_idle_secs: u64,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

fn var_or<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
        Err(_) => Ok(default),
    }
}

fn optional(var: &str) -> Option<String> {
    env::var(var).ok().filter(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var_or("PORT", 3030)?,
            database_url: optional("DATABASE_URL"),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 20)?,
            db_min_connections: var_or("DB_MIN_CONNECTIONS", 2)?,
            jwt_secret: env::var("JWT_SECRET")
                .unwrap_or_else(|_| "dev-secret-change-me-in-production".to_string()),
            admin_password_hash: optional("ADMIN_PASSWORD_HASH"),
            save_concurrency: var_or("SAVE_CONCURRENCY", DEFAULT_SAVE_CONCURRENCY)?,
            max_upload_bytes: var_or("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
            session_idle_secs: var_or("SESSION_IDLE_SECS", 2 * 60 * 60)?,
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
