use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use resilience::Backoff;

/// MongoDB connection settings.
#[derive(Clone, Debug)]
pub struct MongoConfig {
    /// `mongodb://[username:password@]host[:port][/database][?options]`
    pub url: String,
    pub database: String,
    /// Reported to the server in connection metadata.
    pub app_name: Option<String>,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connect_timeout_secs: u64,
    pub server_selection_timeout_secs: u64,
    /// Attempts made by [`super::connect_with_retry`] before giving up.
    pub connect_attempts: u32,
}

impl MongoConfig {
    pub fn new(url: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            database: database.into(),
            ..Self::default()
        }
    }

    pub fn with_app_name(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    /// Startup connection backoff: `connect_attempts` tries, 500ms doubling,
    /// capped at 5s.
    pub fn connect_backoff(&self) -> Backoff {
        Backoff::new(self.connect_attempts, Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(5))
    }
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            url: "mongodb://localhost:27017".to_string(),
            database: "items_db".to_string(),
            app_name: None,
            max_pool_size: 100,
            min_pool_size: 5,
            connect_timeout_secs: 10,
            server_selection_timeout_secs: 30,
            connect_attempts: 5,
        }
    }
}

/// Environment variables (all optional):
/// - `MONGODB_URL` (default `mongodb://localhost:27017`)
/// - `MONGODB_DATABASE` (default `items_db`)
/// - `MONGODB_APP_NAME`
/// - `MONGODB_MAX_POOL_SIZE` (100), `MONGODB_MIN_POOL_SIZE` (5)
/// - `MONGODB_CONNECT_TIMEOUT_SECS` (10)
/// - `MONGODB_SERVER_SELECTION_TIMEOUT_SECS` (30)
/// - `MONGODB_CONNECT_ATTEMPTS` (5)
impl FromEnv for MongoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            url: env_or_default("MONGODB_URL", &defaults.url),
            database: env_or_default("MONGODB_DATABASE", &defaults.database),
            app_name: std::env::var("MONGODB_APP_NAME").ok(),
            max_pool_size: env_parse("MONGODB_MAX_POOL_SIZE", defaults.max_pool_size)?,
            min_pool_size: env_parse("MONGODB_MIN_POOL_SIZE", defaults.min_pool_size)?,
            connect_timeout_secs: env_parse(
                "MONGODB_CONNECT_TIMEOUT_SECS",
                defaults.connect_timeout_secs,
            )?,
            server_selection_timeout_secs: env_parse(
                "MONGODB_SERVER_SELECTION_TIMEOUT_SECS",
                defaults.server_selection_timeout_secs,
            )?,
            connect_attempts: env_parse("MONGODB_CONNECT_ATTEMPTS", defaults.connect_attempts)?,
        };

        if config.database.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "MONGODB_DATABASE".to_string(),
                details: "database name cannot be empty".to_string(),
            });
        }
        if config.min_pool_size > config.max_pool_size {
            return Err(ConfigError::Invalid {
                key: "MONGODB_MIN_POOL_SIZE".to_string(),
                details: format!(
                    "min pool size {} exceeds max pool size {}",
                    config.min_pool_size, config.max_pool_size
                ),
            });
        }

        Ok(config)
    }
}
