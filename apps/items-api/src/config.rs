use std::fmt;

use core_config::{
    AppInfo, ConfigError, FromEnv, app_info, env_flag, env_required, server::ServerConfig,
};
use database::MongoConfig;
use domain_geo::GeoConfig;

pub use core_config::Environment;

/// Shared secret for mutating item routes.
#[derive(Clone)]
pub struct AuthConfig {
    pub api_token: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("api_token", &"[REDACTED]")
            .finish()
    }
}

impl FromEnv for AuthConfig {
    /// - API_TOKEN: required, non-blank
    fn from_env() -> Result<Self, ConfigError> {
        let api_token = env_required("API_TOKEN")?;
        if api_token.trim().is_empty() {
            return Err(ConfigError::Invalid {
                key: "API_TOKEN".to_string(),
                details: "token cannot be blank".to_string(),
            });
        }
        Ok(Self { api_token })
    }
}

/// Which item store backs the repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub use_in_memory: bool,
}

impl FromEnv for StoreConfig {
    /// - USE_IN_MEMORY_STORE: defaults to true
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            use_in_memory: env_flag("USE_IN_MEMORY_STORE", true)?,
        })
    }
}

/// Application configuration
/// Composes the shared config components
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub mongodb: MongoConfig,
    pub geo: GeoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            app: app_info!(),
            auth: AuthConfig::from_env()?,
            store: StoreConfig::from_env()?,
            mongodb: MongoConfig::from_env()?,
            geo: GeoConfig::from_env()?,
            server: ServerConfig::from_env()?,
            environment: Environment::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_token_is_required() {
        temp_env::with_var_unset("API_TOKEN", || {
            let err = Config::from_env().unwrap_err();
            assert!(err.to_string().contains("API_TOKEN"));
        });
    }

    #[test]
    fn test_blank_api_token_rejected() {
        temp_env::with_var("API_TOKEN", Some("   "), || {
            assert!(matches!(
                AuthConfig::from_env(),
                Err(ConfigError::Invalid { .. })
            ));
        });
    }

    #[test]
    fn test_defaults_use_in_memory_store() {
        temp_env::with_vars(
            [
                ("API_TOKEN", Some("secret")),
                ("USE_IN_MEMORY_STORE", None),
                ("GEO_MAX_ATTEMPTS", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.store.use_in_memory);
                assert_eq!(config.geo.max_attempts, 3);
                assert_eq!(config.app.name, "items_api");
            },
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let auth = AuthConfig {
            api_token: "hunter2".to_string(),
        };
        assert!(!format!("{auth:?}").contains("hunter2"));
    }
}
