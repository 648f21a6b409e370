use std::time::Duration;

use core_config::{ConfigError, FromEnv, env_or_default, env_parse};
use resilience::Backoff;

pub const DEFAULT_API_URL: &str = "https://api.zippopotam.us/us";

/// Geocoding client settings
///
/// Environment variables:
/// - `GEO_API_URL` (default `https://api.zippopotam.us/us`)
/// - `GEO_MAX_ATTEMPTS` (3)
/// - `GEO_BASE_DELAY_MS` (500)
/// - `GEO_MAX_DELAY_MS` (unset or `0` = no cap)
/// - `GEO_ATTEMPT_TIMEOUT_MS` (5000)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoConfig {
    pub api_url: String,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: Option<u64>,
    pub attempt_timeout_ms: u64,
}

impl Default for GeoConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: None,
            attempt_timeout_ms: 5_000,
        }
    }
}

impl GeoConfig {
    pub fn backoff(&self) -> Backoff {
        let backoff = Backoff::new(self.max_attempts, Duration::from_millis(self.base_delay_ms));
        match self.max_delay_ms {
            Some(ms) => backoff.with_max_delay(Duration::from_millis(ms)),
            None => backoff,
        }
    }

    pub fn attempt_timeout(&self) -> Duration {
        Duration::from_millis(self.attempt_timeout_ms)
    }
}

impl FromEnv for GeoConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_delay_ms = env_parse("GEO_MAX_DELAY_MS", 0u64)?;
        let config = Self {
            api_url: env_or_default("GEO_API_URL", &defaults.api_url)
                .trim_end_matches('/')
                .to_string(),
            max_attempts: env_parse("GEO_MAX_ATTEMPTS", defaults.max_attempts)?,
            base_delay_ms: env_parse("GEO_BASE_DELAY_MS", defaults.base_delay_ms)?,
            max_delay_ms: (max_delay_ms > 0).then_some(max_delay_ms),
            attempt_timeout_ms: env_parse("GEO_ATTEMPT_TIMEOUT_MS", defaults.attempt_timeout_ms)?,
        };

        if config.api_url.is_empty() {
            return Err(ConfigError::Invalid {
                key: "GEO_API_URL".to_string(),
                details: "must not be empty".to_string(),
            });
        }
        if config.max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "GEO_MAX_ATTEMPTS".to_string(),
                details: "at least one attempt is required".to_string(),
            });
        }
        if config.attempt_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "GEO_ATTEMPT_TIMEOUT_MS".to_string(),
                details: "must be greater than zero".to_string(),
            });
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VARS: [&str; 5] = [
        "GEO_API_URL",
        "GEO_MAX_ATTEMPTS",
        "GEO_BASE_DELAY_MS",
        "GEO_MAX_DELAY_MS",
        "GEO_ATTEMPT_TIMEOUT_MS",
    ];

    #[test]
    fn test_from_env_defaults() {
        temp_env::with_vars_unset(VARS, || {
            let config = GeoConfig::from_env().unwrap();
            assert_eq!(config, GeoConfig::default());

            let backoff = config.backoff();
            assert_eq!(backoff.max_attempts, 3);
            assert_eq!(backoff.base_delay, Duration::from_millis(500));
            assert_eq!(backoff.max_delay, None);
        });
    }

    #[test]
    fn test_from_env_overrides() {
        temp_env::with_vars(
            [
                ("GEO_API_URL", Some("http://localhost:9000/us/")),
                ("GEO_MAX_ATTEMPTS", Some("5")),
                ("GEO_BASE_DELAY_MS", Some("100")),
                ("GEO_MAX_DELAY_MS", Some("250")),
                ("GEO_ATTEMPT_TIMEOUT_MS", Some("750")),
            ],
            || {
                let config = GeoConfig::from_env().unwrap();
                assert_eq!(config.api_url, "http://localhost:9000/us");
                assert_eq!(config.attempt_timeout(), Duration::from_millis(750));

                let backoff = config.backoff();
                assert_eq!(backoff.max_attempts, 5);
                assert_eq!(backoff.max_delay, Some(Duration::from_millis(250)));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_zero_attempts() {
        temp_env::with_vars(
            [("GEO_MAX_ATTEMPTS", Some("0")), ("GEO_API_URL", None)],
            || {
                assert!(matches!(
                    GeoConfig::from_env(),
                    Err(ConfigError::Invalid { .. })
                ));
            },
        );
    }

    #[test]
    fn test_from_env_rejects_garbage() {
        temp_env::with_var("GEO_BASE_DELAY_MS", Some("soon"), || {
            assert!(matches!(
                GeoConfig::from_env(),
                Err(ConfigError::ParseError { .. })
            ));
        });
    }
}
