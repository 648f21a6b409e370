use std::sync::Arc;
use std::time::Duration;

use domain_items::Geolocation;
use domain_items::models::is_us_zip_code;
use resilience::{Backoff, RetryError, Sleeper, TokioSleeper, retry_with_backoff};
use tracing::instrument;

use crate::client::{GeocodeClient, ZippopotamClient};
use crate::config::GeoConfig;
use crate::error::GeoError;

/// Geocoding with input checking, a per-attempt timeout and exponential
/// backoff.
///
/// Outcomes:
/// - `Ok(geolocation)`
/// - [`GeoError::InvalidPostcode`]: rejected before any request
/// - [`GeoError::NotFound`]: terminal, never retried
/// - [`GeoError::Exhausted`]: every attempt failed transiently
/// - any other [`GeoError`]: a permanent upstream failure
pub struct RetryingGeocoder {
    client: Arc<dyn GeocodeClient>,
    backoff: Backoff,
    attempt_timeout: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl RetryingGeocoder {
    pub fn new(client: Arc<dyn GeocodeClient>, backoff: Backoff, attempt_timeout: Duration) -> Self {
        Self {
            client,
            backoff,
            attempt_timeout,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    /// zippopotam.us client with the configured retry policy.
    pub fn from_config(config: &GeoConfig) -> Self {
        Self::new(
            Arc::new(ZippopotamClient::new(config.api_url.clone())),
            config.backoff(),
            config.attempt_timeout(),
        )
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    #[instrument(skip(self))]
    pub async fn geocode(&self, postcode: &str) -> Result<Geolocation, GeoError> {
        let postcode = postcode.trim();
        if !is_us_zip_code(postcode) {
            return Err(GeoError::InvalidPostcode(postcode.to_string()));
        }

        let attempt_timeout = self.attempt_timeout;
        let client = self.client.as_ref();

        retry_with_backoff(&self.backoff, self.sleeper.as_ref(), move |attempt| async move {
            tracing::debug!(attempt, "Geocoding attempt");
            match tokio::time::timeout(attempt_timeout, client.lookup(postcode)).await {
                Ok(result) => result,
                Err(_) => Err(GeoError::Timeout(attempt_timeout)),
            }
        })
        .await
        .map_err(|e| match e {
            RetryError::Permanent(e) => e,
            RetryError::Exhausted { attempts, last } => GeoError::Exhausted {
                attempts,
                last: Box::new(last),
            },
        })
    }
}
