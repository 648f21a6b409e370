use std::time::Duration;

use mongodb::{Client, bson::doc, options::ClientOptions};
use resilience::{Sleeper, retry_with_backoff};
use tracing::info;

use super::{MongoConfig, MongoError};

/// Connect and verify the deployment answers a `ping`.
pub async fn connect(config: &MongoConfig) -> Result<Client, MongoError> {
    info!(database = %config.database, "Connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.url).await?;
    options.max_pool_size = Some(config.max_pool_size);
    options.min_pool_size = Some(config.min_pool_size);
    options.connect_timeout = Some(Duration::from_secs(config.connect_timeout_secs));
    options.server_selection_timeout =
        Some(Duration::from_secs(config.server_selection_timeout_secs));
    if let Some(ref app_name) = config.app_name {
        options.app_name = Some(app_name.clone());
    }

    let client = Client::with_options(options)?;

    client
        .database(&config.database)
        .run_command(doc! { "ping": 1 })
        .await
        .map_err(|e| MongoError::ConnectionFailed(e.to_string()))?;

    info!("Connected to MongoDB");
    Ok(client)
}

/// [`connect`] retried on [`MongoConfig::connect_backoff`].
///
/// Startup helper for when the database container comes up after the app.
pub async fn connect_with_retry(
    config: &MongoConfig,
    sleeper: &dyn Sleeper,
) -> Result<Client, MongoError> {
    retry_with_backoff(&config.connect_backoff(), sleeper, |attempt| {
        info!(attempt, "MongoDB connection attempt");
        connect(config)
    })
    .await
    .map_err(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use resilience::RecordingSleeper;

    #[tokio::test]
    async fn test_malformed_url_fails_without_retry() {
        let config = MongoConfig::new("definitely not a url", "db");
        let sleeper = RecordingSleeper::new();

        let result = connect_with_retry(&config, &sleeper).await;
        assert!(matches!(result, Err(MongoError::Mongo(_))));
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    #[ignore] // Requires actual MongoDB
    async fn test_connect() {
        let url = std::env::var("MONGODB_URL")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        assert!(connect(&MongoConfig::new(url, "test")).await.is_ok());
    }
}
