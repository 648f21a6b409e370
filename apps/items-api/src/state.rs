//! Shared application state.
//!
//! Built once at start-up and cloned into handlers (all fields are cheap
//! `Arc`/handle clones). Owns the event bus and registers its subscribers.

use std::sync::Arc;

use database::MongoError;
use database::mongodb::{Database, connect_with_retry};
use domain_geo::{GeoLookupHandler, RetryingGeocoder};
use domain_items::{
    InMemoryItemRepository, ItemEventLogger, ItemRepository, ItemService, MongoItemRepository,
    events::ITEM_CREATED,
};
use messaging::EventBus;
use resilience::TokioSleeper;
use tracing::info;

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repository: Arc<dyn ItemRepository>,
    /// Set when MongoDB backs the repository; pinged by `/ready`.
    pub database: Option<Database>,
    pub bus: Arc<EventBus>,
    pub geocoder: Arc<RetryingGeocoder>,
}

impl AppState {
    /// Connect the configured store and wire up the bus.
    pub async fn init(config: Config) -> eyre::Result<Self> {
        let geocoder = Arc::new(RetryingGeocoder::from_config(&config.geo));

        if config.store.use_in_memory {
            info!("Using in-memory item store");
            let repository = Arc::new(InMemoryItemRepository::new());
            return Ok(Self::assemble(config, repository, None, geocoder));
        }

        info!("Connecting to MongoDB at {}", config.mongodb.url);
        let client = connect_with_retry(&config.mongodb, &TokioSleeper).await?;
        let db = client.database(&config.mongodb.database);

        let repository = MongoItemRepository::new(&db);
        repository
            .ensure_indexes()
            .await
            .map_err(|e| eyre::eyre!("Failed to create item indexes: {}", e))?;
        info!(
            "Successfully connected to MongoDB database: {}",
            config.mongodb.database
        );

        Ok(Self::assemble(config, Arc::new(repository), Some(db), geocoder))
    }

    /// Build the state from ready-made parts and register the subscribers
    /// on a fresh bus.
    pub fn assemble(
        config: Config,
        repository: Arc<dyn ItemRepository>,
        database: Option<Database>,
        geocoder: Arc<RetryingGeocoder>,
    ) -> Self {
        let bus = Arc::new(EventBus::new());
        ItemEventLogger::register(&bus);
        bus.subscribe(
            ITEM_CREATED,
            Arc::new(GeoLookupHandler::new(geocoder.clone(), repository.clone())),
        );

        Self {
            config,
            repository,
            database,
            bus,
            geocoder,
        }
    }

    pub fn item_service(&self) -> ItemService<dyn ItemRepository> {
        ItemService::new(self.repository.clone(), self.bus.clone())
    }

    pub async fn check_store(&self) -> Result<(), MongoError> {
        match &self.database {
            Some(db) => database::mongodb::check_health(db).await,
            None => Ok(()),
        }
    }
}
