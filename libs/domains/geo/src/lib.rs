//! Geo Domain
//!
//! Resolves US postal codes to a place and coordinates through a
//! zippopotam.us-compatible API.
//!
//! - [`ZippopotamClient`]: one HTTP lookup, no retries
//! - [`RetryingGeocoder`]: postcode check, per-attempt timeout and
//!   exponential backoff around any [`GeocodeClient`]
//! - [`GeoLookupHandler`]: `item.created` subscriber that stores the result
//!   on the item
//! - [`handlers`]: `POST /geo/location`
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use core_config::FromEnv;
//! use domain_geo::{GeoConfig, GeoLookupHandler, RetryingGeocoder};
//! use domain_items::{InMemoryItemRepository, ItemRepository, events::ITEM_CREATED};
//! use messaging::EventBus;
//!
//! # fn example() -> Result<(), core_config::ConfigError> {
//! let geocoder = Arc::new(RetryingGeocoder::from_config(&GeoConfig::from_env()?));
//! let repository: Arc<dyn ItemRepository> = Arc::new(InMemoryItemRepository::new());
//!
//! let bus = EventBus::new();
//! bus.subscribe(ITEM_CREATED, Arc::new(GeoLookupHandler::new(geocoder, repository)));
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod direction;
pub mod error;
pub mod geocoder;
pub mod handlers;
pub mod subscriber;

pub use client::{GeocodeClient, ScriptedGeocodeClient, ZippopotamClient};
pub use config::GeoConfig;
pub use direction::direction_from_new_york;
pub use error::GeoError;
pub use geocoder::RetryingGeocoder;
pub use handlers::ApiDoc;
pub use subscriber::GeoLookupHandler;
