//! Items Domain
//!
//! Catalogue items with an optional US zip code. Creating an item with a zip
//! code publishes `item.created`; a subscriber elsewhere resolves the
//! geolocation and stores it through [`ItemRepository::set_geolocation`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐      ┌──────────┐
//! │   Service   │ ───▶ │ EventBus │  item.created / updated / deleted
//! └──────┬──────┘      └──────────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← trait + MongoDB and in-memory implementations
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use domain_items::{InMemoryItemRepository, ItemEventLogger, ItemRepository, ItemService, handlers};
//! use messaging::EventBus;
//!
//! let bus = Arc::new(EventBus::new());
//! ItemEventLogger::register(&bus);
//!
//! let repository: Arc<dyn ItemRepository> = Arc::new(InMemoryItemRepository::new());
//! let service = ItemService::new(repository, bus);
//!
//! let router = axum::Router::new().nest("/items", handlers::router(service));
//! ```

pub mod error;
pub mod events;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ItemError, ItemResult};
pub use events::{ItemCreated, ItemDeleted, ItemEventLogger, ItemUpdated};
pub use handlers::ApiDoc;
pub use memory::InMemoryItemRepository;
pub use models::{
    AttributeValue, CreateItem, Direction, Geolocation, Item, ItemFilter, UpdateItem,
};
pub use mongodb::MongoItemRepository;
pub use repository::ItemRepository;
pub use service::ItemService;
