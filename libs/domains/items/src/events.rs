//! Item lifecycle events published on the in-process bus.

use std::sync::Arc;

use async_trait::async_trait;
use messaging::{Event, EventBus, EventHandler, HandlerError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ITEM_CREATED: &str = "item.created";
pub const ITEM_UPDATED: &str = "item.updated";
pub const ITEM_DELETED: &str = "item.deleted";

pub const ALL_TOPICS: [&str; 3] = [ITEM_CREATED, ITEM_UPDATED, ITEM_DELETED];

/// Payload of [`ITEM_CREATED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCreated {
    pub item_id: Uuid,
    pub zip_code: Option<String>,
}

/// Payload of [`ITEM_UPDATED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub item_id: Uuid,
    pub changed_fields: Vec<String>,
}

/// Payload of [`ITEM_DELETED`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub item_id: Uuid,
}

/// Logs every item lifecycle event.
#[derive(Debug, Default, Clone, Copy)]
pub struct ItemEventLogger;

impl ItemEventLogger {
    /// Subscribe a logger to all item topics.
    pub fn register(bus: &EventBus) {
        let logger: Arc<dyn EventHandler> = Arc::new(Self);
        for topic in ALL_TOPICS {
            bus.subscribe(topic, Arc::clone(&logger));
        }
    }
}

#[async_trait]
impl EventHandler for ItemEventLogger {
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        match event.topic.as_str() {
            ITEM_CREATED => {
                let e: ItemCreated = event.decode()?;
                tracing::info!(item_id = %e.item_id, zip_code = ?e.zip_code, "Item created");
            }
            ITEM_UPDATED => {
                let e: ItemUpdated = event.decode()?;
                tracing::info!(item_id = %e.item_id, changed = ?e.changed_fields, "Item updated");
            }
            ITEM_DELETED => {
                let e: ItemDeleted = event.decode()?;
                tracing::info!(item_id = %e.item_id, "Item deleted");
            }
            other => tracing::debug!(topic = other, "Ignoring unrelated event"),
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "item_event_logger"
    }
}
