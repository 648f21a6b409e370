//! Item Service - business rules and event publication

use std::sync::Arc;

use messaging::EventBus;
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;
use validator::Validate;

use crate::error::{ItemError, ItemResult};
use crate::events::{ITEM_CREATED, ITEM_DELETED, ITEM_UPDATED, ItemCreated, ItemDeleted, ItemUpdated};
use crate::models::{CreateItem, Item, ItemFilter, UpdateItem};
use crate::repository::ItemRepository;

/// Item service.
///
/// Validates input, delegates storage to the repository and announces
/// every successful mutation on the event bus. Publication is
/// fire-and-forget: the caller gets its response before any subscriber runs.
pub struct ItemService<R: ItemRepository + ?Sized> {
    repository: Arc<R>,
    bus: Arc<EventBus>,
}

impl<R: ItemRepository + ?Sized> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            bus: Arc::clone(&self.bus),
        }
    }
}

impl<R: ItemRepository + ?Sized> ItemService<R> {
    pub fn new(repository: Arc<R>, bus: Arc<EventBus>) -> Self {
        Self { repository, bus }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    #[instrument(skip(self, input), fields(item_name = %input.name))]
    pub async fn create_item(&self, input: CreateItem) -> ItemResult<Item> {
        input.validate()?;

        let item = self.repository.create(input).await?;

        self.announce(
            ITEM_CREATED,
            &ItemCreated {
                item_id: item.id,
                zip_code: item.zip_code.clone(),
            },
        )
        .await;

        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: Uuid) -> ItemResult<Item> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(ItemError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_items(&self, filter: ItemFilter) -> ItemResult<Vec<Item>> {
        filter.validate()?;
        self.repository.list(filter).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_item(&self, id: Uuid, input: UpdateItem) -> ItemResult<Item> {
        input.validate()?;

        let changed_fields = input
            .changed_fields()
            .into_iter()
            .map(str::to_string)
            .collect();
        let item = self.repository.update(id, input).await?;

        self.announce(
            ITEM_UPDATED,
            &ItemUpdated {
                item_id: id,
                changed_fields,
            },
        )
        .await;

        Ok(item)
    }

    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: Uuid) -> ItemResult<()> {
        self.repository.delete(id).await?;
        self.announce(ITEM_DELETED, &ItemDeleted { item_id: id }).await;
        Ok(())
    }

    /// The mutation already happened; a payload that cannot be encoded is
    /// logged rather than turned into a failed request.
    async fn announce<T: Serialize>(&self, topic: &str, payload: &T) {
        if let Err(e) = self.bus.publish(topic, payload).await {
            tracing::warn!(topic, error = %e, "Failed to publish item event");
        }
    }
}
