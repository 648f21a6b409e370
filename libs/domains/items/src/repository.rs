use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ItemResult;
use crate::models::{CreateItem, Geolocation, Item, ItemFilter, UpdateItem};

/// Item persistence.
///
/// Every operation touches a single document. Missing items are reported
/// as `Ok(None)` from [`get_by_id`](Self::get_by_id) and as
/// [`ItemError::NotFound`](crate::ItemError::NotFound) everywhere else.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Assign an id and timestamps, then store the item.
    async fn create(&self, input: CreateItem) -> ItemResult<Item>;

    async fn get_by_id(&self, id: Uuid) -> ItemResult<Option<Item>>;

    /// Newest first, paged by `filter.limit` and `filter.offset`.
    async fn list(&self, filter: ItemFilter) -> ItemResult<Vec<Item>>;

    /// Set the supplied fields and refresh `updated_at`.
    async fn update(&self, id: Uuid, input: UpdateItem) -> ItemResult<Item>;

    async fn delete(&self, id: Uuid) -> ItemResult<()>;

    /// Store the result of a geolocation lookup.
    async fn set_geolocation(&self, id: Uuid, geolocation: Geolocation) -> ItemResult<Item>;
}
