//! MongoDB implementation of ItemRepository

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{Document, doc, to_bson},
    options::{FindOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{ItemError, ItemResult};
use crate::models::{AttributeValue, CreateItem, Geolocation, Item, ItemFilter, UpdateItem};
use crate::repository::ItemRepository;

pub const COLLECTION_NAME: &str = "items";

/// Stored shape of an item. The id lives in `_id` as its hyphenated string
/// so filters and sorting do not depend on the serializer's UUID encoding.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemDocument {
    #[serde(rename = "_id")]
    id: String,
    name: String,
    description: Option<String>,
    zip_code: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, AttributeValue>,
    geolocation: Option<Geolocation>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Item> for ItemDocument {
    fn from(item: Item) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.name,
            description: item.description,
            zip_code: item.zip_code,
            attributes: item.attributes,
            geolocation: item.geolocation,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

impl TryFrom<ItemDocument> for Item {
    type Error = ItemError;

    fn try_from(doc: ItemDocument) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&doc.id).map_err(|e| {
            ItemError::Database(format!("stored id {:?} is not a UUID: {e}", doc.id))
        })?;

        Ok(Self {
            id,
            name: doc.name,
            description: doc.description,
            zip_code: doc.zip_code,
            attributes: doc.attributes,
            geolocation: doc.geolocation,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

pub struct MongoItemRepository {
    collection: Collection<ItemDocument>,
}

impl MongoItemRepository {
    /// Repository over the `items` collection of `db`.
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, COLLECTION_NAME)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            collection: db.collection::<ItemDocument>(collection_name),
        }
    }

    /// Create the secondary indexes used by list filters. Idempotent.
    pub async fn ensure_indexes(&self) -> ItemResult<()> {
        let indexes = vec![
            IndexModel::builder().keys(doc! { "zip_code": 1 }).build(),
            IndexModel::builder().keys(doc! { "name": 1 }).build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    fn id_filter(id: Uuid) -> Document {
        doc! { "_id": id.to_string() }
    }

    fn build_filter(filter: &ItemFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref zip) = filter.zip_code {
            doc.insert("zip_code", zip);
        }

        if let Some(ref search) = filter.search {
            let pattern = regex::escape(search);
            doc.insert(
                "$or",
                vec![
                    doc! { "name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "description": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }

        doc
    }

    fn build_update(input: UpdateItem) -> ItemResult<Document> {
        let mut set = doc! { "updated_at": to_bson(&Utc::now())? };

        if let Some(name) = input.name {
            set.insert("name", name);
        }
        // Some(None) stores null
        if let Some(description) = input.description {
            set.insert("description", description);
        }
        if let Some(attributes) = input.attributes {
            set.insert("attributes", to_bson(&attributes)?);
        }

        Ok(doc! { "$set": set })
    }

    async fn update_one(&self, id: Uuid, update: Document) -> ItemResult<Item> {
        self.collection
            .find_one_and_update(Self::id_filter(id), update)
            .return_document(ReturnDocument::After)
            .await?
            .ok_or(ItemError::NotFound(id))?
            .try_into()
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    #[instrument(skip(self, input), fields(item_name = %input.name))]
    async fn create(&self, input: CreateItem) -> ItemResult<Item> {
        let item = Item::new(input);

        self.collection
            .insert_one(ItemDocument::from(item.clone()))
            .await?;

        tracing::info!(item_id = %item.id, "Item created");
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn get_by_id(&self, id: Uuid) -> ItemResult<Option<Item>> {
        self.collection
            .find_one(Self::id_filter(id))
            .await?
            .map(Item::try_from)
            .transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, filter: ItemFilter) -> ItemResult<Vec<Item>> {
        let options = FindOptions::builder()
            .limit(filter.limit)
            .skip(filter.offset)
            // v7 ids sort by creation time
            .sort(doc! { "_id": -1 })
            .build();

        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .with_options(options)
            .await?;
        let docs: Vec<ItemDocument> = cursor.try_collect().await?;

        docs.into_iter().map(Item::try_from).collect()
    }

    #[instrument(skip(self, input))]
    async fn update(&self, id: Uuid, input: UpdateItem) -> ItemResult<Item> {
        let item = self.update_one(id, Self::build_update(input)?).await?;
        tracing::info!(item_id = %id, "Item updated");
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Uuid) -> ItemResult<()> {
        let result = self.collection.delete_one(Self::id_filter(id)).await?;

        if result.deleted_count == 0 {
            return Err(ItemError::NotFound(id));
        }

        tracing::info!(item_id = %id, "Item deleted");
        Ok(())
    }

    #[instrument(skip(self, geolocation))]
    async fn set_geolocation(&self, id: Uuid, geolocation: Geolocation) -> ItemResult<Item> {
        let update = doc! {
            "$set": {
                "geolocation": to_bson(&geolocation)?,
                "updated_at": to_bson(&Utc::now())?,
            }
        };
        self.update_one(id, update).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_empty() {
        let doc = MongoItemRepository::build_filter(&ItemFilter::default());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_build_filter_escapes_search() {
        let filter = ItemFilter {
            search: Some("a.b(c".to_string()),
            ..Default::default()
        };
        let doc = MongoItemRepository::build_filter(&filter);
        let clauses = doc.get_array("$or").unwrap();
        let name = clauses[0].as_document().unwrap().get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), r"a\.b\(c");
    }

    #[test]
    fn test_build_filter_zip_code() {
        let filter = ItemFilter {
            zip_code: Some("10001".to_string()),
            ..Default::default()
        };
        let doc = MongoItemRepository::build_filter(&filter);
        assert_eq!(doc.get_str("zip_code").unwrap(), "10001");
    }

    #[test]
    fn test_build_update_sets_only_supplied_fields() {
        let update = UpdateItem {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let doc = MongoItemRepository::build_update(update).unwrap();
        let set = doc.get_document("$set").unwrap();
        assert_eq!(set.get_str("name").unwrap(), "Renamed");
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("description"));
        assert!(!set.contains_key("attributes"));
    }

    #[test]
    fn test_build_update_null_description_clears_it() {
        let update = UpdateItem {
            description: Some(None),
            ..Default::default()
        };
        let doc = MongoItemRepository::build_update(update).unwrap();
        let set = doc.get_document("$set").unwrap();
        assert_eq!(set.get("description"), Some(&mongodb::bson::Bson::Null));
    }

    #[test]
    fn test_document_round_trip_keeps_id() {
        let item = Item::new(CreateItem {
            name: "Kettle".into(),
            ..Default::default()
        });
        let stored = mongodb::bson::to_document(&ItemDocument::from(item.clone())).unwrap();
        assert_eq!(stored.get_str("_id").unwrap(), item.id.to_string());
        assert!(!stored.contains_key("id"));

        let back: ItemDocument = mongodb::bson::from_document(stored).unwrap();
        assert_eq!(Item::try_from(back).unwrap(), item);
    }

    #[test]
    fn test_corrupt_id_is_a_database_error() {
        let item = Item::new(CreateItem {
            name: "Kettle".into(),
            ..Default::default()
        });
        let mut doc = ItemDocument::from(item);
        doc.id = "not-a-uuid".into();
        assert!(matches!(Item::try_from(doc), Err(ItemError::Database(_))));
    }
}
