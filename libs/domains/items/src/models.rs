use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// US postal code: `NNNNN` or `NNNNN-NNNN`
static US_ZIP_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(?:-\d{4})?$").unwrap());

pub const NAME_MAX_LEN: u64 = 50;
pub const DESCRIPTION_MAX_LEN: u64 = 1000;
pub const LIST_MAX_LIMIT: i64 = 100;

/// Whether `zip` is a well-formed US postal code.
pub fn is_us_zip_code(zip: &str) -> bool {
    US_ZIP_CODE.is_match(zip)
}

fn validate_zip_code(zip: &str) -> Result<(), ValidationError> {
    if !is_us_zip_code(zip) {
        return Err(ValidationError::new("zip_code")
            .with_message("must be a US postal code (NNNNN or NNNNN-NNNN)".into()));
    }
    Ok(())
}

fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Keeps an explicit `null` apart from an absent field: absent is `None`,
/// `null` is `Some(None)`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn validate_update_not_empty(update: &UpdateItem) -> Result<(), ValidationError> {
    if update.changed_fields().is_empty() {
        return Err(ValidationError::new("empty_update")
            .with_message("at least one field must be supplied".into()));
    }
    Ok(())
}

/// Compass quadrant of a location relative to New York City.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Direction {
    NE,
    NW,
    SE,
    SW,
}

/// Attribute value. Closed set: anything else in a request body is a
/// deserialization error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
}

/// Location resolved from an item's zip code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Geolocation {
    pub postcode: String,
    pub country: String,
    pub place_name: String,
    pub state: String,
    pub state_abbreviation: String,
    pub latitude: f64,
    pub longitude: f64,
    pub direction_from_new_york: Direction,
}

/// Item entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    /// UUID v7, assigned on creation
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    /// US postal code used for the geolocation lookup
    pub zip_code: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Filled in asynchronously after creation; `null` until the lookup
    /// succeeds, and stays `null` if it fails.
    pub geolocation: Option<Geolocation>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(
        length(min = 1, max = NAME_MAX_LEN),
        custom(function = "validate_not_blank")
    )]
    #[schema(min_length = 1, max_length = 50, example = "Coffee Maker")]
    pub name: String,
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    pub description: Option<String>,
    #[validate(custom(function = "validate_zip_code"))]
    #[schema(example = "10001")]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

/// DTO for a partial update. Absent fields are left unchanged; at least one
/// field must be present. `"description": null` clears the description.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_update_not_empty"))]
pub struct UpdateItem {
    #[validate(
        length(min = 1, max = NAME_MAX_LEN),
        custom(function = "validate_not_blank")
    )]
    pub name: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[validate(length(max = DESCRIPTION_MAX_LEN))]
    #[schema(value_type = Option<String>, nullable)]
    pub description: Option<Option<String>>,
    pub attributes: Option<BTreeMap<String, AttributeValue>>,
}

impl UpdateItem {
    /// Names of the fields this update sets.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.description.is_some() {
            fields.push("description");
        }
        if self.attributes.is_some() {
            fields.push("attributes");
        }
        fields
    }
}

/// Query filters for listing items
#[derive(Debug, Clone, PartialEq, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ItemFilter {
    /// Case-insensitive substring match on name or description
    pub search: Option<String>,
    /// Exact zip code match
    #[serde(alias = "zipCode")]
    pub zip_code: Option<String>,
    /// Maximum number of results (1-100)
    #[serde(default = "default_limit")]
    #[validate(range(min = 1, max = LIST_MAX_LIMIT))]
    pub limit: i64,
    /// Number of results to skip
    #[serde(default)]
    pub offset: u64,
}

fn default_limit() -> i64 {
    50
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            search: None,
            zip_code: None,
            limit: default_limit(),
            offset: 0,
        }
    }
}

impl ItemFilter {
    /// In-process equivalent of the store-side filter.
    pub fn matches(&self, item: &Item) -> bool {
        if let Some(ref zip) = self.zip_code {
            if item.zip_code.as_deref() != Some(zip.as_str()) {
                return false;
            }
        }

        if let Some(ref search) = self.search {
            let needle = search.to_lowercase();
            let in_name = item.name.to_lowercase().contains(&needle);
            let in_description = item
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }

        true
    }
}

impl Item {
    /// Build a new item from a validated [`CreateItem`].
    pub fn new(input: CreateItem) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: input.name,
            description: input.description,
            zip_code: input.zip_code,
            attributes: input.attributes,
            geolocation: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply the supplied fields and refresh `updated_at`.
    pub fn apply_update(&mut self, update: UpdateItem) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        if let Some(attributes) = update.attributes {
            self.attributes = attributes;
        }
        self.updated_at = Utc::now();
    }
}
