use std::{convert::TryFrom, fmt::Debug};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    Config,
    model::{Category, ClothingItem, Role},
};

pub mod memory;
pub mod rest;

pub use memory::MemoryCatalog;
pub use rest::RestCatalogStore;

/// Table holding the catalog every user sees.
pub const SHARED_TABLE: &str = "general-wardrobe";
/// Table holding per-owner wardrobes, keyed by `user_id`.
pub const PERSONAL_TABLE: &str = "personal-wardrobe";

/// Why a wardrobe record was refused at the store boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing field '{0}'")]
    MissingField(&'static str),

    #[error("unknown role '{0}' (expected top, bottom or other)")]
    UnknownRole(String),

    #[error("temperature range {low}..{high} is inverted")]
    InvertedRange { low: f64, high: f64 },

    #[error("unknown condition tag '{0}' (expected rain, snow, clouds, clear or all)")]
    UnknownCondition(String),
}

/// A wardrobe row exactly as the store returns it. Nothing here is trusted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(alias = "clothing-type", skip_serializing_if = "Option::is_none")]
    pub clothing_type: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_low: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_high: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather_con: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorited: Option<bool>,
}

fn required(value: Option<String>, field: &'static str) -> Result<String, RecordError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(RecordError::MissingField(field))
}

/// An inverted temperature range is accepted here; it simply never matches.
impl TryFrom<CatalogRow> for ClothingItem {
    type Error = RecordError;

    fn try_from(row: CatalogRow) -> Result<Self, Self::Error> {
        let id = row.id.ok_or(RecordError::MissingField("id"))?;
        let garment_type = required(row.clothing_type, "clothing_type")?;
        let role_label = required(row.category, "type")?;
        let role = role_label
            .parse::<Role>()
            .map_err(|_| RecordError::UnknownRole(role_label))?;
        let temp_low = row.temp_low.ok_or(RecordError::MissingField("temp_low"))?;
        let temp_high = row.temp_high.ok_or(RecordError::MissingField("temp_high"))?;
        let condition_tag = required(row.weather_con, "weather_con")?;

        Ok(ClothingItem {
            id,
            garment_type,
            role,
            temp_low,
            temp_high,
            condition_tag,
            image_reference: row.image_url.filter(|s| !s.is_empty()),
            color: row.color.filter(|s| !s.is_empty()),
            owner: row.user_id,
            favorited: row.favorited.unwrap_or(false),
        })
    }
}

/// Convert rows, dropping the ones that fail validation.
pub fn quarantine(rows: Vec<CatalogRow>, table: &str) -> Vec<ClothingItem> {
    let total = rows.len();
    let items: Vec<ClothingItem> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.id;
            match ClothingItem::try_from(row) {
                Ok(item) => {
                    if item.temp_low > item.temp_high {
                        debug!(table, id = item.id, "item has an inverted range and will never match");
                    }
                    Some(item)
                }
                Err(err) => {
                    warn!(table, ?id, error = %err, "skipping malformed wardrobe row");
                    None
                }
            }
        })
        .collect();

    debug!(table, total, kept = items.len(), "loaded wardrobe rows");
    items
}

/// Input for a new personal wardrobe item.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClothingItem {
    pub garment_type: String,
    pub role: Role,
    pub temp_low: f64,
    pub temp_high: f64,
    pub condition_tag: String,
    pub image_reference: Option<String>,
    pub color: Option<String>,
}

impl NewClothingItem {
    /// New records are held to a stricter standard than rows already stored.
    pub fn validate(&self) -> Result<(), RecordError> {
        if self.garment_type.trim().is_empty() {
            return Err(RecordError::MissingField("clothing_type"));
        }
        if self.temp_low > self.temp_high {
            return Err(RecordError::InvertedRange {
                low: self.temp_low,
                high: self.temp_high,
            });
        }
        let tag = self.condition_tag.trim().to_ascii_lowercase();
        if !Category::all().iter().any(|c| c.as_str() == tag) {
            return Err(RecordError::UnknownCondition(self.condition_tag.clone()));
        }
        Ok(())
    }

    pub fn into_row(self, owner_id: &str) -> CatalogRow {
        CatalogRow {
            id: None,
            clothing_type: Some(self.garment_type.trim().to_string()),
            category: Some(self.role.as_str().to_string()),
            temp_low: Some(self.temp_low),
            temp_high: Some(self.temp_high),
            weather_con: Some(self.condition_tag.trim().to_ascii_lowercase()),
            image_url: self.image_reference,
            color: self.color,
            user_id: Some(owner_id.to_string()),
            favorited: Some(false),
        }
    }

    /// Column changes for an existing row. Owner and favorite flag are left alone.
    pub fn into_changes(self) -> CatalogRow {
        CatalogRow {
            user_id: None,
            favorited: None,
            ..self.into_row("")
        }
    }
}

/// Read access to the shared and personal catalogs.
#[async_trait]
pub trait CatalogStore: Send + Sync + Debug {
    async fn shared_items(&self) -> anyhow::Result<Vec<ClothingItem>>;

    async fn personal_items(&self, owner_id: &str) -> anyhow::Result<Vec<ClothingItem>>;
}

/// Mutations on a personal wardrobe. The outfit engine never uses these.
#[async_trait]
pub trait WardrobeEditor: Send + Sync + Debug {
    async fn add_item(&self, owner_id: &str, item: NewClothingItem) -> anyhow::Result<ClothingItem>;

    /// Replace the descriptive fields of an existing item.
    async fn update_item(
        &self,
        owner_id: &str,
        id: i64,
        item: NewClothingItem,
    ) -> anyhow::Result<ClothingItem>;

    async fn remove_item(&self, owner_id: &str, id: i64) -> anyhow::Result<()>;

    async fn set_favorite(&self, owner_id: &str, id: i64, favorited: bool) -> anyhow::Result<()>;
}

/// Construct the hosted store client from config.
pub fn store_from_config(config: &Config) -> anyhow::Result<RestCatalogStore> {
    let store = config.store_config()?;
    Ok(RestCatalogStore::new(store.url.clone(), store.api_key.clone()))
}
