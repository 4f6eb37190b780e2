use std::sync::{Mutex, PoisonError};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::model::ClothingItem;

use super::{CatalogStore, NewClothingItem, WardrobeEditor};

/// In-process catalog, handy for tests and offline runs.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    shared: Vec<ClothingItem>,
    personal: Mutex<Vec<ClothingItem>>,
}

impl MemoryCatalog {
    pub fn with_shared(shared: Vec<ClothingItem>) -> Self {
        Self {
            shared,
            personal: Mutex::default(),
        }
    }

    /// Store `item` as-is; its `owner` decides whose wardrobe it lands in.
    pub fn insert_personal(&self, item: ClothingItem) {
        self.personal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(item);
    }

    fn next_id(&self, personal: &[ClothingItem]) -> i64 {
        self.shared
            .iter()
            .chain(personal)
            .map(|item| item.id)
            .max()
            .unwrap_or(0)
            + 1
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    async fn shared_items(&self) -> Result<Vec<ClothingItem>> {
        Ok(self.shared.clone())
    }

    async fn personal_items(&self, owner_id: &str) -> Result<Vec<ClothingItem>> {
        let personal = self.personal.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(personal
            .iter()
            .filter(|item| item.owner.as_deref() == Some(owner_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl WardrobeEditor for MemoryCatalog {
    async fn add_item(&self, owner_id: &str, item: NewClothingItem) -> Result<ClothingItem> {
        item.validate()?;

        let mut personal = self.personal.lock().unwrap_or_else(PoisonError::into_inner);
        let id = self.next_id(&personal);
        let created = ClothingItem {
            id,
            garment_type: item.garment_type.trim().to_string(),
            role: item.role,
            temp_low: item.temp_low,
            temp_high: item.temp_high,
            condition_tag: item.condition_tag.trim().to_ascii_lowercase(),
            image_reference: item.image_reference,
            color: item.color,
            owner: Some(owner_id.to_string()),
            favorited: false,
        };
        personal.push(created.clone());
        Ok(created)
    }

    async fn update_item(&self, owner_id: &str, id: i64, item: NewClothingItem) -> Result<ClothingItem> {
        item.validate()?;

        let mut personal = self.personal.lock().unwrap_or_else(PoisonError::into_inner);
        let existing = personal
            .iter_mut()
            .find(|stored| stored.id == id && stored.owner.as_deref() == Some(owner_id))
            .ok_or_else(|| anyhow!("No wardrobe item {id} found for this owner"))?;

        existing.garment_type = item.garment_type.trim().to_string();
        existing.role = item.role;
        existing.temp_low = item.temp_low;
        existing.temp_high = item.temp_high;
        existing.condition_tag = item.condition_tag.trim().to_ascii_lowercase();
        existing.image_reference = item.image_reference;
        existing.color = item.color;
        Ok(existing.clone())
    }

    async fn remove_item(&self, owner_id: &str, id: i64) -> Result<()> {
        let mut personal = self.personal.lock().unwrap_or_else(PoisonError::into_inner);
        let before = personal.len();
        personal.retain(|item| !(item.id == id && item.owner.as_deref() == Some(owner_id)));

        if personal.len() == before {
            return Err(anyhow!("No wardrobe item {id} found for this owner"));
        }
        Ok(())
    }

    async fn set_favorite(&self, owner_id: &str, id: i64, favorited: bool) -> Result<()> {
        let mut personal = self.personal.lock().unwrap_or_else(PoisonError::into_inner);
        let item = personal
            .iter_mut()
            .find(|item| item.id == id && item.owner.as_deref() == Some(owner_id))
            .ok_or_else(|| anyhow!("No wardrobe item {id} found for this owner"))?;

        item.favorited = favorited;
        Ok(())
    }
}
