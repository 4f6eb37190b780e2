use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::json;
use tracing::debug;

use crate::{model::ClothingItem, provider::truncate_body};

use super::{
    CatalogRow, CatalogStore, NewClothingItem, PERSONAL_TABLE, SHARED_TABLE, WardrobeEditor,
    quarantine,
};

/// Client for a PostgREST-style hosted table API.
#[derive(Debug, Clone)]
pub struct RestCatalogStore {
    base_url: String,
    api_key: String,
    http: Client,
}

impl RestCatalogStore {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            http: Client::new(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_rows(&self, table: &str, filters: &[(&str, String)]) -> Result<Vec<CatalogRow>> {
        debug!(table, "fetching wardrobe rows");

        let res = self
            .authorized(self.http.get(self.table_url(table)))
            .query(&[("select", "*")])
            .query(filters)
            .send()
            .await
            .with_context(|| format!("Failed to send request to wardrobe store ({table})"))?;

        let body = read_body(res, table).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse wardrobe store JSON ({table})"))
    }

    /// Sends a mutation that asks for the touched rows back.
    async fn mutate(&self, request: RequestBuilder, table: &str) -> Result<Vec<CatalogRow>> {
        let res = self
            .authorized(request)
            .header("Prefer", "return=representation")
            .send()
            .await
            .with_context(|| format!("Failed to send request to wardrobe store ({table})"))?;

        let body = read_body(res, table).await?;
        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse wardrobe store JSON ({table})"))
    }
}

async fn read_body(res: Response, table: &str) -> Result<String> {
    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read wardrobe store response body ({table})"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "Wardrobe store request ({table}) failed with status {}: {}",
            status,
            truncate_body(&body),
        ));
    }
    Ok(body)
}

fn owner_filters(owner_id: &str, id: i64) -> [(&'static str, String); 2] {
    [("id", format!("eq.{id}")), ("user_id", format!("eq.{owner_id}"))]
}

#[async_trait]
impl CatalogStore for RestCatalogStore {
    async fn shared_items(&self) -> Result<Vec<ClothingItem>> {
        let rows = self.fetch_rows(SHARED_TABLE, &[]).await?;
        Ok(quarantine(rows, SHARED_TABLE))
    }

    async fn personal_items(&self, owner_id: &str) -> Result<Vec<ClothingItem>> {
        let rows = self
            .fetch_rows(PERSONAL_TABLE, &[("user_id", format!("eq.{owner_id}"))])
            .await?;
        Ok(quarantine(rows, PERSONAL_TABLE))
    }
}

#[async_trait]
impl WardrobeEditor for RestCatalogStore {
    async fn add_item(&self, owner_id: &str, item: NewClothingItem) -> Result<ClothingItem> {
        item.validate()?;
        let row = item.into_row(owner_id);

        let request = self.http.post(self.table_url(PERSONAL_TABLE)).json(&row);
        let created = self
            .mutate(request, PERSONAL_TABLE)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("Wardrobe store returned no row for the new item"))?;

        Ok(ClothingItem::try_from(created)?)
    }

    async fn update_item(&self, owner_id: &str, id: i64, item: NewClothingItem) -> Result<ClothingItem> {
        item.validate()?;

        let request = self
            .http
            .patch(self.table_url(PERSONAL_TABLE))
            .query(&owner_filters(owner_id, id))
            .json(&item.into_changes());
        let updated = self
            .mutate(request, PERSONAL_TABLE)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| anyhow!("No wardrobe item {id} found for this owner"))?;

        Ok(ClothingItem::try_from(updated)?)
    }

    async fn remove_item(&self, owner_id: &str, id: i64) -> Result<()> {
        let request = self
            .http
            .delete(self.table_url(PERSONAL_TABLE))
            .query(&owner_filters(owner_id, id));

        if self.mutate(request, PERSONAL_TABLE).await?.is_empty() {
            return Err(anyhow!("No wardrobe item {id} found for this owner"));
        }
        Ok(())
    }

    async fn set_favorite(&self, owner_id: &str, id: i64, favorited: bool) -> Result<()> {
        let request = self
            .http
            .patch(self.table_url(PERSONAL_TABLE))
            .query(&owner_filters(owner_id, id))
            .json(&json!({ "favorited": favorited }));

        if self.mutate(request, PERSONAL_TABLE).await?.is_empty() {
            return Err(anyhow!("No wardrobe item {id} found for this owner"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = RestCatalogStore::new("https://abc.supabase.co/".into(), "anon".into());
        assert_eq!(
            store.table_url(SHARED_TABLE),
            "https://abc.supabase.co/rest/v1/general-wardrobe"
        );
    }

    #[test]
    fn mutations_are_scoped_to_owner() {
        let filters = owner_filters("u-7", 12);
        assert_eq!(filters[0], ("id", "eq.12".to_string()));
        assert_eq!(filters[1], ("user_id", "eq.u-7".to_string()));
    }
}
