//! Local Item Repository
//!
//! The whole list lives as one JSON array under a single key. Every
//! operation reads the array, changes it, and writes it back in full.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;

use super::traits::{ItemRepository, KeyValueStore};
use crate::domain::{DomainError, DomainResult, ItemId, Session, ShoppingItem};

/// Storage key used when none is configured
pub const DEFAULT_ITEMS_KEY: &str = "shoppingItems";

/// Device-local implementation of `ItemRepository`.
///
/// The list is per device: the session is accepted for the shared contract
/// but does not partition the stored array.
pub struct LocalItemRepository {
    kv: Arc<dyn KeyValueStore>,
    key: String,
}

impl LocalItemRepository {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(kv, DEFAULT_ITEMS_KEY)
    }

    pub fn with_key(kv: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { kv, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    async fn read_all(&self) -> DomainResult<Vec<ShoppingItem>> {
        let Some(raw) = self.kv.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }

        let items: Vec<ShoppingItem> = serde_json::from_str(&raw)?;

        // Keep the first record for any repeated id
        let mut seen = HashSet::new();
        let before = items.len();
        let items: Vec<ShoppingItem> = items
            .into_iter()
            .filter(|item| seen.insert(item.id.clone()))
            .collect();
        if items.len() != before {
            log::warn!(
                "Dropped {} duplicate item(s) from '{}'",
                before - items.len(),
                self.key
            );
        }
        Ok(items)
    }

    /// Current array for a read-modify-write. A corrupt array cannot be
    /// repaired, so it is replaced by the write that follows.
    async fn read_for_write(&self) -> DomainResult<Vec<ShoppingItem>> {
        match self.read_all().await {
            Err(DomainError::Serialization(e)) => {
                log::warn!("Overwriting unreadable list under '{}': {}", self.key, e);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    async fn write_all(&self, items: &[ShoppingItem]) -> DomainResult<()> {
        let raw = serde_json::to_string(items)?;
        self.kv.set(&self.key, &raw).await
    }
}

#[async_trait]
impl ItemRepository for LocalItemRepository {
    async fn list(&self, _session: &Session) -> DomainResult<Vec<ShoppingItem>> {
        self.read_all().await
    }

    async fn create(&self, _session: &Session, item: &ShoppingItem) -> DomainResult<()> {
        let mut items = self.read_for_write().await?;
        if items.iter().any(|existing| existing.id == item.id) {
            return Err(DomainError::Conflict(format!("Item {} already exists", item.id)));
        }
        items.insert(0, item.clone());
        self.write_all(&items).await
    }

    async fn update(&self, _session: &Session, item: &ShoppingItem) -> DomainResult<()> {
        let mut items = self.read_for_write().await?;
        let Some(slot) = items.iter_mut().find(|existing| existing.id == item.id) else {
            return Err(DomainError::NotFound(format!("Item {} not found", item.id)));
        };
        *slot = item.clone();
        self.write_all(&items).await
    }

    async fn delete(&self, _session: &Session, id: &ItemId) -> DomainResult<()> {
        let mut items = self.read_for_write().await?;
        items.retain(|item| &item.id != id);
        self.write_all(&items).await
    }

    async fn delete_many(&self, _session: &Session, ids: &[ItemId]) -> DomainResult<()> {
        let doomed: HashSet<&ItemId> = ids.iter().collect();
        let mut items = self.read_for_write().await?;
        items.retain(|item| !doomed.contains(&item.id));
        self.write_all(&items).await
    }

    async fn delete_all(&self, _session: &Session) -> DomainResult<()> {
        self.write_all(&[]).await
    }
}
