//! Catalog item records and stores.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::ItemId;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::Result;

/// A catalog item offered to guests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub name: String,
}

impl Item {
    /// Creates a new item with a fresh ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ItemId::new(),
            name: name.into(),
        }
    }
}

/// Trait for catalog persistence.
///
/// Names are unique case-insensitively; search is a case-insensitive
/// substring match. Listings are sorted by name, case-insensitively.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Adds an item. Fails with `DuplicateItem` if another item has the
    /// same name ignoring case, or `EmptyItemName` if the trimmed name is
    /// empty.
    async fn add(&self, name: &str) -> Result<Item>;

    /// Adds many items at once, skipping blank lines and names that
    /// already exist. Returns the items actually created.
    async fn add_bulk(&self, names: &[String]) -> Result<Vec<Item>>;

    /// Renames an item, keeping its ID. Returns `false` if the item is
    /// missing; fails with `DuplicateItem` if the new name collides.
    async fn rename(&self, id: ItemId, name: &str) -> Result<bool>;

    /// Removes an item. Returns `false` if it did not exist.
    async fn remove(&self, id: ItemId) -> Result<bool>;

    /// Loads an item by ID.
    async fn get(&self, id: ItemId) -> Result<Option<Item>>;

    /// Finds items whose name contains the query, ignoring case.
    async fn search(&self, query: &str) -> Result<Vec<Item>>;

    /// Lists all items.
    async fn list(&self) -> Result<Vec<Item>>;
}

/// In-memory catalog for tests and single-process runs.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    items: Arc<RwLock<HashMap<ItemId, Item>>>,
}

impl InMemoryCatalog {
    /// Creates a new empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    fn normalized(name: &str) -> Result<String> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(StoreError::EmptyItemName);
        }
        Ok(trimmed.to_string())
    }

    fn sorted(mut items: Vec<Item>) -> Vec<Item> {
        items.sort_by_key(|item| item.name.to_lowercase());
        items
    }
}

#[async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn add(&self, name: &str) -> Result<Item> {
        let name = Self::normalized(name)?;
        let mut items = self.items.write().await;
        if items
            .values()
            .any(|item| item.name.eq_ignore_ascii_case(&name))
        {
            return Err(StoreError::DuplicateItem { name });
        }
        let item = Item::new(name);
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn add_bulk(&self, names: &[String]) -> Result<Vec<Item>> {
        let mut created = Vec::new();
        for name in names {
            match self.add(name).await {
                Ok(item) => created.push(item),
                Err(StoreError::DuplicateItem { .. } | StoreError::EmptyItemName) => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }

    async fn rename(&self, id: ItemId, name: &str) -> Result<bool> {
        let name = Self::normalized(name)?;
        let mut items = self.items.write().await;
        if items
            .values()
            .any(|item| item.id != id && item.name.eq_ignore_ascii_case(&name))
        {
            return Err(StoreError::DuplicateItem { name });
        }
        match items.get_mut(&id) {
            Some(item) => {
                item.name = name;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: ItemId) -> Result<bool> {
        Ok(self.items.write().await.remove(&id).is_some())
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self.items.read().await.get(&id).cloned())
    }

    async fn search(&self, query: &str) -> Result<Vec<Item>> {
        let needle = query.to_lowercase();
        let items = self.items.read().await;
        let matching: Vec<Item> = items
            .values()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Self::sorted(matching))
    }

    async fn list(&self) -> Result<Vec<Item>> {
        let items = self.items.read().await;
        Ok(Self::sorted(items.values().cloned().collect()))
    }
}
