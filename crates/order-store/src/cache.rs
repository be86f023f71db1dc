//! TTL read-through cache for catalog listings.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::ItemId;
use tokio::sync::RwLock;

use crate::catalog::{CatalogStore, Item};
use crate::Result;

struct Slot<T> {
    value: T,
    loaded_at: Instant,
}

/// A read-through cache holding one value with a fixed TTL.
///
/// An explicit object with `{value, loaded_at, ttl}` and an `invalidate()`
/// hook the owner calls on every write; never a module-level global.
pub struct TtlCache<T> {
    slot: RwLock<Option<Slot<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    /// Creates an empty cache with the given TTL.
    pub fn new(ttl: Duration) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
        }
    }

    /// Returns the cached value if present and younger than the TTL.
    pub async fn get(&self) -> Option<T> {
        let slot = self.slot.read().await;
        match slot.as_ref() {
            Some(slot) if slot.loaded_at.elapsed() < self.ttl => Some(slot.value.clone()),
            _ => None,
        }
    }

    /// Stores a freshly loaded value.
    pub async fn put(&self, value: T) {
        *self.slot.write().await = Some(Slot {
            value,
            loaded_at: Instant::now(),
        });
    }

    /// Drops the cached value.
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}

/// A `CatalogStore` wrapper that caches the full listing with a TTL and
/// invalidates it on every mutation.
///
/// Reads (`list`, `search`, `get`) are served from the cached listing when
/// it is fresh; mutations go straight to the inner store.
#[derive(Clone)]
pub struct CachedCatalog<C> {
    inner: C,
    listing: Arc<TtlCache<Vec<Item>>>,
}

impl<C: CatalogStore> CachedCatalog<C> {
    /// Wraps a catalog store with the given cache TTL.
    pub fn new(inner: C, ttl: Duration) -> Self {
        Self {
            inner,
            listing: Arc::new(TtlCache::new(ttl)),
        }
    }

    async fn listing(&self) -> Result<Vec<Item>> {
        if let Some(items) = self.listing.get().await {
            metrics::counter!("catalog_cache_hits_total").increment(1);
            return Ok(items);
        }
        metrics::counter!("catalog_cache_misses_total").increment(1);
        let items = self.inner.list().await?;
        tracing::debug!(items = items.len(), "catalog listing reloaded");
        self.listing.put(items.clone()).await;
        Ok(items)
    }
}

#[async_trait]
impl<C: CatalogStore> CatalogStore for CachedCatalog<C> {
    async fn add(&self, name: &str) -> Result<Item> {
        let item = self.inner.add(name).await?;
        self.listing.invalidate().await;
        Ok(item)
    }

    async fn add_bulk(&self, names: &[String]) -> Result<Vec<Item>> {
        let created = self.inner.add_bulk(names).await?;
        self.listing.invalidate().await;
        Ok(created)
    }

    async fn rename(&self, id: ItemId, name: &str) -> Result<bool> {
        let renamed = self.inner.rename(id, name).await?;
        self.listing.invalidate().await;
        Ok(renamed)
    }

    async fn remove(&self, id: ItemId) -> Result<bool> {
        let removed = self.inner.remove(id).await?;
        self.listing.invalidate().await;
        Ok(removed)
    }

    async fn get(&self, id: ItemId) -> Result<Option<Item>> {
        Ok(self
            .listing()
            .await?
            .into_iter()
            .find(|item| item.id == id))
    }

    async fn search(&self, query: &str) -> Result<Vec<Item>> {
        let needle = query.to_lowercase();
        Ok(self
            .listing()
            .await?
            .into_iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .collect())
    }

    async fn list(&self) -> Result<Vec<Item>> {
        self.listing().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    #[tokio::test]
    async fn cache_get_put_invalidate() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_secs(60));
        assert_eq!(cache.get().await, None);

        cache.put(7).await;
        assert_eq!(cache.get().await, Some(7));

        cache.invalidate().await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn cache_expires_after_ttl() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::ZERO);
        cache.put(7).await;
        assert_eq!(cache.get().await, None);
    }

    #[tokio::test]
    async fn cached_listing_survives_direct_inner_writes() {
        let inner = InMemoryCatalog::new();
        inner.add("Water").await.unwrap();

        let cached = CachedCatalog::new(inner.clone(), Duration::from_secs(60));
        assert_eq!(cached.list().await.unwrap().len(), 1);

        // A write bypassing the wrapper is not seen until the TTL expires.
        inner.add("Towels").await.unwrap();
        assert_eq!(cached.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn mutations_through_wrapper_invalidate() {
        let inner = InMemoryCatalog::new();
        let cached = CachedCatalog::new(inner, Duration::from_secs(60));

        cached.add("Water").await.unwrap();
        assert_eq!(cached.list().await.unwrap().len(), 1);

        let item = cached.add("Towels").await.unwrap();
        assert_eq!(cached.list().await.unwrap().len(), 2);

        cached.remove(item.id).await.unwrap();
        assert_eq!(cached.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn search_and_get_use_cached_listing() {
        let cached = CachedCatalog::new(InMemoryCatalog::new(), Duration::from_secs(60));
        let item = cached.add("Sparkling Water").await.unwrap();
        cached.add("Towels").await.unwrap();

        let found = cached.search("water").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, item.id);

        assert_eq!(cached.get(item.id).await.unwrap().unwrap().name, "Sparkling Water");
    }
}
