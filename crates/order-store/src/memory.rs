use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{OrderId, OrderStatus};
use tokio::sync::RwLock;

use crate::order::{Order, OrderLine, StatusTransition};
use crate::query::OrderQuery;
use crate::store::OrderStore;
use crate::Result;

/// In-memory order store for tests and single-process runs.
///
/// Provides the same interface and conditional-update semantics as the
/// PostgreSQL implementation; every mutation runs under the write guard,
/// so a transition check-and-set is atomic.
#[derive(Clone, Default)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<OrderId, Order>>>,
}

impl InMemoryOrderStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Clears all orders.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.orders.write().await.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let matching: Vec<Order> = orders
            .values()
            .filter(|order| query.matches(order))
            .cloned()
            .collect();
        Ok(query.sort_and_page(matching))
    }

    async fn apply_transition(&self, id: OrderId, transition: StatusTransition) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Pending => {
                order.apply(&transition);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn replace_items(&self, id: OrderId, lines: Vec<OrderLine>) -> Result<bool> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&id) {
            Some(order) if order.status == OrderStatus::Confirmed => {
                order.items = lines;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn purge(&self, status: OrderStatus) -> Result<u64> {
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|_, order| order.status != status);
        Ok((before - orders.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn pending_order() -> Order {
        Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 2)])
    }

    #[tokio::test]
    async fn insert_and_get() {
        let store = InMemoryOrderStore::new();
        let order = pending_order();
        let id = order.id;

        store.insert(order.clone()).await.unwrap();

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded, order);
        assert_eq!(store.order_count().await, 1);
    }

    #[tokio::test]
    async fn get_missing_returns_none() {
        let store = InMemoryOrderStore::new();
        assert!(store.get(OrderId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_pending_order_succeeds_once() {
        let store = InMemoryOrderStore::new();
        let order = pending_order();
        let id = order.id;
        store.insert(order).await.unwrap();

        let first = store
            .apply_transition(id, StatusTransition::confirm(Utc::now(), Some("ok".into())))
            .await
            .unwrap();
        assert!(first);

        // Second attempt sees zero rows, regardless of direction.
        let second = store
            .apply_transition(id, StatusTransition::reject(Utc::now(), None))
            .await
            .unwrap();
        assert!(!second);

        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Confirmed);
        assert!(loaded.confirmed_at.is_some());
        assert!(loaded.deleted_at.is_none());
    }

    #[tokio::test]
    async fn transition_missing_order_affects_zero_rows() {
        let store = InMemoryOrderStore::new();
        let applied = store
            .apply_transition(OrderId::new(), StatusTransition::confirm(Utc::now(), None))
            .await
            .unwrap();
        assert!(!applied);
    }

    #[tokio::test]
    async fn concurrent_transitions_only_one_wins() {
        let store = InMemoryOrderStore::new();
        let order = pending_order();
        let id = order.id;
        store.insert(order).await.unwrap();

        let confirm = store.apply_transition(id, StatusTransition::confirm(Utc::now(), None));
        let reject = store.apply_transition(id, StatusTransition::reject(Utc::now(), None));
        let (confirmed, rejected) = tokio::join!(confirm, reject);

        let outcomes = [confirmed.unwrap(), rejected.unwrap()];
        assert_eq!(outcomes.iter().filter(|applied| **applied).count(), 1);

        let loaded = store.get(id).await.unwrap().unwrap();
        assert!(loaded.status.is_terminal());
    }

    #[tokio::test]
    async fn replace_items_only_on_confirmed() {
        let store = InMemoryOrderStore::new();
        let order = pending_order();
        let id = order.id;
        store.insert(order).await.unwrap();

        let replaced = store
            .replace_items(id, vec![OrderLine::new("Towels", 1)])
            .await
            .unwrap();
        assert!(!replaced);
        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.items, vec![OrderLine::new("Water", 2)]);

        store
            .apply_transition(id, StatusTransition::confirm(Utc::now(), None))
            .await
            .unwrap();

        let replaced = store
            .replace_items(id, vec![OrderLine::new("Towels", 1)])
            .await
            .unwrap();
        assert!(replaced);
        let loaded = store.get(id).await.unwrap().unwrap();
        assert_eq!(loaded.items, vec![OrderLine::new("Towels", 1)]);
    }

    #[tokio::test]
    async fn purge_removes_all_and_only_deleted() {
        let store = InMemoryOrderStore::new();

        let kept = pending_order();
        let kept_id = kept.id;
        store.insert(kept).await.unwrap();

        for _ in 0..3 {
            let order = pending_order();
            let id = order.id;
            store.insert(order).await.unwrap();
            store
                .apply_transition(id, StatusTransition::reject(Utc::now(), None))
                .await
                .unwrap();
        }

        let removed = store.purge(OrderStatus::Deleted).await.unwrap();
        assert_eq!(removed, 3);
        assert_eq!(store.order_count().await, 1);
        assert!(store.get(kept_id).await.unwrap().is_some());

        let deleted = store
            .list(OrderQuery::new().status(OrderStatus::Deleted))
            .await
            .unwrap();
        assert!(deleted.is_empty());
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let store = InMemoryOrderStore::new();

        let pending = pending_order();
        store.insert(pending).await.unwrap();

        let confirmed = pending_order();
        let confirmed_id = confirmed.id;
        store.insert(confirmed).await.unwrap();
        store
            .apply_transition(confirmed_id, StatusTransition::confirm(Utc::now(), None))
            .await
            .unwrap();

        let listed = store
            .list(OrderQuery::new().status(OrderStatus::Confirmed))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, confirmed_id);
    }
}
