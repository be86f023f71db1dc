//! The order lifecycle engine.

use chrono::Utc;
use common::{OrderId, OrderStatus};
use order_store::{Order, OrderStore, StatusTransition};

use crate::error::OrderError;
use crate::notify::{NotificationGateway, OrderNotification};
use crate::submission::{OrderSubmission, RequestedLine, sanitize_lines};

/// Drives orders through `pending → confirmed | deleted`.
///
/// The engine owns validation and the error taxonomy; the atomicity of the
/// transition itself lives in the store's conditional update, so two
/// concurrent admin actions on the same order can never both apply.
pub struct LifecycleEngine<S, G> {
    store: S,
    gateway: G,
}

impl<S: OrderStore, G: NotificationGateway> LifecycleEngine<S, G> {
    /// Creates a new engine over the given store and notification gateway.
    pub fn new(store: S, gateway: G) -> Self {
        Self { store, gateway }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a pending order from a guest submission.
    ///
    /// Fires a best-effort `NewOrder` notification after the store write;
    /// a failed notification is logged and the order stands. No
    /// notification fires later at confirm time - announcing at submission
    /// is the deployment policy.
    #[tracing::instrument(skip(self, submission), fields(room = %submission.room_number))]
    pub async fn submit(&self, submission: OrderSubmission) -> Result<OrderId, OrderError> {
        let (name, phone, room) = submission.validated_contact()?;
        let lines = submission.valid_lines();
        if lines.is_empty() {
            return Err(OrderError::NoItems);
        }

        let order = Order::new(name, phone, room, lines);
        let id = order.id;
        self.store.insert(order.clone()).await?;
        metrics::counter!("orders_submitted_total").increment(1);
        tracing::info!(order_id = %id, items = order.items.len(), "order submitted");

        if !self.gateway.notify(&OrderNotification::new_order(&order)).await {
            metrics::counter!("order_notifications_failed_total").increment(1);
            tracing::warn!(order_id = %id, "new-order notification failed; order kept");
        }

        Ok(id)
    }

    /// Confirms a pending order, stamping `confirmed_at` and the comment.
    #[tracing::instrument(skip(self, comment))]
    pub async fn confirm(&self, id: OrderId, comment: Option<String>) -> Result<(), OrderError> {
        let transition = StatusTransition::confirm(Utc::now(), comment);
        if self.store.apply_transition(id, transition).await? {
            metrics::counter!("orders_confirmed_total").increment(1);
            tracing::info!(order_id = %id, "order confirmed");
            Ok(())
        } else {
            Err(self.zero_rows_error(id).await?)
        }
    }

    /// Rejects a pending order, stamping `deleted_at` and the comment.
    #[tracing::instrument(skip(self, comment))]
    pub async fn reject(&self, id: OrderId, comment: Option<String>) -> Result<(), OrderError> {
        let transition = StatusTransition::reject(Utc::now(), comment);
        if self.store.apply_transition(id, transition).await? {
            metrics::counter!("orders_rejected_total").increment(1);
            tracing::info!(order_id = %id, "order rejected");
            Ok(())
        } else {
            Err(self.zero_rows_error(id).await?)
        }
    }

    /// Replaces the whole line collection of a confirmed order.
    ///
    /// Entries with quantity < 1 are dropped silently, mirroring
    /// submission; identity and customer fields stay untouched.
    #[tracing::instrument(skip(self, lines))]
    pub async fn edit_confirmed_items(
        &self,
        id: OrderId,
        lines: Vec<RequestedLine>,
    ) -> Result<(), OrderError> {
        let lines = sanitize_lines(&lines);
        if self.store.replace_items(id, lines).await? {
            metrics::counter!("order_items_replaced_total").increment(1);
            tracing::info!(order_id = %id, "confirmed order items replaced");
            Ok(())
        } else {
            match self.store.get(id).await? {
                None => Err(OrderError::NotFound(id)),
                Some(order) => Err(OrderError::ItemsNotEditable {
                    id,
                    status: order.status,
                }),
            }
        }
    }

    /// Permanently removes all rejected orders. Returns the count removed.
    #[tracing::instrument(skip(self))]
    pub async fn purge_deleted(&self) -> Result<u64, OrderError> {
        let removed = self.store.purge(OrderStatus::Deleted).await?;
        metrics::counter!("orders_purged_total").increment(removed);
        tracing::info!(removed, "deleted orders purged");
        Ok(removed)
    }

    /// Distinguishes a missing order from an already-processed one after a
    /// conditional update touched zero rows.
    async fn zero_rows_error(&self, id: OrderId) -> Result<OrderError, OrderError> {
        match self.store.get(id).await? {
            None => Ok(OrderError::NotFound(id)),
            Some(order) => Ok(OrderError::AlreadyProcessed {
                id,
                status: order.status,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationKind, RecordingGateway};
    use order_store::{InMemoryOrderStore, OrderLine};

    fn engine() -> LifecycleEngine<InMemoryOrderStore, RecordingGateway> {
        LifecycleEngine::new(InMemoryOrderStore::new(), RecordingGateway::new())
    }

    fn submission() -> OrderSubmission {
        OrderSubmission::new(
            "Nino",
            "555-0101",
            "12",
            vec![
                RequestedLine::new("Water", 3),
                RequestedLine::new("Towels", 0),
                RequestedLine::new("Soap", 1),
            ],
        )
    }

    #[tokio::test]
    async fn submit_creates_pending_order_with_positive_lines_only() {
        let engine = engine();
        let id = engine.submit(submission()).await.unwrap();

        let order = engine.store().get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(
            order.items,
            vec![OrderLine::new("Water", 3), OrderLine::new("Soap", 1)]
        );
        assert!(order.confirmed_at.is_none());
        assert!(order.deleted_at.is_none());
    }

    #[tokio::test]
    async fn submit_fires_new_order_notification() {
        let store = InMemoryOrderStore::new();
        let gateway = RecordingGateway::new();
        let engine = LifecycleEngine::new(store, gateway.clone());

        engine.submit(submission()).await.unwrap();

        let sent = gateway.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].kind, NotificationKind::NewOrder);
        assert_eq!(sent[0].customer_name, "Nino");
        assert_eq!(sent[0].lines.len(), 2);
    }

    #[tokio::test]
    async fn submit_survives_notification_failure() {
        let store = InMemoryOrderStore::new();
        let gateway = RecordingGateway::new();
        gateway.set_failing(true);
        let engine = LifecycleEngine::new(store, gateway);

        let id = engine.submit(submission()).await.unwrap();
        assert!(engine.store().get(id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn submit_rejects_empty_contact_fields() {
        let engine = engine();
        let bad = OrderSubmission::new("", "555-0101", " ", vec![RequestedLine::new("Water", 1)]);

        let err = engine.submit(bad).await.unwrap_err();
        assert!(matches!(err, OrderError::MissingFields { .. }));
    }

    #[tokio::test]
    async fn submit_rejects_all_zero_quantities() {
        let engine = engine();
        let bad = OrderSubmission::new(
            "Nino",
            "555-0101",
            "12",
            vec![
                RequestedLine::new("Water", 0),
                RequestedLine::new("Soap", -1),
            ],
        );

        let err = engine.submit(bad).await.unwrap_err();
        assert!(matches!(err, OrderError::NoItems));
    }

    #[tokio::test]
    async fn confirm_sets_status_and_comment() {
        let engine = engine();
        let id = engine.submit(submission()).await.unwrap();

        engine.confirm(id, Some("by reception".into())).await.unwrap();

        let order = engine.store().get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
        assert!(order.confirmed_at.is_some());
        assert!(order.deleted_at.is_none());
        assert_eq!(order.admin_comment.as_deref(), Some("by reception"));
    }

    #[tokio::test]
    async fn confirm_does_not_fire_notification() {
        let store = InMemoryOrderStore::new();
        let gateway = RecordingGateway::new();
        let engine = LifecycleEngine::new(store, gateway.clone());

        let id = engine.submit(submission()).await.unwrap();
        engine.confirm(id, None).await.unwrap();

        // Only the submission-time notification exists.
        assert_eq!(gateway.sent().await.len(), 1);
    }

    #[tokio::test]
    async fn double_confirm_is_a_conflict_and_state_stands() {
        let engine = engine();
        let id = engine.submit(submission()).await.unwrap();
        engine.confirm(id, None).await.unwrap();

        let err = engine.confirm(id, None).await.unwrap_err();
        assert!(matches!(
            err,
            OrderError::AlreadyProcessed {
                status: OrderStatus::Confirmed,
                ..
            }
        ));

        let order = engine.store().get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn reject_after_confirm_and_vice_versa_are_conflicts() {
        let engine = engine();

        let confirmed = engine.submit(submission()).await.unwrap();
        engine.confirm(confirmed, None).await.unwrap();
        let err = engine.reject(confirmed, None).await.unwrap_err();
        assert!(err.is_conflict());

        let rejected = engine.submit(submission()).await.unwrap();
        engine.reject(rejected, None).await.unwrap();
        let err = engine.confirm(rejected, None).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn confirm_missing_order_is_not_found() {
        let engine = engine();
        let err = engine.confirm(OrderId::new(), None).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn reject_sets_deleted_at() {
        let engine = engine();
        let id = engine.submit(submission()).await.unwrap();

        engine.reject(id, Some("out of stock".into())).await.unwrap();

        let order = engine.store().get(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Deleted);
        assert!(order.deleted_at.is_some());
        assert!(order.confirmed_at.is_none());
    }

    #[tokio::test]
    async fn edit_items_replaces_collection_on_confirmed_order() {
        let engine = engine();
        let id = engine.submit(submission()).await.unwrap();
        engine.confirm(id, None).await.unwrap();

        engine
            .edit_confirmed_items(
                id,
                vec![
                    RequestedLine::new("Tea", 4),
                    RequestedLine::new("Water", 0),
                ],
            )
            .await
            .unwrap();

        let order = engine.store().get(id).await.unwrap().unwrap();
        assert_eq!(order.items, vec![OrderLine::new("Tea", 4)]);
        // Identity and customer fields untouched.
        assert_eq!(order.customer_name, "Nino");
        assert_eq!(order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn edit_items_on_pending_or_deleted_order_is_a_conflict() {
        let engine = engine();

        let pending = engine.submit(submission()).await.unwrap();
        let err = engine
            .edit_confirmed_items(pending, vec![RequestedLine::new("Tea", 1)])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            OrderError::ItemsNotEditable {
                status: OrderStatus::Pending,
                ..
            }
        ));

        let deleted = engine.submit(submission()).await.unwrap();
        engine.reject(deleted, None).await.unwrap();
        let err = engine
            .edit_confirmed_items(deleted, vec![RequestedLine::new("Tea", 1)])
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        // Items unchanged on both.
        let order = engine.store().get(pending).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 2);
        let order = engine.store().get(deleted).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 2);
    }

    #[tokio::test]
    async fn edit_items_on_missing_order_is_not_found() {
        let engine = engine();
        let err = engine
            .edit_confirmed_items(OrderId::new(), vec![RequestedLine::new("Tea", 1)])
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));
    }

    #[tokio::test]
    async fn purge_removes_exactly_the_deleted_orders() {
        let engine = engine();

        let keep = engine.submit(submission()).await.unwrap();
        engine.confirm(keep, None).await.unwrap();

        for _ in 0..2 {
            let id = engine.submit(submission()).await.unwrap();
            engine.reject(id, None).await.unwrap();
        }

        let removed = engine.purge_deleted().await.unwrap();
        assert_eq!(removed, 2);
        assert!(engine.store().get(keep).await.unwrap().is_some());

        // Purge with nothing to do returns zero.
        assert_eq!(engine.purge_deleted().await.unwrap(), 0);
    }
}
