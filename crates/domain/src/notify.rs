//! Best-effort order notifications.
//!
//! The gateway is always best-effort: a `false` return (or a slow remote)
//! must never fail or roll back the lifecycle operation that triggered it.
//! The engine invokes it only after the store write has committed.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use order_store::{Order, OrderLine};
use tokio::sync::RwLock;

/// What happened to the order being announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    NewOrder,
    ConfirmedOrder,
}

impl NotificationKind {
    /// Returns a short label for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::NewOrder => "new_order",
            NotificationKind::ConfirmedOrder => "confirmed_order",
        }
    }
}

/// The payload handed to the gateway: a snapshot of the order's contact
/// block and lines at the moment of the transition.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderNotification {
    pub kind: NotificationKind,
    pub customer_name: String,
    pub customer_phone: String,
    pub room_number: String,
    pub lines: Vec<OrderLine>,
}

impl OrderNotification {
    /// Builds a `NewOrder` notification from a freshly submitted order.
    pub fn new_order(order: &Order) -> Self {
        Self::from_order(NotificationKind::NewOrder, order)
    }

    /// Builds a `ConfirmedOrder` notification.
    ///
    /// Present for completeness: the current deployment policy notifies at
    /// submission time only, so the engine never emits this kind.
    pub fn confirmed_order(order: &Order) -> Self {
        Self::from_order(NotificationKind::ConfirmedOrder, order)
    }

    fn from_order(kind: NotificationKind, order: &Order) -> Self {
        Self {
            kind,
            customer_name: order.customer_name.clone(),
            customer_phone: order.customer_phone.clone(),
            room_number: order.room_number.clone(),
            lines: order.items.clone(),
        }
    }
}

/// Renders the plain-text message body for a notification.
pub fn format_notification(notification: &OrderNotification) -> String {
    let headline = match notification.kind {
        NotificationKind::NewOrder => "New order received",
        NotificationKind::ConfirmedOrder => "Order confirmed",
    };

    let mut body = format!(
        "{headline}\n\nCustomer: {}\nRoom: {}\nPhone: {}\n\nItems:\n",
        notification.customer_name, notification.room_number, notification.customer_phone,
    );
    for line in &notification.lines {
        body.push_str(&format!("  {} x {}\n", line.quantity, line.item_name));
    }
    body
}

/// Outbound notification channel.
///
/// Returns `true` on success. Implementations must not panic on delivery
/// failure; the caller logs and moves on.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn notify(&self, notification: &OrderNotification) -> bool;
}

/// Gateway that writes the formatted message to the log and always
/// succeeds. The default sink when no real transport is wired up.
#[derive(Clone, Default)]
pub struct LoggingGateway;

impl LoggingGateway {
    /// Creates a new logging gateway.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationGateway for LoggingGateway {
    async fn notify(&self, notification: &OrderNotification) -> bool {
        tracing::info!(
            kind = notification.kind.as_str(),
            room = %notification.room_number,
            "order notification:\n{}",
            format_notification(notification)
        );
        true
    }
}

/// Gateway that records every notification in memory.
///
/// Used as a test double and demo sink; can be flipped into failure mode
/// to exercise the best-effort path.
#[derive(Clone, Default)]
pub struct RecordingGateway {
    sent: Arc<RwLock<Vec<OrderNotification>>>,
    failing: Arc<AtomicBool>,
}

impl RecordingGateway {
    /// Creates a new recording gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `notify` call report failure.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Returns all notifications received so far.
    pub async fn sent(&self) -> Vec<OrderNotification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn notify(&self, notification: &OrderNotification) -> bool {
        if self.failing.load(Ordering::SeqCst) {
            return false;
        }
        self.sent.write().await.push(notification.clone());
        true
    }
}
