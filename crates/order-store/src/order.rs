//! Order and line-item records.

use chrono::{DateTime, Utc};
use common::{OrderId, OrderStatus};
use serde::{Deserialize, Serialize};

/// A single line of an order: an item name plus requested quantity.
///
/// Lines are name+quantity snapshots captured at submission time and are
/// deliberately decoupled from the live catalog: renaming or deleting a
/// catalog item never mutates historical orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_name: String,
    pub quantity: u32,
}

impl OrderLine {
    /// Creates a new order line.
    pub fn new(item_name: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_name: item_name.into(),
            quantity,
        }
    }
}

/// A guest's order record with its full lifecycle metadata.
///
/// `confirmed_at` is set iff the order transitioned to `Confirmed`,
/// `deleted_at` iff it transitioned to `Deleted`; at most one of the two
/// is ever set, and only once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub customer_name: String,
    pub customer_phone: String,
    pub room_number: String,
    pub status: OrderStatus,
    pub admin_comment: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub items: Vec<OrderLine>,
}

impl Order {
    /// Creates a new pending order with the current timestamp.
    ///
    /// The caller is responsible for validation; the store persists the
    /// record as-is.
    pub fn new(
        customer_name: impl Into<String>,
        customer_phone: impl Into<String>,
        room_number: impl Into<String>,
        items: Vec<OrderLine>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            created_at: Utc::now(),
            customer_name: customer_name.into(),
            customer_phone: customer_phone.into(),
            room_number: room_number.into(),
            status: OrderStatus::Pending,
            admin_comment: None,
            confirmed_at: None,
            deleted_at: None,
            items,
        }
    }

    /// Returns the sum of all line quantities.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Applies a transition to the in-memory record.
    ///
    /// Does not check the current status; the store's conditional update is
    /// the guard against double-processing.
    pub(crate) fn apply(&mut self, transition: &StatusTransition) {
        self.status = transition.to;
        self.admin_comment = transition.comment.clone();
        match transition.to {
            OrderStatus::Confirmed => self.confirmed_at = Some(transition.at),
            OrderStatus::Deleted => self.deleted_at = Some(transition.at),
            OrderStatus::Pending => {}
        }
    }
}

/// A one-way status transition out of `Pending`.
///
/// Stores must apply this as a single conditional update (check status,
/// write status) so that two concurrent transitions on the same order can
/// never both win.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusTransition {
    pub to: OrderStatus,
    pub at: DateTime<Utc>,
    pub comment: Option<String>,
}

impl StatusTransition {
    /// Transition to `Confirmed`, stamping `confirmed_at`.
    pub fn confirm(at: DateTime<Utc>, comment: Option<String>) -> Self {
        Self {
            to: OrderStatus::Confirmed,
            at,
            comment,
        }
    }

    /// Transition to `Deleted`, stamping `deleted_at`.
    pub fn reject(at: DateTime<Utc>, comment: Option<String>) -> Self {
        Self {
            to: OrderStatus::Deleted,
            at,
            comment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_is_pending() {
        let order = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 2)]);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.confirmed_at.is_none());
        assert!(order.deleted_at.is_none());
        assert!(order.admin_comment.is_none());
        assert_eq!(order.items.len(), 1);
    }

    #[test]
    fn test_total_quantity() {
        let order = Order::new(
            "Nino",
            "555-0101",
            "12",
            vec![OrderLine::new("Water", 2), OrderLine::new("Towels", 3)],
        );
        assert_eq!(order.total_quantity(), 5);
    }

    #[test]
    fn test_confirm_transition_sets_confirmed_at_only() {
        let mut order = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);
        let at = Utc::now();
        order.apply(&StatusTransition::confirm(at, Some("ok".into())));

        assert_eq!(order.status, OrderStatus::Confirmed);
        assert_eq!(order.confirmed_at, Some(at));
        assert!(order.deleted_at.is_none());
        assert_eq!(order.admin_comment.as_deref(), Some("ok"));
    }

    #[test]
    fn test_reject_transition_sets_deleted_at_only() {
        let mut order = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);
        let at = Utc::now();
        order.apply(&StatusTransition::reject(at, None));

        assert_eq!(order.status, OrderStatus::Deleted);
        assert_eq!(order.deleted_at, Some(at));
        assert!(order.confirmed_at.is_none());
    }

    #[test]
    fn test_order_serialization_roundtrip() {
        let order = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 2)]);
        let json = serde_json::to_string(&order).unwrap();
        let back: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, back);
    }
}
