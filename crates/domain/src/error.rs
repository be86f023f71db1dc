//! Lifecycle error taxonomy.

use common::{OrderId, OrderStatus};
use order_store::StoreError;
use thiserror::Error;

/// Errors that can occur during order lifecycle operations.
///
/// `MissingFields` and `NoItems` are user-correctable; `NotFound` maps to a
/// 404-equivalent; `AlreadyProcessed` and `ItemsNotEditable` are conflicts
/// (the order already left the required state); `Store` is a persistence
/// failure surfaced as a generic error after rollback.
#[derive(Debug, Error)]
pub enum OrderError {
    /// One or more required contact fields were empty after trimming.
    #[error("missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<&'static str> },

    /// No requested line survived the positive-quantity filter.
    #[error("order has no items with a positive quantity")]
    NoItems,

    /// The order does not exist.
    #[error("order not found: {0}")]
    NotFound(OrderId),

    /// The order already left `pending`, e.g. a concurrent admin action won.
    #[error("order {id} was already processed (status: {status})")]
    AlreadyProcessed { id: OrderId, status: OrderStatus },

    /// Item lists can only be replaced on confirmed orders.
    #[error("cannot edit items of order {id} in status {status}")]
    ItemsNotEditable { id: OrderId, status: OrderStatus },

    /// The storage layer failed.
    #[error("storage failure: {0}")]
    Store(#[from] StoreError),
}

impl OrderError {
    /// Returns true for the conflict class of errors (state already
    /// transitioned, concurrent double-action).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            OrderError::AlreadyProcessed { .. } | OrderError::ItemsNotEditable { .. }
        )
    }
}
