use async_trait::async_trait;
use common::{OrderId, OrderStatus};

use crate::order::{Order, OrderLine, StatusTransition};
use crate::query::OrderQuery;
use crate::Result;

/// Core trait for order persistence.
///
/// All implementations must be thread-safe (Send + Sync). Mutating
/// operations are conditional on the current status and report via their
/// return value whether any row was touched; the caller turns a zero-row
/// outcome into its own conflict/not-found error.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists a new order together with its lines.
    async fn insert(&self, order: Order) -> Result<()>;

    /// Loads an order (with its lines) by ID.
    async fn get(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists orders matching the query, sorted by the query's timestamp
    /// column descending, then paginated.
    async fn list(&self, query: OrderQuery) -> Result<Vec<Order>>;

    /// Applies a status transition as a single conditional update,
    /// equivalent to `UPDATE orders SET … WHERE id = $1 AND status =
    /// 'pending'`.
    ///
    /// Returns `true` if exactly one row was updated; `false` means the
    /// order is missing or no longer pending. Implementations must never
    /// read-then-write, so two concurrent transitions cannot both win.
    async fn apply_transition(&self, id: OrderId, transition: StatusTransition) -> Result<bool>;

    /// Atomically replaces the full line collection of a confirmed order
    /// (delete-all then insert-all).
    ///
    /// Returns `true` if the order exists and is confirmed; `false`
    /// otherwise, leaving the lines untouched.
    async fn replace_items(&self, id: OrderId, lines: Vec<OrderLine>) -> Result<bool>;

    /// Permanently removes all orders with the given status, including
    /// their lines. Returns the number of orders removed.
    async fn purge(&self, status: OrderStatus) -> Result<u64>;
}
