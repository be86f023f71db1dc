//! Query types for listing orders.

use chrono::{DateTime, Utc};
use common::OrderStatus;

use crate::order::Order;

/// Timestamp column used to sort listings (always descending, newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortColumn {
    #[default]
    CreatedAt,
    ConfirmedAt,
    DeletedAt,
}

impl SortColumn {
    /// Returns the column name in the `orders` table.
    pub fn column_name(&self) -> &'static str {
        match self {
            SortColumn::CreatedAt => "created_at",
            SortColumn::ConfirmedAt => "confirmed_at",
            SortColumn::DeletedAt => "deleted_at",
        }
    }

    fn key(&self, order: &Order) -> Option<DateTime<Utc>> {
        match self {
            SortColumn::CreatedAt => Some(order.created_at),
            SortColumn::ConfirmedAt => order.confirmed_at,
            SortColumn::DeletedAt => order.deleted_at,
        }
    }
}

/// A filtered, paginated listing of orders.
///
/// All filters are optional and combined with AND. Timestamp ranges are
/// inclusive on both ends.
#[derive(Debug, Clone, Default)]
pub struct OrderQuery {
    pub status: Option<OrderStatus>,
    pub confirmed_from: Option<DateTime<Utc>>,
    pub confirmed_to: Option<DateTime<Utc>>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
    pub sort: SortColumn,
}

impl OrderQuery {
    /// Creates a new query with no filters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by order status.
    pub fn status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Filters on `confirmed_at` within `[from, to]` inclusive.
    pub fn confirmed_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.confirmed_from = Some(from);
        self.confirmed_to = Some(to);
        self
    }

    /// Filters on `created_at` within `[from, to]` inclusive.
    pub fn created_between(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.created_from = Some(from);
        self.created_to = Some(to);
        self
    }

    /// Limits the number of returned orders.
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` orders.
    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Sorts by the given timestamp column, descending.
    pub fn sort_by(mut self, column: SortColumn) -> Self {
        self.sort = column;
        self
    }

    /// Returns true if the order passes every filter (pagination excluded).
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(status) = self.status
            && order.status != status
        {
            return false;
        }
        if let Some(from) = self.confirmed_from
            && order.confirmed_at.is_none_or(|at| at < from)
        {
            return false;
        }
        if let Some(to) = self.confirmed_to
            && order.confirmed_at.is_none_or(|at| at > to)
        {
            return false;
        }
        if let Some(from) = self.created_from
            && order.created_at < from
        {
            return false;
        }
        if let Some(to) = self.created_to
            && order.created_at > to
        {
            return false;
        }
        true
    }

    /// Sorts, then paginates a filtered result set in place of SQL.
    ///
    /// Orders without a value in the sort column go last, matching
    /// `ORDER BY … DESC NULLS LAST`.
    pub fn sort_and_page(&self, mut orders: Vec<Order>) -> Vec<Order> {
        let column = self.sort;
        orders.sort_by(|a, b| column.key(b).cmp(&column.key(a)));

        let offset = self.offset.unwrap_or(0);
        let orders = orders.into_iter().skip(offset);
        match self.limit {
            Some(limit) => orders.take(limit).collect(),
            None => orders.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{OrderLine, StatusTransition};
    use chrono::TimeZone;

    fn order_confirmed_at(ts: DateTime<Utc>) -> Order {
        let mut order = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);
        order.apply(&StatusTransition::confirm(ts, None));
        order
    }

    fn ts(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_status_filter() {
        let pending = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);
        let confirmed = order_confirmed_at(ts(2, 9));

        let query = OrderQuery::new().status(OrderStatus::Confirmed);
        assert!(!query.matches(&pending));
        assert!(query.matches(&confirmed));
    }

    #[test]
    fn test_confirmed_range_is_inclusive() {
        let order = order_confirmed_at(ts(5, 0));

        let query = OrderQuery::new().confirmed_between(ts(5, 0), ts(5, 0));
        assert!(query.matches(&order));

        let query = OrderQuery::new().confirmed_between(ts(6, 0), ts(7, 0));
        assert!(!query.matches(&order));
    }

    #[test]
    fn test_unconfirmed_order_never_matches_confirmed_range() {
        let pending = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);
        let query = OrderQuery::new().confirmed_between(ts(1, 0), ts(28, 0));
        assert!(!query.matches(&pending));
    }

    #[test]
    fn test_sort_descending_with_pagination() {
        let a = order_confirmed_at(ts(1, 0));
        let b = order_confirmed_at(ts(3, 0));
        let c = order_confirmed_at(ts(2, 0));

        let query = OrderQuery::new()
            .sort_by(SortColumn::ConfirmedAt)
            .limit(2)
            .offset(1);
        let page = query.sort_and_page(vec![a.clone(), b.clone(), c.clone()]);

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, c.id);
        assert_eq!(page[1].id, a.id);
    }

    #[test]
    fn test_sort_puts_missing_timestamps_last() {
        let confirmed = order_confirmed_at(ts(1, 0));
        let pending = Order::new("Nino", "555-0101", "12", vec![OrderLine::new("Water", 1)]);

        let query = OrderQuery::new().sort_by(SortColumn::ConfirmedAt);
        let sorted = query.sort_and_page(vec![pending.clone(), confirmed.clone()]);

        assert_eq!(sorted[0].id, confirmed.id);
        assert_eq!(sorted[1].id, pending.id);
    }
}
