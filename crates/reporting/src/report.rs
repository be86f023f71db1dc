use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use serde::Serialize;
use tracing::instrument;

use order_store::{Order, OrderQuery, OrderStatus, OrderStore, SortColumn};

use crate::error::Result;
use crate::window::ReportWindow;

/// Total quantity of one item across the report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemTotal {
    pub item_name: String,
    pub total_quantity: u64,
}

/// Flat demand summary over a window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Number of confirmed orders that fell inside the window.
    pub total_orders: u64,
    /// Per-item totals, highest demand first.
    pub items: Vec<ItemTotal>,
}

/// One item's total within a single weekly bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeeklyItemTotal {
    pub week_ending: NaiveDate,
    pub item_name: String,
    pub total_quantity: u64,
}

/// Date of the weekly bucket `date` falls into, where buckets end on
/// `week_ending`. A date already on the ending weekday maps to itself.
pub fn week_ending_on(date: NaiveDate, week_ending: Weekday) -> NaiveDate {
    let ahead = (week_ending.num_days_from_monday() + 7 - date.weekday().num_days_from_monday()) % 7;
    date + Days::new(u64::from(ahead))
}

/// Aggregates confirmed-order demand per item.
///
/// Only orders with a `confirmed` status and a confirmation timestamp
/// inside the window participate. Item names are compared exactly, so
/// `"Water"` and `"water"` accumulate separately.
pub struct ReportEngine<S> {
    store: S,
    week_ending: Weekday,
}

impl<S: OrderStore> ReportEngine<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            week_ending: Weekday::Sun,
        }
    }

    /// Override the weekday grouped buckets end on.
    pub fn with_week_ending(mut self, week_ending: Weekday) -> Self {
        self.week_ending = week_ending;
        self
    }

    /// Confirmed orders in the window, oldest confirmation first.
    async fn confirmed_in(&self, window: &ReportWindow) -> Result<Vec<Order>> {
        let query = OrderQuery::new()
            .status(OrderStatus::Confirmed)
            .confirmed_between(window.start, window.end)
            .sort_by(SortColumn::ConfirmedAt);
        let mut orders = self.store.list(query).await?;
        orders.reverse();
        Ok(orders)
    }

    /// Flat per-item totals over the window, defaulting to the trailing
    /// seven days. Sorted by total descending; items with equal totals
    /// keep the order they were first encountered in.
    #[instrument(skip(self))]
    pub async fn weekly_report(&self, window: Option<ReportWindow>) -> Result<OrderSummary> {
        let window = window.unwrap_or_else(|| ReportWindow::trailing_week(Utc::now()));
        let orders = self.confirmed_in(&window).await?;
        let total_orders = orders.len() as u64;

        let mut totals: Vec<ItemTotal> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for order in &orders {
            for line in &order.items {
                match index.get(&line.item_name) {
                    Some(&i) => totals[i].total_quantity += u64::from(line.quantity),
                    None => {
                        index.insert(line.item_name.clone(), totals.len());
                        totals.push(ItemTotal {
                            item_name: line.item_name.clone(),
                            total_quantity: u64::from(line.quantity),
                        });
                    }
                }
            }
        }
        // Stable sort keeps first-seen order among equal totals.
        totals.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

        metrics::counter!("reports_generated_total").increment(1);
        Ok(OrderSummary {
            total_orders,
            items: totals,
        })
    }

    /// Per-item totals bucketed by the week the confirmation falls into.
    /// Rows come back ordered by week ascending, then item name ascending.
    #[instrument(skip(self))]
    pub async fn grouped_weekly_report(
        &self,
        window: Option<ReportWindow>,
    ) -> Result<Vec<WeeklyItemTotal>> {
        let window = window.unwrap_or_else(|| ReportWindow::trailing_week(Utc::now()));
        let orders = self.confirmed_in(&window).await?;

        let mut buckets: BTreeMap<(NaiveDate, String), u64> = BTreeMap::new();
        for order in &orders {
            let Some(confirmed_at) = order.confirmed_at else {
                continue;
            };
            let week = week_ending_on(confirmed_at.date_naive(), self.week_ending);
            for line in &order.items {
                *buckets.entry((week, line.item_name.clone())).or_insert(0) +=
                    u64::from(line.quantity);
            }
        }

        metrics::counter!("reports_generated_total").increment(1);
        Ok(buckets
            .into_iter()
            .map(|((week_ending, item_name), total_quantity)| WeeklyItemTotal {
                week_ending,
                item_name,
                total_quantity,
            })
            .collect())
    }
}
