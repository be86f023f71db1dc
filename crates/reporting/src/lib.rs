//! Demand reporting over the order history.
//!
//! The [`ReportEngine`] scans confirmed orders inside a [`ReportWindow`]
//! and produces per-item quantity totals, either as a single summary or
//! grouped into weekly buckets.

pub mod error;
pub mod report;
pub mod window;

pub use error::ReportError;
pub use report::{ItemTotal, OrderSummary, ReportEngine, WeeklyItemTotal, week_ending_on};
pub use window::ReportWindow;
