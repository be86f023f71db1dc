//! Order lifecycle engine for the room-service system.
//!
//! This crate provides:
//! - `OrderSubmission` validation for guest checkouts
//! - `LifecycleEngine`, the one place order status transitions happen
//! - `NotificationGateway` trait with logging and recording implementations
//! - The `OrderError` taxonomy surfaced to the transport layer

pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod submission;

pub use error::OrderError;
pub use lifecycle::LifecycleEngine;
pub use notify::{
    LoggingGateway, NotificationGateway, NotificationKind, OrderNotification, RecordingGateway,
    format_notification,
};
pub use submission::{OrderSubmission, RequestedLine};
