//! Shared types for the room-service ordering system.

pub mod status;
pub mod types;

pub use status::OrderStatus;
pub use types::{ItemId, OrderId};
