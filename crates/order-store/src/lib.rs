//! Persistence layer for the room-service ordering system.
//!
//! This crate provides:
//! - `Order` and `OrderLine` records with the `StatusTransition` check-and-set
//! - `OrderStore` and `CatalogStore` traits for pluggable persistence
//! - `InMemoryOrderStore` / `InMemoryCatalog` for tests and local runs
//! - `PostgresOrderStore` / `PostgresCatalog` backed by sqlx
//! - A TTL read-through cache for catalog listings

pub mod cache;
pub mod catalog;
pub mod error;
pub mod memory;
pub mod order;
pub mod postgres;
pub mod query;
pub mod store;

pub use cache::{CachedCatalog, TtlCache};
pub use catalog::{CatalogStore, InMemoryCatalog, Item};
pub use common::{ItemId, OrderId, OrderStatus};
pub use error::{Result, StoreError};
pub use memory::InMemoryOrderStore;
pub use order::{Order, OrderLine, StatusTransition};
pub use postgres::{PostgresCatalog, PostgresOrderStore};
pub use query::{OrderQuery, SortColumn};
pub use store::OrderStore;
