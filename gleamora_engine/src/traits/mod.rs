//! # Database backend contracts.
//!
//! This module defines the interface contracts that storage backends must satisfy to drive the
//! order engine.
//!
//! * [`MarketplaceDatabase`] is the write side: atomic order placement against the stock ledger,
//!   status transitions, and payment outcome recording.
//! * [`OrderManagement`] is the read side: single-order fetches and filtered, paginated searches.
//! * [`CatalogManagement`] covers product and vendor lookups, including the stock ledger reads
//!   order placement validates against.
//!
//! The engine ships one implementation, [`SqliteDatabase`](crate::SqliteDatabase), but the
//! API layer is generic over these traits so tests can substitute mocks.
mod catalog_management;
mod marketplace_database;
mod order_management;

pub use catalog_management::{CatalogApiError, CatalogManagement};
pub use marketplace_database::{MarketplaceDatabase, OrderEngineError};
pub use order_management::OrderManagement;
