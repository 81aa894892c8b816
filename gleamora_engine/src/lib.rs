//! Gleamora Order Engine
//!
//! The order fulfillment and inventory consistency engine for the Gleamora Jewels marketplace.
//! It turns customer carts into priced, stock-reserving orders, drives those orders through a
//! fixed fulfillment lifecycle, and reconciles payment outcomes, while keeping the stock ledger
//! consistent under concurrent checkouts. This library is HTTP-agnostic; the server crate owns
//! the web boundary.
//!
//! The library is divided into two main sections:
//! 1. Database management and control ([`mod@sqlite`] and the [`mod@traits`] contracts). SQLite
//!    is the supported backend. You should never need to access the database directly. Instead,
//!    use the public API provided by the engine. The exception is the data types used in the
//!    database, which are defined in the `db_types` module and are public.
//! 2. The engine public API ([`OrderFlowApi`] and [`CatalogApi`]). These provide the
//!    public-facing functionality: placing orders, lifecycle transitions, payment
//!    reconciliation, and catalog queries. Backends need to implement the traits in the
//!    [`mod@traits`] module to drive these APIs.
//!
//! Authorization is a first-class part of the engine: the pure resolver in [`mod@authorization`]
//! computes per-order rights for any actor, and is evaluated by the server on every request.
mod api;

pub mod authorization;
pub mod db_types;
pub mod order_objects;
pub mod traits;

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{CatalogApi, OrderFlowApi};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDatabase;
pub use traits::{CatalogApiError, CatalogManagement, MarketplaceDatabase, OrderEngineError, OrderManagement};
