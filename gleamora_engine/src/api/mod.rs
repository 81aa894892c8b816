//! The public APIs of the order engine.
//!
//! These are thin, generic wrappers over the [`traits`](crate::traits) backend contracts. The
//! server layer holds these rather than a concrete database, so endpoint tests can run against
//! mocks.
mod catalog_api;
mod order_flow_api;

pub use catalog_api::CatalogApi;
pub use order_flow_api::OrderFlowApi;
