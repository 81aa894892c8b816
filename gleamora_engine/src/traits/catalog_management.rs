use thiserror::Error;

use crate::db_types::{Product, Vendor};

#[derive(Debug, Clone, Error)]
pub enum CatalogApiError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("The product {0} does not exist")]
    ProductNotFound(String),
    #[error("The vendor {0} does not exist")]
    VendorNotFound(String),
}

impl From<sqlx::Error> for CatalogApiError {
    fn from(e: sqlx::Error) -> Self {
        CatalogApiError::DatabaseError(e.to_string())
    }
}

/// Product and vendor lookups. Order placement reads the catalog through
/// [`MarketplaceDatabase`](crate::traits::MarketplaceDatabase) inside its own transaction; this
/// trait serves the query surfaces, such as resolving a vendor's UPI details for a payment
/// intent.
#[allow(async_fn_in_trait)]
pub trait CatalogManagement {
    /// Fetches a product by id. Returns `None` if no such product exists.
    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError>;

    /// Fetches a vendor by id. Returns `None` if no such vendor exists.
    async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError>;
}
