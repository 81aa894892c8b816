use std::fmt::Debug;

use crate::{
    db_types::{Product, Vendor},
    traits::{CatalogApiError, CatalogManagement},
};

/// Query API for the product catalog and vendor directory.
pub struct CatalogApi<B> {
    db: B,
}

impl<B> Debug for CatalogApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CatalogApi")
    }
}

impl<B> CatalogApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> CatalogApi<B>
where B: CatalogManagement
{
    pub async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError> {
        self.db.fetch_product(product_id).await
    }

    pub async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError> {
        self.db.fetch_vendor(vendor_id).await
    }

    /// Resolves the vendor that should receive a UPI payment for the given order's line items.
    /// Returns `None` when the order spans multiple vendors; the caller falls back to the
    /// platform's own UPI account in that case.
    pub fn sole_vendor_id<'a>(&self, vendor_ids: &[&'a str]) -> Option<&'a str> {
        match vendor_ids {
            [only] => Some(only),
            _ => None,
        }
    }
}
