use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{Product, Vendor},
    traits::OrderEngineError,
};

pub async fn fetch_product(product_id: &str, conn: &mut SqliteConnection) -> Result<Option<Product>, sqlx::Error> {
    let product =
        sqlx::query_as("SELECT * FROM products WHERE id = $1").bind(product_id).fetch_optional(conn).await?;
    Ok(product)
}

pub async fn fetch_vendor(vendor_id: &str, conn: &mut SqliteConnection) -> Result<Option<Vendor>, sqlx::Error> {
    let vendor = sqlx::query_as("SELECT * FROM vendors WHERE id = $1").bind(vendor_id).fetch_optional(conn).await?;
    Ok(vendor)
}

/// Reserves `quantity` units of the product by decrementing the stock ledger. The decrement is
/// conditional on enough stock remaining, so concurrent reservations for the same product can
/// never drive the count negative. Callers run this inside the order placement transaction; a
/// failed reservation rolls back everything reserved so far.
pub async fn reserve_stock(
    product_id: &str,
    quantity: i64,
    conn: &mut SqliteConnection,
) -> Result<(), OrderEngineError> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock - $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1 AND stock >= $2",
    )
    .bind(product_id)
    .bind(quantity)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        // Either the product is missing, or there is not enough stock. Re-read to tell them apart.
        return match fetch_product(product_id, conn).await? {
            Some(product) => {
                Err(OrderEngineError::InsufficientStock { product: product_id.to_string(), available: product.stock })
            },
            None => Err(OrderEngineError::ProductNotFound(product_id.to_string())),
        };
    }
    debug!("📝️ Reserved {quantity} units of product {product_id}");
    Ok(())
}
