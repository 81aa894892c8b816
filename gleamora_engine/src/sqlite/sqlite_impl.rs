//! `SqliteDatabase` is a concrete implementation of a Gleamora order engine backend.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`traits`](crate::traits)
//! module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, new_pool, orders, products};
use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderStatus, PaymentOutcome, PaymentStatus, Product, Vendor},
    order_objects::{OrderListResult, OrderQueryFilter, Pagination},
    traits::{CatalogApiError, CatalogManagement, MarketplaceDatabase, OrderEngineError, OrderManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl MarketplaceDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn place_order(&self, order: NewOrder) -> Result<Order, OrderEngineError> {
        if order.items.is_empty() {
            return Err(OrderEngineError::EmptyCart);
        }
        if let Some(item) = order.items.iter().find(|i| i.quantity < 1) {
            return Err(OrderEngineError::InvalidQuantity(item.quantity));
        }
        let missing = order.shipping_address.missing_fields();
        if !missing.is_empty() {
            return Err(OrderEngineError::IncompleteShippingAddress(missing.join(", ")));
        }
        let mut tx = self.pool.begin().await?;
        let mut line_items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            // Reserve before reading the price. The first statement in the transaction is then a
            // write, so a racing placement simply waits for the lock instead of deadlocking on a
            // read-to-write upgrade.
            products::reserve_stock(&item.product_id, item.quantity, &mut tx).await?;
            let product = products::fetch_product(&item.product_id, &mut tx)
                .await?
                .ok_or_else(|| OrderEngineError::ProductNotFound(item.product_id.clone()))?;
            let vendor_name = products::fetch_vendor(&product.vendor_id, &mut tx)
                .await?
                .map(|v| v.name)
                .unwrap_or_default();
            line_items.push(LineItem {
                product_id: item.product_id.clone(),
                title: product.title,
                image: product.images.first().cloned(),
                quantity: item.quantity,
                unit_price: product.price,
                vendor_id: product.vendor_id,
                vendor_name,
            });
        }
        let total = line_items.iter().map(LineItem::line_total).sum();
        let order = orders::insert_order(&order, line_items, total, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Order {} placed for customer {} at {total}", order.order_id, order.customer_id);
        Ok(order)
    }

    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderEngineError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(order_id, status, &mut conn).await?;
        debug!("🗃️ Order {order_id} moved to status {status}");
        Ok(order)
    }

    async fn update_payment_outcome(
        &self,
        order_id: &OrderId,
        outcome: PaymentOutcome,
        payment_ref: &str,
    ) -> Result<Order, OrderEngineError> {
        let payment_status = match outcome {
            PaymentOutcome::Success => PaymentStatus::Completed,
            PaymentOutcome::Failure => PaymentStatus::Failed,
        };
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_payment_outcome(order_id, payment_status, payment_ref, &mut conn).await?;
        debug!("🗃️ Payment for order {order_id} recorded as {payment_status} (ref {payment_ref})");
        Ok(order)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderEngineError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order_by_order_id(order_id, &mut conn).await?;
        Ok(order)
    }

    async fn search_orders(
        &self,
        query: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<OrderListResult, OrderEngineError> {
        let mut conn = self.pool.acquire().await?;
        let (orders, total) = orders::search_orders(&query, pagination, &mut conn).await?;
        Ok(OrderListResult::new(orders, total, pagination))
    }
}

impl CatalogManagement for SqliteDatabase {
    async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let product = products::fetch_product(product_id, &mut conn).await?;
        Ok(product)
    }

    async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError> {
        let mut conn = self.pool.acquire().await?;
        let vendor = products::fetch_vendor(vendor_id, &mut conn).await?;
        Ok(vendor)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the DB URL from the `GJM_DATABASE_URL` envar.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
