use thiserror::Error;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentOutcome},
    traits::OrderManagement,
};

/// The write side of the order engine. Implementations own the stock ledger and must provide the
/// atomicity guarantees documented on each method.
#[allow(async_fn_in_trait)]
pub trait MarketplaceDatabase: Clone + OrderManagement {
    /// The URL of the database
    fn url(&self) -> &str;

    /// Takes a cart and, in a single atomic transaction:
    /// * validates that the cart is non-empty and the shipping address complete,
    /// * snapshots the current catalog price of every line item,
    /// * decrements stock for each item with a conditional update that only succeeds when enough
    ///   stock remains,
    /// * computes the total as the exact sum of line totals,
    /// * inserts the order and its line items with status `pending`.
    ///
    /// If any item has insufficient stock, or any product is unknown, the entire transaction
    /// rolls back. No partial reservations survive a failed placement.
    async fn place_order(&self, order: NewOrder) -> Result<Order, OrderEngineError>;

    /// Sets the lifecycle status of an order. Any member of the status set is accepted as a
    /// target; callers are responsible for deciding whether the actor may drive this order.
    ///
    /// Returns the updated order. Fails with [`OrderEngineError::OrderNotFound`] if `order_id`
    /// does not exist.
    async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderEngineError>;

    /// Records the outcome of a payment attempt against an order.
    ///
    /// * `Success` sets `payment_status` to `completed` and stores the gateway reference.
    /// * `Failure` sets `payment_status` to `failed`; the reference is stored for audit.
    ///
    /// The lifecycle status is left untouched in both cases. Fulfilment progress is driven
    /// separately through [`update_order_status`].
    async fn update_payment_outcome(
        &self,
        order_id: &OrderId,
        outcome: PaymentOutcome,
        payment_ref: &str,
    ) -> Result<Order, OrderEngineError>;

    /// Closes the database connection.
    async fn close(&mut self) -> Result<(), OrderEngineError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Error)]
pub enum OrderEngineError {
    #[error("Internal database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
    #[error("Cannot place an order with an empty cart")]
    EmptyCart,
    #[error("Shipping address is missing required fields: {0}")]
    IncompleteShippingAddress(String),
    #[error("Item quantity must be at least 1, got {0}")]
    InvalidQuantity(i64),
    #[error("The product {0} does not exist")]
    ProductNotFound(String),
    #[error("Insufficient stock for product {product}: {available} available")]
    InsufficientStock { product: String, available: i64 },
    #[error("The requested order {0} does not exist")]
    OrderNotFound(OrderId),
    #[error("{0} is not a recognised value")]
    UnrecognisedValue(String),
}

impl From<sqlx::Error> for OrderEngineError {
    fn from(e: sqlx::Error) -> Self {
        OrderEngineError::DatabaseError(e.to_string())
    }
}
