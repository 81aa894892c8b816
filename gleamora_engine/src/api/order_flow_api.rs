use std::fmt::Debug;

use log::*;

use crate::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentOutcome},
    order_objects::{OrderListResult, OrderQueryFilter, Pagination},
    traits::{MarketplaceDatabase, OrderEngineError},
};

/// `OrderFlowApi` is the primary API for placing orders and driving them through the fulfillment
/// lifecycle in response to storefront and payment processor events.
pub struct OrderFlowApi<B> {
    db: B,
}

impl<B> Debug for OrderFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderFlowApi")
    }
}

impl<B> OrderFlowApi<B> {
    pub fn new(db: B) -> Self {
        Self { db }
    }
}

impl<B> OrderFlowApi<B>
where B: MarketplaceDatabase
{
    /// Submit a new order.
    ///
    /// The cart is validated, priced from the catalog, and reserved against the stock ledger in a
    /// single atomic transaction. On success the stored order is returned, with its server-side
    /// total and snapshotted line prices. On any failure nothing is reserved and nothing is
    /// stored.
    pub async fn place_order(&self, order: NewOrder) -> Result<Order, OrderEngineError> {
        let order = self.db.place_order(order).await?;
        debug!("🔄️📦️ Order {} placed. Total: {}", order.order_id, order.total_amount);
        Ok(order)
    }

    /// Move an order to the given lifecycle status. Authorization is the caller's concern; by the
    /// time this is invoked the actor has already been established as entitled to drive this
    /// order.
    pub async fn update_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderEngineError> {
        trace!("🔄️📦️ Setting order {order_id} to {status}");
        let order = self.db.update_order_status(order_id, status).await?;
        debug!("🔄️📦️ Order {} is now {}", order.order_id, order.status);
        Ok(order)
    }

    /// Record the asserted outcome of a payment attempt against an order. The outcome is trusted
    /// verbatim; the payment reference is stored for audit on success and failure alike. The
    /// lifecycle status is never touched here.
    pub async fn record_payment_outcome(
        &self,
        order_id: &OrderId,
        outcome: PaymentOutcome,
        payment_ref: &str,
    ) -> Result<Order, OrderEngineError> {
        trace!("🔄️💰️ Recording payment {payment_ref} for order {order_id}: {outcome:?}");
        let order = self.db.update_payment_outcome(order_id, outcome, payment_ref).await?;
        debug!("🔄️💰️ Order {} payment status is now {}", order.order_id, order.payment_status);
        Ok(order)
    }

    /// Fetches the order with the given public id, or `None` if it does not exist.
    pub async fn fetch_order(&self, order_id: &OrderId) -> Result<Option<Order>, OrderEngineError> {
        self.db.fetch_order_by_order_id(order_id).await
    }

    /// Searches orders matching the filter, newest first, one page at a time.
    pub async fn search_orders(
        &self,
        query: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<OrderListResult, OrderEngineError> {
        trace!("🔄️📦️ Searching orders: {query}");
        self.db.search_orders(query, pagination).await
    }

    pub fn db(&self) -> &B {
        &self.db
    }
}
