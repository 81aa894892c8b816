use crate::{
    db_types::{Order, OrderId},
    order_objects::{OrderListResult, OrderQueryFilter, Pagination},
    traits::OrderEngineError,
};

/// Read-side queries over orders. The [`MarketplaceDatabase`](crate::traits::MarketplaceDatabase)
/// trait handles the machinery of placing orders and moving them through the lifecycle;
/// `OrderManagement` provides methods for querying the results.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Fetches the order with the given public order id, including its line items. Returns `None`
    /// if no such order exists.
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderEngineError>;

    /// Searches orders matching the filter, newest first, returning one page along with the total
    /// match count.
    async fn search_orders(
        &self,
        query: OrderQueryFilter,
        pagination: Pagination,
    ) -> Result<OrderListResult, OrderEngineError>;
}
