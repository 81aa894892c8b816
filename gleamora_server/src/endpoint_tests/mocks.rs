use gleamora_engine::{
    db_types::{NewOrder, Order, OrderId, OrderStatus, PaymentOutcome, Product, Vendor},
    order_objects::{OrderListResult, OrderQueryFilter, Pagination},
    traits::{CatalogApiError, CatalogManagement, MarketplaceDatabase, OrderEngineError, OrderManagement},
};
use mockall::mock;

mock! {
    pub MarketplaceDb {}

    impl Clone for MarketplaceDb {
        fn clone(&self) -> Self;
    }

    impl OrderManagement for MarketplaceDb {
        async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, OrderEngineError>;
        async fn search_orders(&self, query: OrderQueryFilter, pagination: Pagination) -> Result<OrderListResult, OrderEngineError>;
    }

    impl MarketplaceDatabase for MarketplaceDb {
        fn url(&self) -> &str;
        async fn place_order(&self, order: NewOrder) -> Result<Order, OrderEngineError>;
        async fn update_order_status(&self, order_id: &OrderId, status: OrderStatus) -> Result<Order, OrderEngineError>;
        async fn update_payment_outcome(&self, order_id: &OrderId, outcome: PaymentOutcome, payment_ref: &str) -> Result<Order, OrderEngineError>;
        async fn close(&mut self) -> Result<(), OrderEngineError>;
    }

    impl CatalogManagement for MarketplaceDb {
        async fn fetch_product(&self, product_id: &str) -> Result<Option<Product>, CatalogApiError>;
        async fn fetch_vendor(&self, vendor_id: &str) -> Result<Option<Vendor>, CatalogApiError>;
    }
}
