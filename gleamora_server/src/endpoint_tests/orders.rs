use actix_web::{
    body::MessageBody,
    http::StatusCode,
    test,
    test::TestRequest,
    web,
    web::ServiceConfig,
    App,
    HttpResponse,
};
use gleamora_engine::{
    db_types::{CartItem, OrderStatus, Role},
    order_objects::{OrderListResult, Pagination},
    traits::OrderEngineError,
    OrderFlowApi,
};
use log::debug;
use serde_json::Value;

use super::helpers::{get_request, issue_token, post_request, put_request, sample_address, sample_order, TEST_JWT_SECRET};
use crate::{
    data_objects::{CreateOrderRequest, UpdateStatusRequest},
    endpoint_tests::mocks::MockMarketplaceDb,
    errors::ServerError,
    middleware::JwtAuthMiddlewareFactory,
    routes::{CreateOrderRoute, MyOrdersRoute, OrderByIdRoute, UpdateOrderStatusRoute},
};

fn sample_cart() -> CreateOrderRequest {
    CreateOrderRequest {
        products: vec![
            CartItem { product_id: "prod-ring".to_string(), quantity: 2 },
            CartItem { product_id: "prod-chain".to_string(), quantity: 1 },
        ],
        shipping_address: sample_address(),
        payment_method: Default::default(),
        order_notes: Some("Gift wrap please".to_string()),
    }
}

//------------------------------------    Order creation    ----------------------------------------------------

#[actix_web::test]
async fn create_order_without_a_token_is_unauthorized() {
    let _ = env_logger::try_init().ok();
    let err = post_request("", "/orders", &sample_cart(), configure_create).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. No access token was provided.");
}

#[actix_web::test]
async fn customers_can_create_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let (status, body) = post_request(&token, "/orders", &sample_cart(), configure_create).await.expect("Request failed");
    assert_eq!(status, StatusCode::CREATED);
    let order: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(order["orderId"], "a1b2c3d4e5f60718");
    assert_eq!(order["customerId"], "cust-100");
    assert_eq!(order["totalAmount"], 5_897_50);
    assert_eq!(order["status"], "pending");
    assert_eq!(order["products"][0]["price"], 2_499_00);
    assert_eq!(order["products"][0]["vendorName"], "Ruby & Co");
}

#[actix_web::test]
async fn vendors_cannot_create_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("vend-ruby", Role::Vendor, false);
    let err = post_request(&token, "/orders", &sample_cart(), configure_create).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn suspended_accounts_are_rejected_before_anything_else() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, true);
    let err = post_request(&token, "/orders", &sample_cart(), configure_create).await.expect_err("Expected error");
    assert_eq!(err, "Authentication Error. This account has been suspended.");
}

#[actix_web::test]
async fn tampered_tokens_are_rejected() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token("cust-100", Role::Customer, false);
    token.replace_range(token.len() - 10..token.len() - 5, "00000");
    debug!("Calling /orders with invalid token {token}");
    let err = post_request(&token, "/orders", &sample_cart(), configure_create).await.expect_err("Expected error");
    assert!(err.starts_with("Authentication Error. Access token is invalid."), "Unexpected error: {err}");
}

#[actix_web::test]
async fn out_of_stock_carts_are_rejected() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let err = post_request(&token, "/orders", &sample_cart(), configure_create_out_of_stock)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient stock for product prod-ring: 1 available");
}

fn configure_create(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_place_order().withf(|order| order.customer_id == "cust-100" && order.items.len() == 2).returning(|_| {
        let mut order = sample_order();
        order.order_notes = Some("Gift wrap please".to_string());
        Ok(order)
    });
    let orders_api = OrderFlowApi::new(db);
    cfg.service(CreateOrderRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

fn configure_create_out_of_stock(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_place_order()
        .returning(|_| Err(OrderEngineError::InsufficientStock { product: "prod-ring".to_string(), available: 1 }));
    let orders_api = OrderFlowApi::new(db);
    cfg.service(CreateOrderRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

//------------------------------------    Order listing    ----------------------------------------------------

#[actix_web::test]
async fn customers_only_ever_see_their_own_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let (status, body) = get_request(&token, "/orders?page=1&limit=20", configure_customer_listing)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let result: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(result["pagination"]["total"], 1);
    assert_eq!(result["orders"][0]["orderId"], "a1b2c3d4e5f60718");
}

#[actix_web::test]
async fn vendor_listings_are_scoped_to_their_line_items() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("vend-ruby", Role::Vendor, false);
    let (status, _) = get_request(&token, "/orders", configure_vendor_listing).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
}

fn configure_customer_listing(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    // The scope filter must come from the token, regardless of what the query string says.
    db.expect_search_orders()
        .withf(|query, _| query.customer_id.as_deref() == Some("cust-100") && query.vendor_id.is_none())
        .returning(|_, _| Ok(OrderListResult::new(vec![sample_order()], 1, Pagination::new(1, 20))));
    let orders_api = OrderFlowApi::new(db);
    cfg.service(MyOrdersRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

fn configure_vendor_listing(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_search_orders()
        .withf(|query, _| query.vendor_id.as_deref() == Some("vend-ruby") && query.customer_id.is_none())
        .returning(|_, _| Ok(OrderListResult::new(vec![sample_order()], 1, Pagination::default())));
    let orders_api = OrderFlowApi::new(db);
    cfg.service(MyOrdersRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

//------------------------------------    Single order    ----------------------------------------------------

#[actix_web::test]
async fn owners_and_admins_can_view_an_order() {
    let _ = env_logger::try_init().ok();
    for (sub, role) in [("cust-100", Role::Customer), ("admin-1", Role::Admin), ("vend-opal", Role::Vendor)] {
        let token = issue_token(sub, role, false);
        let (status, body) =
            get_request(&token, "/orders/a1b2c3d4e5f60718", configure_single_order).await.expect("Request failed");
        assert_eq!(status, StatusCode::OK, "{sub} should be able to view the order");
        let order: Value = serde_json::from_str(&body).expect("Invalid JSON body");
        assert_eq!(order["orderId"], "a1b2c3d4e5f60718");
    }
}

#[actix_web::test]
async fn strangers_get_403_not_404_for_existing_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-999", Role::Customer, false);
    let err = get_request(&token, "/orders/a1b2c3d4e5f60718", configure_single_order).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. You may not view order #a1b2c3d4e5f60718");
    // A vendor with no line item on the order is a stranger too.
    let token = issue_token("vend-nobody", Role::Vendor, false);
    let err = get_request(&token, "/orders/a1b2c3d4e5f60718", configure_single_order).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. You may not view order #a1b2c3d4e5f60718");
}

#[actix_web::test]
async fn missing_orders_are_404_for_everyone() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("admin-1", Role::Admin, false);
    let err = get_request(&token, "/orders/feedfacecafebeef", configure_single_order).await.expect_err("Expected error");
    assert_eq!(err, "The data was not found. Order #feedfacecafebeef does not exist");
}

fn configure_single_order(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id()
        .returning(|id| if id.as_str() == "a1b2c3d4e5f60718" { Ok(Some(sample_order())) } else { Ok(None) });
    let orders_api = OrderFlowApi::new(db);
    cfg.service(OrderByIdRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

//------------------------------------    Status updates    ----------------------------------------------------

#[actix_web::test]
async fn customers_never_pass_the_status_update_role_gate() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let body = UpdateStatusRequest { status: OrderStatus::Shipped };
    let err = put_request(&token, "/orders/a1b2c3d4e5f60718/status", &body, configure_status_update)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient permissions");
}

#[actix_web::test]
async fn vendors_can_drive_orders_that_carry_their_items() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("vend-ruby", Role::Vendor, false);
    let body = UpdateStatusRequest { status: OrderStatus::Shipped };
    let (status, body) = put_request(&token, "/orders/a1b2c3d4e5f60718/status", &body, configure_status_update)
        .await
        .expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(order["status"], "shipped");
}

#[actix_web::test]
async fn vendors_cannot_drive_other_vendors_orders() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("vend-nobody", Role::Vendor, false);
    let body = UpdateStatusRequest { status: OrderStatus::Cancelled };
    let err = put_request(&token, "/orders/a1b2c3d4e5f60718/status", &body, configure_status_update)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. You may not update the status of order #a1b2c3d4e5f60718");
}

#[actix_web::test]
async fn unrecognized_statuses_are_rejected_at_the_boundary() {
    let _ = env_logger::try_init().ok();
    let mut db = MockMarketplaceDb::new();
    // The body never parses, so the backend is never consulted.
    db.expect_fetch_order_by_order_id().never();
    let orders_api = OrderFlowApi::new(db);
    let json_config = web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::InvalidRequestBody(err.to_string()).into());
    let app = App::new()
        .wrap(JwtAuthMiddlewareFactory::new(TEST_JWT_SECRET))
        .app_data(json_config)
        .app_data(web::Data::new(orders_api))
        .service(UpdateOrderStatusRoute::<MockMarketplaceDb>::new());
    let service = test::init_service(app).await;
    let token = issue_token("vend-ruby", Role::Vendor, false);
    let req = TestRequest::put()
        .uri("/orders/a1b2c3d4e5f60718/status")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .set_json(serde_json::json!({ "status": "confirmed" }))
        .to_request();
    let err = test::try_call_service(&service, req).await.expect_err("Expected the body to be rejected");
    let res = HttpResponse::from_error(err);
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.into_body().try_into_bytes().expect("Body was not ready");
    let result: Value = serde_json::from_slice(&body).expect("Invalid JSON body");
    assert_eq!(result["success"], false);
    let message = result["message"].as_str().expect("Missing error message");
    assert!(message.contains("unknown variant `confirmed`"), "Unexpected message: {message}");
}

fn configure_status_update(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sample_order())));
    db.expect_update_order_status().returning(|_, status| {
        let mut order = sample_order();
        order.status = status;
        Ok(order)
    });
    let orders_api = OrderFlowApi::new(db);
    cfg.service(UpdateOrderStatusRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}
