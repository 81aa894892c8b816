use actix_web::{http::StatusCode, web, web::ServiceConfig};
use gleamora_engine::{
    db_types::{OrderId, PaymentOutcome, PaymentStatus, Role, Vendor},
    CatalogApi,
    OrderFlowApi,
};
use serde_json::Value;

use super::helpers::{get_request, issue_token, post_request, sample_order, sole_vendor_order};
use crate::{
    config::PlatformUpiConfig,
    data_objects::{PaymentIntentRequest, PaymentVerifyRequest},
    endpoint_tests::mocks::MockMarketplaceDb,
    routes::{PaymentIntentRoute, PaymentVerifyRoute, UpiDetailsRoute},
};

//------------------------------------    Payment intents    ----------------------------------------------------

#[actix_web::test]
async fn intents_quote_the_stored_total_in_paise() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let body = PaymentIntentRequest { order_id: OrderId("a1b2c3d4e5f60718".into()) };
    let (status, body) = post_request(&token, "/payments/intent", &body, configure_intent).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let intent: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(intent["amount"], 5_897_50);
    assert_eq!(intent["currency"], "INR");
    assert_eq!(intent["reference"], "a1b2c3d4e5f60718");
}

#[actix_web::test]
async fn strangers_cannot_request_intents_for_an_order() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-999", Role::Customer, false);
    let body = PaymentIntentRequest { order_id: OrderId("a1b2c3d4e5f60718".into()) };
    let err = post_request(&token, "/payments/intent", &body, configure_intent).await.expect_err("Expected error");
    assert_eq!(err, "Insufficient Permissions. You may not view order #a1b2c3d4e5f60718");
}

fn configure_intent(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sample_order())));
    let orders_api = OrderFlowApi::new(db);
    cfg.service(PaymentIntentRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

//------------------------------------    Payment verification    ----------------------------------------------------

#[actix_web::test]
async fn successful_payments_are_recorded_with_their_reference() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let body = PaymentVerifyRequest {
        order_id: OrderId("a1b2c3d4e5f60718".into()),
        payment_id: "pay_8842".to_string(),
        status: PaymentOutcome::Success,
    };
    let (status, body) = post_request(&token, "/payments/verify", &body, configure_verify).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let order: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(order["paymentStatus"], "completed");
    assert_eq!(order["paymentRef"], "pay_8842");
    // Fulfillment state is untouched by the payment outcome.
    assert_eq!(order["status"], "pending");
}

fn configure_verify(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sample_order())));
    db.expect_update_payment_outcome()
        .withf(|_, outcome, payment_ref| *outcome == PaymentOutcome::Success && payment_ref == "pay_8842")
        .returning(|_, _, payment_ref| {
            let mut order = sample_order();
            order.payment_status = PaymentStatus::Completed;
            order.payment_ref = Some(payment_ref.to_string());
            Ok(order)
        });
    let orders_api = OrderFlowApi::new(db);
    cfg.service(PaymentVerifyRoute::<MockMarketplaceDb>::new()).app_data(web::Data::new(orders_api));
}

//------------------------------------    UPI payee resolution    ----------------------------------------------------

#[actix_web::test]
async fn sole_vendor_orders_pay_the_vendor_directly() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let (status, body) =
        get_request(&token, "/payments/upi/a1b2c3d4e5f60718", configure_upi_sole_vendor).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let details: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(details["payeeName"], "Ruby & Co");
    assert_eq!(details["upiId"], "ruby@upi");
    assert_eq!(details["amount"], 4_998_00);
}

#[actix_web::test]
async fn multi_vendor_orders_fall_back_to_the_platform_account() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let (status, body) =
        get_request(&token, "/payments/upi/a1b2c3d4e5f60718", configure_upi_multi_vendor).await.expect("Request failed");
    assert_eq!(status, StatusCode::OK);
    let details: Value = serde_json::from_str(&body).expect("Invalid JSON body");
    assert_eq!(details["payeeName"], "Gleamora Jewels");
    assert_eq!(details["upiId"], "gleamora@upi");
}

#[actix_web::test]
async fn no_payee_at_all_is_a_404() {
    let _ = env_logger::try_init().ok();
    let token = issue_token("cust-100", Role::Customer, false);
    let err = get_request(&token, "/payments/upi/a1b2c3d4e5f60718", configure_upi_no_payee)
        .await
        .expect_err("Expected error");
    assert_eq!(err, "The data was not found. No UPI payment details are available for order #a1b2c3d4e5f60718");
}

fn ruby_vendor() -> Vendor {
    Vendor {
        id: "vend-ruby".to_string(),
        name: "Ruby & Co".to_string(),
        upi_id: Some("ruby@upi".to_string()),
        upi_qr_code: None,
    }
}

fn configure_upi_sole_vendor(cfg: &mut ServiceConfig) {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sole_vendor_order())));
    let mut catalog_db = MockMarketplaceDb::new();
    catalog_db.expect_fetch_vendor().withf(|id| id == "vend-ruby").returning(|_| Ok(Some(ruby_vendor())));
    register_upi_route(cfg, db, catalog_db, "gleamora@upi");
}

fn configure_upi_multi_vendor(cfg: &mut ServiceConfig) {
    let db = order_only_db();
    // Two vendors on the order, so the catalog is never consulted.
    let catalog_db = MockMarketplaceDb::new();
    register_upi_route(cfg, db, catalog_db, "gleamora@upi");
}

fn configure_upi_no_payee(cfg: &mut ServiceConfig) {
    let db = order_only_db();
    let catalog_db = MockMarketplaceDb::new();
    register_upi_route(cfg, db, catalog_db, "");
}

fn order_only_db() -> MockMarketplaceDb {
    let mut db = MockMarketplaceDb::new();
    db.expect_fetch_order_by_order_id().returning(|_| Ok(Some(sample_order())));
    db
}

fn register_upi_route(cfg: &mut ServiceConfig, db: MockMarketplaceDb, catalog_db: MockMarketplaceDb, platform_upi: &str) {
    let orders_api = OrderFlowApi::new(db);
    let catalog_api = CatalogApi::new(catalog_db);
    let platform = PlatformUpiConfig { upi_id: platform_upi.to_string(), qr_code: None };
    cfg.service(UpiDetailsRoute::<MockMarketplaceDb>::new())
        .app_data(web::Data::new(orders_api))
        .app_data(web::Data::new(catalog_api))
        .app_data(web::Data::new(platform));
}
