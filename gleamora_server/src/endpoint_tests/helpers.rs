use actix_web::{body::MessageBody, http::StatusCode, test, test::TestRequest, web::ServiceConfig, App};
use chrono::{TimeZone, Utc};
use gleamora_common::{Rupees, Secret};
use gleamora_engine::db_types::{
    LineItem,
    Order,
    OrderId,
    OrderStatus,
    PaymentMethod,
    PaymentStatus,
    Role,
    ShippingAddress,
};
use log::debug;
use serde::Serialize;

use crate::{auth::TokenIssuer, config::AuthConfig, middleware::JwtAuthMiddlewareFactory};

// A fixed signing secret for endpoint tests. DO NOT re-use this value anywhere.
pub const TEST_JWT_SECRET: &str = "a-test-only-signing-secret-with-plenty-of-entropy-0123456789abcdef";

pub fn test_auth_config() -> AuthConfig {
    AuthConfig { jwt_secret: Secret::new(TEST_JWT_SECRET.to_string()), token_lifetime_hours: 1 }
}

pub fn issue_token(sub: &str, role: Role, suspended: bool) -> String {
    let signer = TokenIssuer::new(&test_auth_config());
    signer.issue_token(sub, role, suspended).expect("Failed to sign token")
}

pub async fn get_request(
    auth_header: &str,
    path: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::get().uri(path);
    send_request(req, auth_header, configure).await
}

pub async fn post_request<T: Serialize>(
    auth_header: &str,
    path: &str,
    body: &T,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::post().uri(path).set_json(body);
    send_request(req, auth_header, configure).await
}

pub async fn put_request<T: Serialize>(
    auth_header: &str,
    path: &str,
    body: &T,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    let req = TestRequest::put().uri(path).set_json(body);
    send_request(req, auth_header, configure).await
}

async fn send_request(
    mut req: TestRequest,
    auth_header: &str,
    configure: fn(&mut ServiceConfig),
) -> Result<(StatusCode, String), String> {
    if !auth_header.is_empty() {
        req = req.insert_header(("Authorization", format!("Bearer {auth_header}")));
    }
    let req = req.to_request();
    let app = App::new().wrap(JwtAuthMiddlewareFactory::new(TEST_JWT_SECRET)).configure(configure);
    let service = test::init_service(app).await;
    debug!("Making request");
    let (_, res) = test::try_call_service(&service, req).await.map_err(|e| e.to_string())?.into_parts();
    let status = res.status();
    let body = String::from_utf8_lossy(&res.into_body().try_into_bytes().unwrap()).into_owned();
    Ok((status, body))
}

/// A two-vendor order belonging to customer `cust-100`, used across the endpoint tests.
pub fn sample_order() -> Order {
    Order {
        id: 1,
        order_id: OrderId("a1b2c3d4e5f60718".into()),
        customer_id: "cust-100".to_string(),
        items: vec![
            LineItem {
                product_id: "prod-ring".to_string(),
                title: "Gold Ring".to_string(),
                image: Some("https://cdn.gleamora.example/prod-ring/1.jpg".to_string()),
                quantity: 2,
                unit_price: Rupees::from_rupees(2499),
                vendor_id: "vend-ruby".to_string(),
                vendor_name: "Ruby & Co".to_string(),
            },
            LineItem {
                product_id: "prod-chain".to_string(),
                title: "Silver Chain".to_string(),
                image: None,
                quantity: 1,
                unit_price: Rupees::from(899_50),
                vendor_id: "vend-opal".to_string(),
                vendor_name: "Opal House".to_string(),
            },
        ],
        total_amount: Rupees::from(5_897_50),
        status: OrderStatus::Pending,
        shipping_address: sample_address(),
        payment_method: PaymentMethod::Upi,
        payment_status: PaymentStatus::Pending,
        payment_ref: None,
        order_notes: None,
        created_at: Utc.with_ymd_and_hms(2026, 2, 28, 13, 30, 0).unwrap(),
        updated_at: Utc.with_ymd_and_hms(2026, 2, 28, 13, 30, 0).unwrap(),
    }
}

/// Like [`sample_order`], but every line item belongs to `vend-ruby`.
pub fn sole_vendor_order() -> Order {
    let mut order = sample_order();
    order.items.truncate(1);
    order.total_amount = Rupees::from_rupees(4998);
    order
}

pub fn sample_address() -> ShippingAddress {
    ShippingAddress {
        street: "14 Marine Drive".to_string(),
        city: "Mumbai".to_string(),
        state: "MH".to_string(),
        zip_code: "400020".to_string(),
        country: "India".to_string(),
    }
}
