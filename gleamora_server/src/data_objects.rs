use std::fmt::Display;

use gleamora_common::Rupees;
use gleamora_engine::{
    db_types::{CartItem, Order, OrderId, OrderStatus, PaymentMethod, PaymentOutcome, ShippingAddress},
    order_objects::OrderListResult,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub success: bool,
    pub message: String,
}

impl JsonResponse {
    pub fn success<S: Display>(message: S) -> Self {
        Self { success: true, message: message.to_string() }
    }

    pub fn failure<S: Display>(message: S) -> Self {
        Self { success: false, message: message.to_string() }
    }
}

/// The order creation payload. The customer id is never part of the body; it always comes from
/// the access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub products: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub order_notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Query parameters for order listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub total: i64,
    pub page: u32,
    pub pages: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderListResponse {
    pub orders: Vec<Order>,
    pub pagination: PaginationInfo,
}

impl From<OrderListResult> for OrderListResponse {
    fn from(result: OrderListResult) -> Self {
        Self {
            orders: result.orders,
            pagination: PaginationInfo { total: result.total, page: result.page, pages: result.pages },
        }
    }
}

/// The payment processor's asserted result for a payment attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerifyRequest {
    pub order_id: OrderId,
    pub payment_id: String,
    pub status: PaymentOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub order_id: OrderId,
}

/// What a client needs to start a payment: the exact amount in paise, and a reference to quote
/// back on verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentResult {
    pub order_id: OrderId,
    /// Amount in paise, as payment processors require.
    pub amount: i64,
    pub currency: String,
    pub reference: String,
}

/// The payee identity for a UPI payment, either a sole vendor's or the platform's.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpiDetails {
    pub order_id: OrderId,
    pub payee_name: String,
    pub upi_id: String,
    pub qr_code: Option<String>,
    pub amount: Rupees,
}
