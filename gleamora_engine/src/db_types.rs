use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use gleamora_common::Rupees;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------        OrderId        -------------------------------------------------------
/// The public identifier for an order. A short random hex string assigned at creation time, used
/// on the wire instead of the internal row id.
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn random() -> Self {
        Self(format!("{:016x}", rand::random::<u64>()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

//--------------------------------------      OrderStatus       ------------------------------------------------------
/// The fulfillment stage of an order. This is a closed set; anything else on the wire is rejected
/// with an `InvalidStatus` error rather than coerced.
///
/// Membership is the only constraint on transitions. The storefront drives the workflow order, so
/// direct jumps (e.g. `Pending` → `Delivered` for a COD handover) are accepted here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Newly placed; stock is reserved but nothing has shipped.
    Pending,
    /// A manual (UPI) payment has been submitted and awaits vendor confirmation.
    PaymentPendingApproval,
    Packed,
    Shipped,
    /// Terminal.
    Delivered,
    /// Terminal. Cancellation is a status, not a deletion; the order remains on record.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OrderStatus::Pending => "pending",
            OrderStatus::PaymentPendingApproval => "payment_pending_approval",
            OrderStatus::Packed => "packed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for OrderStatus {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "payment_pending_approval" => Ok(Self::PaymentPendingApproval),
            "packed" => Ok(Self::Packed),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//--------------------------------------     PaymentMethod      ------------------------------------------------------
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cod,
    Card,
    Upi,
    Netbanking,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentMethod::Cod => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Netbanking => "netbanking",
        };
        write!(f, "{s}")
    }
}

//--------------------------------------     PaymentStatus      ------------------------------------------------------
/// Whether the money for an order has arrived. Deliberately independent of [`OrderStatus`]: a COD
/// order can be `Delivered` while its payment is still `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
}

impl Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

//--------------------------------------    PaymentOutcome      ------------------------------------------------------
/// The externally-asserted result of a payment attempt, as reported by the processor collaborator.
/// Trusted verbatim once the order is located.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentOutcome {
    Success,
    Failure,
}

impl FromStr for PaymentOutcome {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "failure" | "failed" => Ok(Self::Failure),
            s => Err(ConversionError(format!("Invalid payment outcome: {s}"))),
        }
    }
}

//--------------------------------------         Role           ------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Vendor,
    Admin,
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Role::Customer => "customer",
            Role::Vendor => "vendor",
            Role::Admin => "admin",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Role {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "customer" => Ok(Self::Customer),
            // The storefront and admin UI historically call vendors "shopkeepers"
            "vendor" | "shopkeeper" => Ok(Self::Vendor),
            "admin" => Ok(Self::Admin),
            s => Err(ConversionError(format!("Invalid role: {s}"))),
        }
    }
}

//--------------------------------------    ShippingAddress     ------------------------------------------------------
#[derive(Debug, Clone, Default, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

impl ShippingAddress {
    /// All five fields are required. Returns the names of any that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.street.trim().is_empty() {
            missing.push("street");
        }
        if self.city.trim().is_empty() {
            missing.push("city");
        }
        if self.state.trim().is_empty() {
            missing.push("state");
        }
        if self.zip_code.trim().is_empty() {
            missing.push("zipCode");
        }
        if self.country.trim().is_empty() {
            missing.push("country");
        }
        missing
    }
}

//--------------------------------------       CartItem         ------------------------------------------------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: String,
    pub quantity: i64,
}

//--------------------------------------       NewOrder         ------------------------------------------------------
/// Everything needed to place an order. Line items and the total are *not* part of this type;
/// they are derived from the catalog inside the order-creation transaction so that prices cannot
/// be supplied by the client.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_id: String,
    pub items: Vec<CartItem>,
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub order_notes: Option<String>,
}

impl NewOrder {
    pub fn new(customer_id: impl Into<String>, items: Vec<CartItem>, shipping_address: ShippingAddress) -> Self {
        Self {
            customer_id: customer_id.into(),
            items,
            shipping_address,
            payment_method: PaymentMethod::default(),
            order_notes: None,
        }
    }

    pub fn with_payment_method(mut self, method: PaymentMethod) -> Self {
        self.payment_method = method;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.order_notes = Some(notes.into());
        self
    }
}

//--------------------------------------       LineItem         ------------------------------------------------------
/// One product/quantity/price/vendor tuple within an order.
///
/// `unit_price` and `vendor_id` are copied from the catalog when the order is created and never
/// change afterwards, so historical orders are immune to later price edits and vendor-scoped
/// authorization never needs to re-join the catalog.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: String,
    pub title: String,
    /// The product's primary catalog image at placement time, if it had one.
    pub image: Option<String>,
    pub quantity: i64,
    #[serde(rename = "price")]
    pub unit_price: Rupees,
    pub vendor_id: String,
    /// The vendor's display name at placement time.
    pub vendor_name: String,
}

impl LineItem {
    pub fn line_total(&self) -> Rupees {
        self.unit_price * self.quantity
    }
}

//--------------------------------------        Order           ------------------------------------------------------
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(skip)]
    pub id: i64,
    pub order_id: OrderId,
    pub customer_id: String,
    /// Populated by a second query against `order_items`; not part of the `orders` row.
    #[sqlx(skip)]
    #[serde(rename = "products")]
    pub items: Vec<LineItem>,
    pub total_amount: Rupees,
    pub status: OrderStatus,
    #[sqlx(flatten)]
    pub shipping_address: ShippingAddress,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    /// Reference assigned by the external payment processor, once an outcome has been recorded.
    pub payment_ref: Option<String>,
    pub order_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// True iff at least one line item belongs to the given vendor.
    pub fn has_vendor(&self, vendor_id: &str) -> bool {
        self.items.iter().any(|item| item.vendor_id == vendor_id)
    }

    pub fn vendor_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.items.iter().map(|item| item.vendor_id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }
}

//--------------------------------------       Product          ------------------------------------------------------
/// A catalog row as this engine sees it: price, stock and owner. Catalog CRUD lives elsewhere;
/// the only mutation performed here is the stock decrement at reservation time.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub title: String,
    pub images: sqlx::types::Json<Vec<String>>,
    pub price: Rupees,
    pub stock: i64,
    pub vendor_id: String,
}

//--------------------------------------        Vendor          ------------------------------------------------------
/// A vendor's payment identity, read when surfacing UPI collection details for an order.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vendor {
    pub id: String,
    pub name: String,
    pub upi_id: Option<String>,
    pub upi_qr_code: Option<String>,
}
