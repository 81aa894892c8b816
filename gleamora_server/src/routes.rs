//! Request handler definitions
//!
//! Define each route and it handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! Role gates are declared on the route (via [`AclMiddlewareFactory`](crate::middleware::AclMiddlewareFactory)),
//! while per-order access (is this *my* order? does it carry *my* line items?) is resolved inside the handler with
//! [`permissions_for`], after the order has been loaded. A missing order is always reported as 404 before any
//! permission check, so probing for order ids leaks nothing.
use actix_web::{get, web, HttpResponse, Responder};
use gleamora_common::INR_CURRENCY_CODE;
use gleamora_engine::{
    authorization::permissions_for,
    db_types::{NewOrder, Order, OrderId, Role},
    order_objects::{OrderQueryFilter, Pagination},
    traits::{CatalogManagement, MarketplaceDatabase},
    CatalogApi,
    OrderFlowApi,
};
use log::*;

use crate::{
    auth::JwtClaims,
    config::PlatformUpiConfig,
    data_objects::{
        CreateOrderRequest,
        OrderListParams,
        OrderListResponse,
        PaymentIntentRequest,
        PaymentIntentResult,
        PaymentVerifyRequest,
        UpdateStatusRequest,
        UpiDetails,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal requires [$($roles:ty),*]) => {
        paste::paste! { pub struct [<$name:camel Route>];}
        paste::paste! {
                impl [<$name:camel Route>] {
                #[allow(clippy::new_without_default)]
                pub fn new() -> Self { Self }
            }
        }
        paste::paste! {
            impl actix_web::dev::HttpServiceFactory for [<$name:camel Route>] {
                fn register(self, config: &mut actix_web::dev::AppService) {
                    let res = actix_web::Resource::new($path)
                        .name(stringify!($name))
                        .guard(actix_web::guard::$method())
                        .to($name)
                        .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                    actix_web::dev::HttpServiceFactory::register(res, config);
                }
            }
        }
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:ty),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds +)+ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------

route!(create_order => Post "/orders" impl MarketplaceDatabase where requires [Role::Customer]);
/// Route handler for the order creation endpoint.
///
/// The customer id is taken from the access token, never from the body. The cart is priced and
/// stock is reserved in a single transaction on the backend; on any failure (unknown product,
/// insufficient stock, bad quantity) nothing is stored and the client gets the reason.
pub async fn create_order<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<CreateOrderRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST create_order for {}", claims.sub);
    let request = body.into_inner();
    let mut new_order = NewOrder::new(claims.sub.clone(), request.products, request.shipping_address)
        .with_payment_method(request.payment_method);
    if let Some(notes) = request.order_notes {
        new_order = new_order.with_notes(notes);
    }
    let order = api.place_order(new_order).await?;
    info!("💻️ Order {} created for customer {}", order.order_id, order.customer_id);
    Ok(HttpResponse::Created().json(order))
}

route!(my_orders => Get "/orders" impl MarketplaceDatabase);
/// Route handler for the order listing endpoint.
///
/// Every authenticated user may call this, but the result is scoped by role: customers see only
/// their own orders, vendors only orders carrying at least one of their line items, and admins see
/// everything. The scope comes from the access token, so there is no way to widen it from the
/// request.
pub async fn my_orders<B: MarketplaceDatabase>(
    claims: JwtClaims,
    params: web::Query<OrderListParams>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET my_orders for {} ({})", claims.sub, claims.role);
    let params = params.into_inner();
    let mut query = match claims.role {
        Role::Customer => OrderQueryFilter::default().with_customer_id(claims.sub.clone()),
        Role::Vendor => OrderQueryFilter::default().with_vendor_id(claims.sub.clone()),
        Role::Admin => OrderQueryFilter::default(),
    };
    if let Some(status) = params.status {
        query = query.with_status(status);
    }
    let pagination =
        Pagination::new(params.page.unwrap_or(1), params.limit.unwrap_or(Pagination::DEFAULT_LIMIT));
    let result = api.search_orders(query, pagination).await?;
    Ok(HttpResponse::Ok().json(OrderListResponse::from(result)))
}

route!(order_by_id => Get "/orders/{order_id}" impl MarketplaceDatabase);
/// Route handler for fetching a single order.
///
/// 404 if the order does not exist; 403 if it exists but the caller has no view rights on it.
pub async fn order_by_id<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET order {order_id} for {}", claims.sub);
    let order = fetch_order_or_404(api.as_ref(), &order_id).await?;
    assert_can_view(&claims, &order)?;
    Ok(HttpResponse::Ok().json(order))
}

route!(update_order_status => Put "/orders/{order_id}/status" impl MarketplaceDatabase where requires [Role::Vendor, Role::Admin]);
/// Route handler for moving an order through its lifecycle.
///
/// Customers never pass the role gate on this route. Vendors additionally need a line item of
/// theirs on the order; admins can drive any order. Any of the six statuses is a legal target,
/// including cancelled and backwards moves, so support staff can correct mistakes.
pub async fn update_order_status<B: MarketplaceDatabase>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    body: web::Json<UpdateStatusRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    let status = body.into_inner().status;
    debug!("💻️ PUT order {order_id} status to {status} by {} ({})", claims.sub, claims.role);
    let order = fetch_order_or_404(api.as_ref(), &order_id).await?;
    let actor = claims.actor();
    if !permissions_for(Some(&actor), &order).can_update_status {
        debug!("💻️ {} may not update the status of order {order_id}", claims.sub);
        return Err(ServerError::InsufficientPermissions(format!(
            "You may not update the status of order {order_id}"
        )));
    }
    let order = api.update_status(&order_id, status).await?;
    Ok(HttpResponse::Ok().json(order))
}

//----------------------------------------------   Payments  ----------------------------------------------------

route!(payment_intent => Post "/payments/intent" impl MarketplaceDatabase);
/// Route handler for the payment intent endpoint.
///
/// Returns the exact amount, in paise, that a payment processor should collect for the order,
/// together with the reference the processor must quote back on verification. The amount always
/// comes from the stored order, never from the client.
pub async fn payment_intent<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<PaymentIntentRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let order_id = body.into_inner().order_id;
    debug!("💻️ POST payment_intent for order {order_id} by {}", claims.sub);
    let order = fetch_order_or_404(api.as_ref(), &order_id).await?;
    assert_can_view(&claims, &order)?;
    let result = PaymentIntentResult {
        order_id: order.order_id.clone(),
        amount: order.total_amount.value(),
        currency: INR_CURRENCY_CODE.to_string(),
        reference: order.order_id.as_str().to_string(),
    };
    Ok(HttpResponse::Ok().json(result))
}

route!(payment_verify => Post "/payments/verify" impl MarketplaceDatabase);
/// Route handler for the payment verification endpoint.
///
/// The asserted outcome is recorded verbatim: success marks the payment completed, failure marks
/// it failed, and the processor's payment id is stored for audit either way. The fulfillment
/// status of the order is never touched from here.
pub async fn payment_verify<B: MarketplaceDatabase>(
    claims: JwtClaims,
    body: web::Json<PaymentVerifyRequest>,
    api: web::Data<OrderFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let request = body.into_inner();
    debug!("💻️ POST payment_verify for order {} by {}: {:?}", request.order_id, claims.sub, request.status);
    let order = fetch_order_or_404(api.as_ref(), &request.order_id).await?;
    assert_can_view(&claims, &order)?;
    let order = api.record_payment_outcome(&request.order_id, request.status, &request.payment_id).await?;
    info!("💻️ Payment {} recorded against order {}: {}", request.payment_id, order.order_id, order.payment_status);
    Ok(HttpResponse::Ok().json(order))
}

route!(upi_details => Get "/payments/upi/{order_id}" impl MarketplaceDatabase, CatalogManagement);
/// Route handler for the UPI payee endpoint.
///
/// When every line item on the order belongs to one vendor, and that vendor has a UPI id on file,
/// the payment goes straight to the vendor. Otherwise the platform's own UPI account collects the
/// payment for later disbursement. 404 if neither identity is available.
pub async fn upi_details<B: MarketplaceDatabase + CatalogManagement>(
    claims: JwtClaims,
    path: web::Path<OrderId>,
    orders: web::Data<OrderFlowApi<B>>,
    catalog: web::Data<CatalogApi<B>>,
    platform: web::Data<PlatformUpiConfig>,
) -> Result<HttpResponse, ServerError> {
    let order_id = path.into_inner();
    debug!("💻️ GET upi_details for order {order_id} by {}", claims.sub);
    let order = fetch_order_or_404(orders.as_ref(), &order_id).await?;
    assert_can_view(&claims, &order)?;
    let vendor_ids = order.vendor_ids();
    if let Some(vendor_id) = catalog.sole_vendor_id(&vendor_ids) {
        if let Some(vendor) = catalog.fetch_vendor(vendor_id).await? {
            if let Some(upi_id) = vendor.upi_id {
                trace!("💻️ Order {order_id} is a sole-vendor order. Payee is {}", vendor.name);
                let details = UpiDetails {
                    order_id: order.order_id.clone(),
                    payee_name: vendor.name,
                    upi_id,
                    qr_code: vendor.upi_qr_code,
                    amount: order.total_amount,
                };
                return Ok(HttpResponse::Ok().json(details));
            }
        }
    }
    if platform.upi_id.is_empty() {
        debug!("💻️ No UPI payee is available for order {order_id}");
        return Err(ServerError::NoRecordFound(format!("No UPI payment details are available for order {order_id}")));
    }
    trace!("💻️ Order {order_id} falls back to the platform UPI account");
    let details = UpiDetails {
        order_id: order.order_id.clone(),
        payee_name: "Gleamora Jewels".to_string(),
        upi_id: platform.upi_id.clone(),
        qr_code: platform.qr_code.clone(),
        amount: order.total_amount,
    };
    Ok(HttpResponse::Ok().json(details))
}

//----------------------------------------------   Helpers  ----------------------------------------------------

async fn fetch_order_or_404<B: MarketplaceDatabase>(
    api: &OrderFlowApi<B>,
    order_id: &OrderId,
) -> Result<Order, ServerError> {
    let order = api.fetch_order(order_id).await.map_err(|e| {
        debug!("💻️ Could not fetch order {order_id}. {e}");
        ServerError::BackendError(e.to_string())
    })?;
    order.ok_or_else(|| ServerError::NoRecordFound(format!("Order {order_id} does not exist")))
}

fn assert_can_view(claims: &JwtClaims, order: &Order) -> Result<(), ServerError> {
    let actor = claims.actor();
    if permissions_for(Some(&actor), order).can_view {
        Ok(())
    } else {
        debug!("💻️ {} may not view order {}", claims.sub, order.order_id);
        Err(ServerError::InsufficientPermissions(format!("You may not view order {}", order.order_id)))
    }
}
