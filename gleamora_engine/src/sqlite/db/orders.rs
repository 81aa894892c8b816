use gleamora_common::Rupees;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{LineItem, NewOrder, Order, OrderId, OrderStatus, PaymentStatus},
    order_objects::{OrderQueryFilter, Pagination},
    traits::OrderEngineError,
};

/// Inserts a new order and its line items using the given connection. This is not atomic. Callers
/// embed this inside the placement transaction and pass `&mut *tx` as the connection argument, so
/// the insert commits or rolls back together with the stock reservations.
///
/// The line items carry the unit prices snapshotted from the catalog at reservation time, and
/// `total` must be the exact sum of their line totals.
pub async fn insert_order(
    order: &NewOrder,
    items: Vec<LineItem>,
    total: Rupees,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderEngineError> {
    let order_id = OrderId::random();
    let mut inserted: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_id,
                customer_id,
                total_amount,
                street,
                city,
                state,
                zip_code,
                country,
                payment_method,
                order_notes
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *;
        "#,
    )
    .bind(&order_id)
    .bind(&order.customer_id)
    .bind(total)
    .bind(&order.shipping_address.street)
    .bind(&order.shipping_address.city)
    .bind(&order.shipping_address.state)
    .bind(&order.shipping_address.zip_code)
    .bind(&order.shipping_address.country)
    .bind(order.payment_method.to_string())
    .bind(&order.order_notes)
    .fetch_one(&mut *conn)
    .await?;
    for item in &items {
        sqlx::query(
            "INSERT INTO order_items (order_id, product_id, title, image, quantity, unit_price, vendor_id, \
             vendor_name) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(inserted.id)
        .bind(&item.product_id)
        .bind(&item.title)
        .bind(&item.image)
        .bind(item.quantity)
        .bind(item.unit_price)
        .bind(&item.vendor_id)
        .bind(&item.vendor_name)
        .execute(&mut *conn)
        .await?;
    }
    inserted.items = items;
    debug!("📝️ Order {} inserted with id {}", inserted.order_id, inserted.id);
    Ok(inserted)
}

/// Returns the order with the given public order id, with its line items attached.
pub async fn fetch_order_by_order_id(
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order: Option<Order> = sqlx::query_as("SELECT * FROM orders WHERE order_id = $1")
        .bind(order_id.as_str())
        .fetch_optional(&mut *conn)
        .await?;
    match order {
        Some(mut order) => {
            order.items = fetch_line_items(order.id, conn).await?;
            Ok(Some(order))
        },
        None => Ok(None),
    }
}

pub async fn fetch_line_items(order_db_id: i64, conn: &mut SqliteConnection) -> Result<Vec<LineItem>, sqlx::Error> {
    let items = sqlx::query_as(
        "SELECT product_id, title, image, quantity, unit_price, vendor_id, vendor_name FROM order_items WHERE \
         order_id = $1 ORDER BY id",
    )
    .bind(order_db_id)
    .fetch_all(conn)
    .await?;
    Ok(items)
}

fn push_filters(builder: &mut QueryBuilder<'_, Sqlite>, query: &OrderQueryFilter) {
    if query.is_empty() {
        return;
    }
    builder.push(" WHERE ");
    let mut where_clause = builder.separated(" AND ");
    if let Some(order_id) = &query.order_id {
        where_clause.push("order_id = ");
        where_clause.push_bind_unseparated(order_id.as_str().to_string());
    }
    if let Some(cid) = &query.customer_id {
        where_clause.push("customer_id = ");
        where_clause.push_bind_unseparated(cid.clone());
    }
    if let Some(vid) = &query.vendor_id {
        where_clause.push("EXISTS (SELECT 1 FROM order_items WHERE order_items.order_id = orders.id AND vendor_id = ");
        where_clause.push_bind_unseparated(vid.clone());
        where_clause.push_unseparated(")");
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.as_ref().map(|s| s.iter().map(|s| format!("'{s}'")).collect::<Vec<_>>()).unwrap_or_default();
        let status_clause = statuses.join(",");
        where_clause.push(format!("status IN ({status_clause})"));
    }
    if let Some(payment_status) = &query.payment_status {
        where_clause.push("payment_status = ");
        where_clause.push_bind_unseparated(payment_status.to_string());
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
}

/// Fetches one page of orders according to the criteria in the `OrderQueryFilter`, newest first,
/// along with the total number of matching orders. Line items are attached to every returned
/// order.
pub async fn search_orders(
    query: &OrderQueryFilter,
    pagination: Pagination,
    conn: &mut SqliteConnection,
) -> Result<(Vec<Order>, i64), sqlx::Error> {
    let mut count_builder = QueryBuilder::new("SELECT COUNT(*) FROM orders");
    push_filters(&mut count_builder, query);
    let total: i64 = count_builder.build_query_scalar().fetch_one(&mut *conn).await?;

    let mut builder = QueryBuilder::new("SELECT * FROM orders");
    push_filters(&mut builder, query);
    builder.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    builder.push_bind(pagination.limit());
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());
    trace!("📝️ Executing query: {}", builder.sql());
    let mut orders = builder.build_query_as::<Order>().fetch_all(&mut *conn).await?;
    for order in &mut orders {
        order.items = fetch_line_items(order.id, &mut *conn).await?;
    }
    trace!("📝️ Result of search_orders: {} of {total}", orders.len());
    Ok((orders, total))
}

pub(crate) async fn update_order_status(
    order_id: &OrderId,
    status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderEngineError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE order_id = $2 RETURNING *",
    )
    .bind(status.to_string())
    .bind(order_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    match result {
        Some(mut order) => {
            order.items = fetch_line_items(order.id, conn).await?;
            Ok(order)
        },
        None => Err(OrderEngineError::OrderNotFound(order_id.clone())),
    }
}

pub(crate) async fn update_payment_outcome(
    order_id: &OrderId,
    payment_status: PaymentStatus,
    payment_ref: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, OrderEngineError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET payment_status = $1, payment_ref = $2, updated_at = CURRENT_TIMESTAMP WHERE order_id = \
         $3 RETURNING *",
    )
    .bind(payment_status.to_string())
    .bind(payment_ref)
    .bind(order_id.as_str())
    .fetch_optional(&mut *conn)
    .await?;
    match result {
        Some(mut order) => {
            order.items = fetch_line_items(order.id, conn).await?;
            Ok(order)
        },
        None => Err(OrderEngineError::OrderNotFound(order_id.clone())),
    }
}
