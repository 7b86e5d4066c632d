//! Order Repository
//!
//! Orders are read joined with the customer name; items live in `order_item`
//! and are attached in one extra query per page.

use std::collections::HashMap;

use super::RepoResult;
use shared::models::{Order, OrderItem};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

const ORDER_SELECT: &str = "SELECT o.id, o.customer_id, c.name AS customer_name, o.total_amount, o.is_paid, o.paid_at, o.note, o.created_by, o.created_at, o.updated_at FROM orders o LEFT JOIN customer c ON c.id = o.customer_id";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, quantity, price";

/// Order list filter; every field is optional
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub customer_id: Option<i64>,
    pub is_paid: Option<bool>,
    /// Inclusive lower bound on `created_at`
    pub from: Option<i64>,
    /// Exclusive upper bound on `created_at`
    pub to: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

/// Item row to insert, price already resolved from the catalog
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{ORDER_SELECT} WHERE o.id = ?");
    let row = sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_items(db: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<Vec<OrderItem>> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id = ? ORDER BY id");
    let rows = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Order with its items
pub async fn find_with_items(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let Some(mut order) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    order.items = find_items(pool, id).await?;
    Ok(Some(order))
}

pub async fn find_all(pool: &SqlitePool, filter: &OrderFilter) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE (?1 IS NULL OR o.customer_id = ?1) AND (?2 IS NULL OR o.is_paid = ?2) AND (?3 IS NULL OR o.created_at >= ?3) AND (?4 IS NULL OR o.created_at < ?4) ORDER BY o.created_at DESC, o.id DESC LIMIT ?5 OFFSET ?6"
    );
    let mut orders = sqlx::query_as::<_, Order>(&sql)
        .bind(filter.customer_id)
        .bind(filter.is_paid)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(pool)
        .await?;
    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

/// Unpaid orders of a customer, oldest first, with items
pub async fn find_unpaid_by_customer(
    pool: &SqlitePool,
    customer_id: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE o.customer_id = ? AND o.is_paid = 0 ORDER BY o.created_at, o.id"
    );
    let mut orders = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    attach_items(pool, &mut orders).await?;
    Ok(orders)
}

/// Unpaid orders of a customer without items, for use inside a transaction
pub async fn find_unpaid_headers(
    db: impl SqliteExecutor<'_>,
    customer_id: i64,
) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "{ORDER_SELECT} WHERE o.customer_id = ? AND o.is_paid = 0 ORDER BY o.created_at, o.id"
    );
    let rows = sqlx::query_as::<_, Order>(&sql)
        .bind(customer_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// `total_amount` of every unpaid order of a customer
pub async fn unpaid_totals(db: impl SqliteExecutor<'_>, customer_id: i64) -> RepoResult<Vec<f64>> {
    let totals = sqlx::query_scalar::<_, f64>(
        "SELECT total_amount FROM orders WHERE customer_id = ? AND is_paid = 0",
    )
    .bind(customer_id)
    .fetch_all(db)
    .await?;
    Ok(totals)
}

pub async fn count_unpaid_by_customer(
    db: impl SqliteExecutor<'_>,
    customer_id: i64,
) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM orders WHERE customer_id = ? AND is_paid = 0",
    )
    .bind(customer_id)
    .fetch_one(db)
    .await?;
    Ok(n)
}

/// Fill `items` for a page of orders with a single `IN (...)` query
async fn attach_items(db: impl SqliteExecutor<'_>, orders: &mut [Order]) -> RepoResult<()> {
    if orders.is_empty() {
        return Ok(());
    }

    let mut qb: QueryBuilder<Sqlite> =
        QueryBuilder::new(format!("SELECT {ITEM_COLUMNS} FROM order_item WHERE order_id IN ("));
    let mut sep = qb.separated(", ");
    for order in orders.iter() {
        sep.push_bind(order.id);
    }
    sep.push_unseparated(") ORDER BY id");

    let items = qb.build_query_as::<OrderItem>().fetch_all(db).await?;

    let mut by_order: HashMap<i64, Vec<OrderItem>> = HashMap::new();
    for item in items {
        by_order.entry(item.order_id).or_default().push(item);
    }
    for order in orders.iter_mut() {
        order.items = by_order.remove(&order.id).unwrap_or_default();
    }
    Ok(())
}

pub async fn insert(
    db: impl SqliteExecutor<'_>,
    id: i64,
    customer_id: Option<i64>,
    total_amount: f64,
    note: Option<&str>,
    created_by: i64,
) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO orders (id, customer_id, total_amount, is_paid, paid_at, note, created_by, created_at, updated_at) VALUES (?1, ?2, ?3, 0, NULL, ?4, ?5, ?6, ?6)",
    )
    .bind(id)
    .bind(customer_id)
    .bind(total_amount)
    .bind(note)
    .bind(created_by)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn insert_item(
    db: impl SqliteExecutor<'_>,
    order_id: i64,
    item: &NewOrderItem,
) -> RepoResult<()> {
    sqlx::query(
        "INSERT INTO order_item (id, order_id, product_id, product_name, quantity, price) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )
    .bind(shared::util::snowflake_id())
    .bind(order_id)
    .bind(item.product_id)
    .bind(&item.product_name)
    .bind(item.quantity)
    .bind(item.price)
    .execute(db)
    .await?;
    Ok(())
}

pub async fn delete_items(db: impl SqliteExecutor<'_>, order_id: i64) -> RepoResult<()> {
    sqlx::query("DELETE FROM order_item WHERE order_id = ?")
        .bind(order_id)
        .execute(db)
        .await?;
    Ok(())
}

/// Rewrite the header of an unpaid order; `false` when it is gone or paid
pub async fn update_unpaid(
    db: impl SqliteExecutor<'_>,
    id: i64,
    customer_id: Option<i64>,
    total_amount: f64,
    note: Option<&str>,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET customer_id = ?1, total_amount = ?2, note = ?3, updated_at = ?4 WHERE id = ?5 AND is_paid = 0",
    )
    .bind(customer_id)
    .bind(total_amount)
    .bind(note)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Flip an unpaid order to paid; `false` when it was already paid
pub async fn mark_paid(db: impl SqliteExecutor<'_>, id: i64, paid_at: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE orders SET is_paid = 1, paid_at = ?1, updated_at = ?1 WHERE id = ?2 AND is_paid = 0",
    )
    .bind(paid_at)
    .bind(id)
    .execute(db)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Delete an unpaid order (items cascade); `false` when it is gone or paid
pub async fn delete_unpaid(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM orders WHERE id = ? AND is_paid = 0")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}
