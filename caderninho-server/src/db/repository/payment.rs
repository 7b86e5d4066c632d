//! Payment Repository (append-only)

use super::RepoResult;
use shared::models::{Payment, PaymentMethod};
use sqlx::SqliteExecutor;

const PAYMENT_COLUMNS: &str =
    "id, customer_id, order_id, amount, method, note, created_by, created_at";

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub note: Option<&'a str>,
    pub created_by: i64,
}

pub async fn insert(db: impl SqliteExecutor<'_>, data: NewPayment<'_>) -> RepoResult<Payment> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO payment (id, customer_id, order_id, amount, method, note, created_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {PAYMENT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(data.customer_id)
        .bind(data.order_id)
        .bind(data.amount)
        .bind(data.method)
        .bind(data.note)
        .bind(data.created_by)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("SELECT {PAYMENT_COLUMNS} FROM payment WHERE id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn find_all(db: impl SqliteExecutor<'_>, filter: &PaymentFilter) -> RepoResult<Vec<Payment>> {
    let sql = format!(
        "SELECT {PAYMENT_COLUMNS} FROM payment WHERE (?1 IS NULL OR customer_id = ?1) AND (?2 IS NULL OR order_id = ?2) AND (?3 IS NULL OR created_at >= ?3) AND (?4 IS NULL OR created_at < ?4) ORDER BY created_at DESC, id DESC LIMIT ?5 OFFSET ?6"
    );
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(filter.customer_id)
        .bind(filter.order_id)
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}
