//! Caixa (cash register) Repository
//!
//! One row per business date; `date` is unique so a second open for the same
//! day fails at the database as well.

use std::collections::HashMap;

use super::RepoResult;
use shared::models::{Caixa, CaixaTransaction, TransactionKind};
use sqlx::{QueryBuilder, Sqlite, SqliteExecutor};

const CAIXA_COLUMNS: &str = "id, date, initial_balance, is_closed, opened_at, opened_by, closed_at, closed_by, closing_balance, note";

const TRANSACTION_COLUMNS: &str =
    "id, caixa_id, kind, amount, description, payment_id, created_by, created_at";

#[derive(Debug, Clone)]
pub struct NewTransaction<'a> {
    pub caixa_id: i64,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: &'a str,
    pub payment_id: Option<i64>,
    pub created_by: i64,
}

pub async fn find_by_date(db: impl SqliteExecutor<'_>, date: &str) -> RepoResult<Option<Caixa>> {
    let sql = format!("SELECT {CAIXA_COLUMNS} FROM caixa WHERE date = ?");
    let row = sqlx::query_as::<_, Caixa>(&sql)
        .bind(date)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Sessions with `from <= date <= to`, newest first
pub async fn find_range(
    db: impl SqliteExecutor<'_>,
    from: Option<&str>,
    to: Option<&str>,
    limit: i64,
) -> RepoResult<Vec<Caixa>> {
    let sql = format!(
        "SELECT {CAIXA_COLUMNS} FROM caixa WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2) ORDER BY date DESC LIMIT ?3"
    );
    let rows = sqlx::query_as::<_, Caixa>(&sql)
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn insert(
    db: impl SqliteExecutor<'_>,
    date: &str,
    initial_balance: f64,
    opened_by: i64,
    note: Option<&str>,
) -> RepoResult<Caixa> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO caixa (id, date, initial_balance, is_closed, opened_at, opened_by, note) VALUES (?1, ?2, ?3, 0, ?4, ?5, ?6) RETURNING {CAIXA_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Caixa>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(date)
        .bind(initial_balance)
        .bind(now)
        .bind(opened_by)
        .bind(note)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Close an open session; `None` when it is already closed
pub async fn close(
    db: impl SqliteExecutor<'_>,
    id: i64,
    closed_by: i64,
    closing_balance: f64,
    note: Option<&str>,
) -> RepoResult<Option<Caixa>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE caixa SET is_closed = 1, closed_at = ?1, closed_by = ?2, closing_balance = ?3, note = COALESCE(?4, note) WHERE id = ?5 AND is_closed = 0 RETURNING {CAIXA_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Caixa>(&sql)
        .bind(now)
        .bind(closed_by)
        .bind(closing_balance)
        .bind(note)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn insert_transaction(
    db: impl SqliteExecutor<'_>,
    data: NewTransaction<'_>,
) -> RepoResult<CaixaTransaction> {
    let now = shared::util::now_millis();
    let sql = format!(
        "INSERT INTO caixa_transaction (id, caixa_id, kind, amount, description, payment_id, created_by, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8) RETURNING {TRANSACTION_COLUMNS}"
    );
    let row = sqlx::query_as::<_, CaixaTransaction>(&sql)
        .bind(shared::util::snowflake_id())
        .bind(data.caixa_id)
        .bind(data.kind)
        .bind(data.amount)
        .bind(data.description)
        .bind(data.payment_id)
        .bind(data.created_by)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn find_transactions(
    db: impl SqliteExecutor<'_>,
    caixa_id: i64,
) -> RepoResult<Vec<CaixaTransaction>> {
    let sql = format!(
        "SELECT {TRANSACTION_COLUMNS} FROM caixa_transaction WHERE caixa_id = ? ORDER BY created_at, id"
    );
    let rows = sqlx::query_as::<_, CaixaTransaction>(&sql)
        .bind(caixa_id)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

/// Transactions of several sessions, grouped by `caixa_id`
pub async fn find_transactions_for(
    db: impl SqliteExecutor<'_>,
    caixa_ids: &[i64],
) -> RepoResult<HashMap<i64, Vec<CaixaTransaction>>> {
    let mut grouped: HashMap<i64, Vec<CaixaTransaction>> = HashMap::new();
    if caixa_ids.is_empty() {
        return Ok(grouped);
    }

    let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "SELECT {TRANSACTION_COLUMNS} FROM caixa_transaction WHERE caixa_id IN ("
    ));
    let mut sep = qb.separated(", ");
    for id in caixa_ids {
        sep.push_bind(*id);
    }
    sep.push_unseparated(") ORDER BY created_at, id");

    for tx in qb.build_query_as::<CaixaTransaction>().fetch_all(db).await? {
        grouped.entry(tx.caixa_id).or_default().push(tx);
    }
    Ok(grouped)
}
