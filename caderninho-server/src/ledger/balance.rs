//! Customer balance reconciliation
//!
//! `customer.debt` is a cache of `Σ total_amount` over the customer's unpaid
//! orders. [`recompute_customer_debt`] is the only writer and always runs on
//! the connection of the transaction that changed the orders.

use rust_decimal::Decimal;
use sqlx::SqliteConnection;

use super::money::{amounts_match, sum_amounts, to_f64};
use crate::db::repository::{RepoResult, customer, order};

/// Recompute and store one customer's balance; returns the new value
///
/// Idempotent. A missing customer yields zero and writes nothing.
pub async fn recompute_customer_debt(
    conn: &mut SqliteConnection,
    customer_id: i64,
) -> RepoResult<Decimal> {
    let totals = order::unpaid_totals(&mut *conn, customer_id).await?;
    let debt = sum_amounts(totals);
    customer::set_debt(&mut *conn, customer_id, to_f64(debt)).await?;
    Ok(debt)
}

/// Recompute every customer; returns `(checked, corrected)`
///
/// A correction means the stored value had drifted from the orders.
pub async fn recompute_all(conn: &mut SqliteConnection) -> RepoResult<(usize, usize)> {
    let ids = customer::find_all_ids(&mut *conn).await?;
    let mut corrected = 0;

    for &id in &ids {
        let stored = customer::find_debt(&mut *conn, id).await?.unwrap_or_default();
        let debt = recompute_customer_debt(conn, id).await?;
        if !amounts_match(stored, debt) {
            tracing::warn!(
                customer_id = id,
                stored,
                recomputed = %debt,
                "Customer debt drifted from unpaid orders, corrected"
            );
            corrected += 1;
        }
    }

    Ok((ids.len(), corrected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    async fn seed(pool: &sqlx::SqlitePool) {
        sqlx::query("INSERT INTO customer (id, name, debt, created_at, updated_at) VALUES (1, 'Ana', 0, 0, 0), (2, 'Bia', 0, 0, 0)")
            .execute(pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO orders (id, customer_id, total_amount, is_paid, created_by, created_at, updated_at) VALUES \
             (10, 1, 50.0, 0, 1, 0, 0), (11, 1, 30.0, 0, 1, 0, 0), (12, 1, 99.0, 1, 1, 0, 0), (13, 2, 0.1, 0, 1, 0, 0), (14, 2, 0.2, 0, 1, 0, 0)",
        )
        .execute(pool)
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn sums_only_unpaid_orders() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;

        let mut tx = db.pool.begin().await.unwrap();
        let debt = recompute_customer_debt(&mut tx, 1).await.unwrap();
        assert_eq!(debt, Decimal::new(80, 0));
        // idempotent
        let again = recompute_customer_debt(&mut tx, 1).await.unwrap();
        assert_eq!(again, debt);
        let small = recompute_customer_debt(&mut tx, 2).await.unwrap();
        assert_eq!(small, Decimal::new(30, 2));
        tx.commit().await.unwrap();

        let stored = customer::find_debt(&db.pool, 2).await.unwrap().unwrap();
        assert_eq!(stored, 0.3);
    }

    #[tokio::test]
    async fn recompute_all_reports_and_repairs_drift() {
        let db = DbService::in_memory().await.unwrap();
        seed(&db.pool).await;

        let mut tx = db.pool.begin().await.unwrap();
        assert_eq!(recompute_all(&mut tx).await.unwrap(), (2, 2));
        assert_eq!(recompute_all(&mut tx).await.unwrap(), (2, 0));
        tx.commit().await.unwrap();

        sqlx::query("UPDATE customer SET debt = 1234 WHERE id = 1")
            .execute(&db.pool)
            .await
            .unwrap();

        let mut tx = db.pool.begin().await.unwrap();
        assert_eq!(recompute_all(&mut tx).await.unwrap(), (2, 1));
        tx.commit().await.unwrap();
        assert_eq!(customer::find_debt(&db.pool, 1).await.unwrap(), Some(80.0));
    }
}
