//! Debt read model
//!
//! Reads the cached `customer.debt`; there is no debt table.

use super::RepoResult;
use shared::models::CustomerDebt;
use sqlx::SqliteExecutor;

/// Customers owing money, largest debt first
pub async fn find_debtors(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<CustomerDebt>> {
    let rows = sqlx::query_as::<_, CustomerDebt>(
        "SELECT c.id AS customer_id, c.name AS customer_name, c.debt AS total_debt, (SELECT COUNT(*) FROM orders o WHERE o.customer_id = c.id AND o.is_paid = 0) AS unpaid_orders FROM customer c WHERE c.debt > 0 ORDER BY c.debt DESC, c.name",
    )
    .fetch_all(db)
    .await?;
    Ok(rows)
}
