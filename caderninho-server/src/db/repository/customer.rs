//! Customer Repository
//!
//! `debt` is only written by [`set_debt`], called from the balance recompute.

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{Customer, CustomerCreate, CustomerUpdate};
use sqlx::SqliteExecutor;

const CUSTOMER_COLUMNS: &str = "id, name, phone, email, address, debt, created_at, updated_at";

/// List customers, optionally filtered by a name/phone substring
pub async fn find_all(
    db: impl SqliteExecutor<'_>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Customer>> {
    let pattern = search.map(like_pattern);
    let sql = format!(
        "SELECT {CUSTOMER_COLUMNS} FROM customer WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\' OR phone LIKE ?1 ESCAPE '\\') ORDER BY name LIMIT ?2 OFFSET ?3"
    );
    let rows = sqlx::query_as::<_, Customer>(&sql)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("SELECT {CUSTOMER_COLUMNS} FROM customer WHERE id = ?");
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(db: impl SqliteExecutor<'_>, data: CustomerCreate) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO customer (id, name, phone, email, address, debt, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?6) RETURNING {CUSTOMER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .bind(&data.name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.address)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

/// Patch contact fields; `None` keeps the stored value
pub async fn update(
    db: impl SqliteExecutor<'_>,
    id: i64,
    data: CustomerUpdate,
) -> RepoResult<Customer> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE customer SET name = COALESCE(?1, name), phone = CASE WHEN ?2 IS NULL THEN phone ELSE NULLIF(?2, '') END, email = CASE WHEN ?3 IS NULL THEN email ELSE NULLIF(?3, '') END, address = CASE WHEN ?4 IS NULL THEN address ELSE NULLIF(?4, '') END, updated_at = ?5 WHERE id = ?6 RETURNING {CUSTOMER_COLUMNS}"
    );
    sqlx::query_as::<_, Customer>(&sql)
        .bind(&data.name)
        .bind(&data.phone)
        .bind(&data.email)
        .bind(&data.address)
        .bind(now)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Customer {id} not found")))
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM customer WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Stored balance, `None` when the customer does not exist
pub async fn find_debt(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<f64>> {
    let debt = sqlx::query_scalar::<_, f64>("SELECT debt FROM customer WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(debt)
}

pub async fn set_debt(db: impl SqliteExecutor<'_>, id: i64, debt: f64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE customer SET debt = ? WHERE id = ?")
        .bind(debt)
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn find_all_ids(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM customer ORDER BY id")
        .fetch_all(db)
        .await?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn ana() -> CustomerCreate {
        CustomerCreate {
            name: "Ana Souza".into(),
            phone: Some("11 98888-0000".into()),
            email: None,
            address: None,
        }
    }

    #[tokio::test]
    async fn create_find_update_delete() {
        let db = DbService::in_memory().await.unwrap();
        let created = create(&db.pool, ana()).await.unwrap();
        assert_eq!(created.debt, 0.0);

        let found = find_by_id(&db.pool, created.id).await.unwrap().unwrap();
        assert_eq!(found.name, "Ana Souza");

        let updated = update(
            &db.pool,
            created.id,
            CustomerUpdate {
                email: Some("ana@example.com".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.email.as_deref(), Some("ana@example.com"));
        assert_eq!(updated.phone.as_deref(), Some("11 98888-0000"));

        assert!(delete(&db.pool, created.id).await.unwrap());
        assert!(!delete(&db.pool, created.id).await.unwrap());
        assert!(find_by_id(&db.pool, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_matches_name_and_phone() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, ana()).await.unwrap();
        create(
            &db.pool,
            CustomerCreate {
                name: "Bruno".into(),
                phone: None,
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(find_all(&db.pool, None, 50, 0).await.unwrap().len(), 2);
        assert_eq!(find_all(&db.pool, Some("souza"), 50, 0).await.unwrap().len(), 1);
        assert_eq!(find_all(&db.pool, Some("98888"), 50, 0).await.unwrap().len(), 1);
        assert!(find_all(&db.pool, Some("zzz"), 50, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_missing_customer() {
        let db = DbService::in_memory().await.unwrap();
        let err = update(&db.pool, 404, CustomerUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn search_escapes_wildcards() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, ana()).await.unwrap();
        create(
            &db.pool,
            CustomerCreate {
                name: "Bar_do_Zé".into(),
                phone: None,
                email: None,
                address: None,
            },
        )
        .await
        .unwrap();

        let found = find_all(&db.pool, Some("r_d"), 50, 0).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Bar_do_Zé");
        assert!(find_all(&db.pool, Some("a_S"), 50, 0).await.unwrap().is_empty());
    }
}
