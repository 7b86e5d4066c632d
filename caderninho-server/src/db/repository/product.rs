//! Product Repository
//!
//! `stock_quantity` NULL means stock is not tracked; stock writes only touch
//! tracked products and are guarded so the count never goes below zero.

use super::{RepoError, RepoResult, like_pattern};
use shared::models::{Product, ProductCreate, ProductUpdate};
use sqlx::SqliteExecutor;

const PRODUCT_COLUMNS: &str = "id, name, price, description, stock_quantity, created_at, updated_at";

pub async fn find_all(
    db: impl SqliteExecutor<'_>,
    search: Option<&str>,
    limit: i64,
    offset: i64,
) -> RepoResult<Vec<Product>> {
    let pattern = search.map(like_pattern);
    let sql = format!(
        "SELECT {PRODUCT_COLUMNS} FROM product WHERE (?1 IS NULL OR name LIKE ?1 ESCAPE '\\') ORDER BY name LIMIT ?2 OFFSET ?3"
    );
    let rows = sqlx::query_as::<_, Product>(&sql)
        .bind(pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(db)
        .await?;
    Ok(rows)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM product WHERE id = ?");
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(db: impl SqliteExecutor<'_>, data: ProductCreate) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO product (id, name, price, description, stock_quantity, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.description)
        .bind(data.stock_quantity)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}

pub async fn update(
    db: impl SqliteExecutor<'_>,
    id: i64,
    data: ProductUpdate,
) -> RepoResult<Product> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE product SET name = COALESCE(?1, name), price = COALESCE(?2, price), description = CASE WHEN ?3 IS NULL THEN description ELSE NULLIF(?3, '') END, stock_quantity = COALESCE(?4, stock_quantity), updated_at = ?5 WHERE id = ?6 RETURNING {PRODUCT_COLUMNS}"
    );
    sqlx::query_as::<_, Product>(&sql)
        .bind(&data.name)
        .bind(data.price)
        .bind(&data.description)
        .bind(data.stock_quantity)
        .bind(now)
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
}

pub async fn delete(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM product WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    Ok(rows.rows_affected() > 0)
}

/// Whether an unpaid order still lists this product
pub async fn is_in_unpaid_order(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<bool> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM order_item oi JOIN orders o ON o.id = oi.order_id WHERE oi.product_id = ? AND o.is_paid = 0)",
    )
    .bind(id)
    .fetch_one(db)
    .await?;
    Ok(exists)
}

/// Decrement tracked stock; `false` when there is not enough
pub async fn take_stock(db: impl SqliteExecutor<'_>, id: i64, quantity: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE product SET stock_quantity = stock_quantity - ?1, updated_at = ?2 WHERE id = ?3 AND stock_quantity IS NOT NULL AND stock_quantity >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Give stock back; untracked or deleted products are left alone
pub async fn restock(db: impl SqliteExecutor<'_>, id: i64, quantity: i64) -> RepoResult<()> {
    let now = shared::util::now_millis();
    sqlx::query(
        "UPDATE product SET stock_quantity = stock_quantity + ?1, updated_at = ?2 WHERE id = ?3 AND stock_quantity IS NOT NULL",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}

/// Apply a signed delta to tracked stock
///
/// `None` when the product is missing, untracked, or the result would be negative.
pub async fn adjust_stock(
    db: impl SqliteExecutor<'_>,
    id: i64,
    delta: i64,
) -> RepoResult<Option<Product>> {
    let now = shared::util::now_millis();
    let sql = format!(
        "UPDATE product SET stock_quantity = stock_quantity + ?1, updated_at = ?2 WHERE id = ?3 AND stock_quantity IS NOT NULL AND stock_quantity + ?1 >= 0 RETURNING {PRODUCT_COLUMNS}"
    );
    let row = sqlx::query_as::<_, Product>(&sql)
        .bind(delta)
        .bind(now)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn product(name: &str, stock: Option<i64>) -> ProductCreate {
        ProductCreate {
            name: name.into(),
            price: 4.5,
            description: None,
            stock_quantity: stock,
        }
    }

    #[tokio::test]
    async fn take_stock_is_guarded() {
        let db = DbService::in_memory().await.unwrap();
        let p = create(&db.pool, product("Café", Some(3))).await.unwrap();

        assert!(take_stock(&db.pool, p.id, 2).await.unwrap());
        assert!(!take_stock(&db.pool, p.id, 2).await.unwrap());
        let p = find_by_id(&db.pool, p.id).await.unwrap().unwrap();
        assert_eq!(p.stock_quantity, Some(1));

        restock(&db.pool, p.id, 2).await.unwrap();
        let p = find_by_id(&db.pool, p.id).await.unwrap().unwrap();
        assert_eq!(p.stock_quantity, Some(3));
    }

    #[tokio::test]
    async fn untracked_stock_is_untouched() {
        let db = DbService::in_memory().await.unwrap();
        let p = create(&db.pool, product("Pão", None)).await.unwrap();

        assert!(!take_stock(&db.pool, p.id, 1).await.unwrap());
        restock(&db.pool, p.id, 5).await.unwrap();
        assert!(adjust_stock(&db.pool, p.id, 5).await.unwrap().is_none());
        let p = find_by_id(&db.pool, p.id).await.unwrap().unwrap();
        assert_eq!(p.stock_quantity, None);
    }

    #[tokio::test]
    async fn adjust_stock_never_goes_negative() {
        let db = DbService::in_memory().await.unwrap();
        let p = create(&db.pool, product("Leite", Some(2))).await.unwrap();

        let p2 = adjust_stock(&db.pool, p.id, 10).await.unwrap().unwrap();
        assert_eq!(p2.stock_quantity, Some(12));
        assert!(adjust_stock(&db.pool, p.id, -13).await.unwrap().is_none());
        let p3 = adjust_stock(&db.pool, p.id, -12).await.unwrap().unwrap();
        assert_eq!(p3.stock_quantity, Some(0));
    }

    #[tokio::test]
    async fn duplicate_name_ignores_case() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, product("Arroz", None)).await.unwrap();
        let err = create(&db.pool, product("ARROZ", None)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn negative_price_is_rejected_by_schema() {
        let db = DbService::in_memory().await.unwrap();
        let mut data = product("Feijão", None);
        data.price = -1.0;
        let err = create(&db.pool, data).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, product("Café 500g", None)).await.unwrap();
        create(&db.pool, product("Desconto 50%", None)).await.unwrap();
        create(&db.pool, product("pao_doce", None)).await.unwrap();
        create(&db.pool, product("pao de queijo", None)).await.unwrap();

        let names = |rows: Vec<Product>| rows.into_iter().map(|p| p.name).collect::<Vec<_>>();
        assert_eq!(
            names(find_all(&db.pool, Some("50%"), 50, 0).await.unwrap()),
            ["Desconto 50%"]
        );
        assert_eq!(
            names(find_all(&db.pool, Some("pao_"), 50, 0).await.unwrap()),
            ["pao_doce"]
        );
        assert_eq!(find_all(&db.pool, Some("%"), 50, 0).await.unwrap().len(), 1);
        assert_eq!(find_all(&db.pool, None, 50, 0).await.unwrap().len(), 4);
    }
}
