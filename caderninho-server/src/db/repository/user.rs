//! User Repository

use super::RepoResult;
use shared::models::{User, UserRole};
use sqlx::SqliteExecutor;

const USER_COLUMNS: &str =
    "id, username, password_hash, display_name, role, is_active, created_at, updated_at";

pub async fn count(db: impl SqliteExecutor<'_>) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM app_user")
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn find_all(db: impl SqliteExecutor<'_>) -> RepoResult<Vec<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM app_user ORDER BY username");
    let rows = sqlx::query_as::<_, User>(&sql).fetch_all(db).await?;
    Ok(rows)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE id = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

/// Case-insensitive lookup (column is `COLLATE NOCASE`)
pub async fn find_by_username(
    db: impl SqliteExecutor<'_>,
    username: &str,
) -> RepoResult<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM app_user WHERE username = ?");
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(
    db: impl SqliteExecutor<'_>,
    username: &str,
    password_hash: &str,
    display_name: &str,
    role: UserRole,
) -> RepoResult<User> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    let sql = format!(
        "INSERT INTO app_user (id, username, password_hash, display_name, role, is_active, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6) RETURNING {USER_COLUMNS}"
    );
    let row = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .bind(role)
        .bind(now)
        .fetch_one(db)
        .await?;
    Ok(row)
}
