//! Repository Module
//!
//! One module per table. Functions taking `impl SqliteExecutor` run a single
//! statement and accept either the pool or an open transaction; functions
//! taking `&mut SqliteConnection` issue several statements and are only
//! called inside a transaction.

pub mod caixa;
pub mod customer;
pub mod debt;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

use crate::utils::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() || db.is_foreign_key_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(error = %msg, "Database operation failed");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Remap a uniqueness clash to a resource-specific error code
pub(crate) fn on_duplicate(code: ErrorCode, message: String) -> impl FnOnce(RepoError) -> AppError {
    move |err| match err {
        RepoError::Duplicate(_) => AppError::with_message(code, message),
        other => other.into(),
    }
}

/// Substring pattern for `LIKE ?1 ESCAPE '\'`, taking `%` and `_` in the query literally
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn unique_violation_maps_to_duplicate() {
        let db = DbService::in_memory().await.unwrap();
        let insert = "INSERT INTO customer (id, name, debt, created_at, updated_at) VALUES (?, ?, 0, 0, 0)";
        sqlx::query(insert).bind(1_i64).bind("Ana").execute(&db.pool).await.unwrap();

        let err: RepoError = sqlx::query(insert)
            .bind(2_i64)
            .bind("ANA")
            .execute(&db.pool)
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }

    #[tokio::test]
    async fn check_violation_maps_to_validation() {
        let db = DbService::in_memory().await.unwrap();
        let err: RepoError = sqlx::query(
            "INSERT INTO product (id, name, price, created_at, updated_at) VALUES (1, 'Pão', -1, 0, 0)",
        )
        .execute(&db.pool)
        .await
        .unwrap_err()
        .into();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn database_errors_hide_details() {
        let err: AppError = RepoError::Database("disk I/O error at page 7".into()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("page 7"));
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("ana"), "%ana%");
        assert_eq!(like_pattern("50%"), "%50\\%%");
        assert_eq!(like_pattern("a_b"), "%a\\_b%");
        assert_eq!(like_pattern("c:\\x"), "%c:\\\\x%");
    }

    #[test]
    fn duplicate_remap() {
        let err = on_duplicate(ErrorCode::CustomerNameExists, "Customer Ana already exists".into())(
            RepoError::Duplicate("UNIQUE constraint failed: customer.name".into()),
        );
        assert_eq!(err.code, ErrorCode::CustomerNameExists);

        let err = on_duplicate(ErrorCode::CustomerNameExists, String::new())(RepoError::NotFound(
            "x".into(),
        ));
        assert_eq!(err.code, ErrorCode::NotFound);
    }
}
