use thiserror::Error;

use crate::auth::JwtError;
use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Failures that stop the server from starting or running
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(#[from] AppError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("JWT error: {0}")]
    Jwt(#[from] JwtError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ServerError>;
