//! Utilities: error re-exports, logging, validation, time helpers

pub mod logger;
pub mod time;
pub mod types;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
