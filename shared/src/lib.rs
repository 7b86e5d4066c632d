//! Shared types for Caderninho
//!
//! Models, error codes and response envelope used by the server and by
//! any HTTP client of the ledger API.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
