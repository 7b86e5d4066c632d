//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes, all timestamps Unix millis.

pub mod caixa;
pub mod customer;
pub mod debt;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

// Re-exports
pub use caixa::*;
pub use customer::*;
pub use debt::*;
pub use order::*;
pub use payment::*;
pub use product::*;
pub use user::*;
