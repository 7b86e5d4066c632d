//! API routes
//!
//! - [`health`] - liveness and database check
//! - [`auth`] - login and current user
//! - [`users`] - user management (admin)
//! - [`customers`] - customer CRUD with unpaid orders
//! - [`products`] - catalog and stock adjustment
//! - [`orders`] - order lifecycle
//! - [`payments`] - payment history
//! - [`debts`] - debt summary, customer settlement, recompute
//! - [`caixa`] - cash register sessions
//!
//! Handlers read input through [`extract`] so malformed requests get the
//! same JSON error body as every other failure.

use axum::Router;

use crate::core::ServerState;

pub mod auth;
pub mod caixa;
pub mod customers;
pub mod debts;
pub mod extract;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

pub use crate::utils::{AppError, AppResult};

/// All routes, without state or middleware
pub fn build_app() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(users::router())
        .merge(customers::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(debts::router())
        .merge(caixa::router())
}
