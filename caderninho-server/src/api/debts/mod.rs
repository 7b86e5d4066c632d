//! Debt API

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/debts/summary", get(handler::summary))
        .route("/api/debts/customer/{id}", get(handler::customer_detail))
        .route("/api/debts/customer/{id}/pay", post(handler::pay))
        .merge(admin_routes())
}

fn admin_routes() -> Router<ServerState> {
    Router::new()
        .route("/api/debts/recalculate", post(handler::recalculate))
        .route_layer(middleware::from_fn(require_admin))
}
