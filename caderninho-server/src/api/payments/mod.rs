//! Payment API (read only; payments are written by order and debt settlement)

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/payments", get(handler::list))
        .route("/api/payments/{id}", get(handler::get_by_id))
}
