//! Cash register API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/caixa", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/open", post(handler::open))
        .route("/transaction", post(handler::add_transaction))
        .route("/close", post(handler::close))
        .route("/status", get(handler::status))
        .route("/history", get(handler::history))
        .route("/{date}", get(handler::by_date))
}
