//! Authentication Routes
//!
//! `/api/auth/login` is public; `/api/auth/me` goes through the global
//! `require_auth` middleware.

mod handler;

use axum::{Router, routing::get, routing::post};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/auth/login", post(handler::login))
        .route("/api/auth/me", get(handler::me))
}
