//! Core: configuration, shared state, HTTP server and startup errors
//!
//! - [`Config`] - environment-driven settings
//! - [`ServerState`] - handles shared by every handler
//! - [`Server`] - HTTP listener with graceful shutdown
//! - [`ServerError`] - startup and runtime failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_router};
pub use state::ServerState;
