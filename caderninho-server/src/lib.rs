//! Caderninho server - small-business ledger
//!
//! # Module layout
//!
//! ```text
//! caderninho-server/src/
//! ├── core/     # config, state, server, errors
//! ├── auth/     # JWT, password hashing, middleware
//! ├── api/      # HTTP routes and handlers
//! ├── ledger/   # balance reconciliation, order/payment/caixa writes
//! ├── db/       # SQLite pool, migrations, repositories
//! └── utils/    # logging, validation, time helpers
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod ledger;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use ledger::LedgerService;
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

pub use utils::logger::init_logger_with_file;

/// Security event logging, always emitted on the `security` target
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}
