//! Ledger: every write that touches balances, stock, payments or the caixa
//!
//! - [`balance`] - recompute `customer.debt` from unpaid orders
//! - [`money`] - Decimal helpers and amount validation
//! - [`service`] - [`LedgerService`], order and debt-payment flows
//! - [`caixa`] - cash register sessions
//!
//! Each flow runs in one SQL transaction while holding the service write lock.

pub mod balance;
pub mod caixa;
pub mod money;
pub mod service;

pub use service::LedgerService;
