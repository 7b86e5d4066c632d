//! Cash register (caixa) Model

use serde::{Deserialize, Serialize};

/// One cash register session per business date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Caixa {
    pub id: i64,
    /// Business date (YYYY-MM-DD)
    pub date: String,
    pub initial_balance: f64,
    pub is_closed: bool,
    pub opened_at: i64,
    pub opened_by: i64,
    pub closed_at: Option<i64>,
    pub closed_by: Option<i64>,
    /// Balance snapshot taken at close
    pub closing_balance: Option<f64>,
    pub note: Option<String>,
}

/// Transaction direction
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum TransactionKind {
    Inflow,
    Outflow,
}

/// Cash movement inside a session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CaixaTransaction {
    pub id: i64,
    pub caixa_id: i64,
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
    /// Set when the movement was generated by a cash payment
    pub payment_id: Option<i64>,
    pub created_by: i64,
    pub created_at: i64,
}

/// Open cash register payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaixaOpen {
    #[serde(default)]
    pub initial_balance: f64,
    pub note: Option<String>,
}

/// Manual transaction payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaixaTransactionCreate {
    pub kind: TransactionKind,
    pub amount: f64,
    pub description: String,
}

/// Close cash register payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaixaClose {
    pub note: Option<String>,
}

/// Session state for one date with computed totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaixaStatus {
    pub date: String,
    pub is_open: bool,
    pub caixa: Option<Caixa>,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub current_balance: f64,
    pub transactions: Vec<CaixaTransaction>,
}

/// History row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaixaSummary {
    #[serde(flatten)]
    pub caixa: Caixa,
    pub total_inflow: f64,
    pub total_outflow: f64,
    pub current_balance: f64,
    pub transaction_count: usize,
}
