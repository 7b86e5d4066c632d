//! Payment Model

use serde::{Deserialize, Serialize};

/// Payment method
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum PaymentMethod {
    #[default]
    Cash,
    Card,
    Pix,
    Transfer,
    Other,
}

impl PaymentMethod {
    /// Whether this payment puts money in the cash drawer
    pub fn is_cash(&self) -> bool {
        matches!(self, Self::Cash)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::Card => "card",
            Self::Pix => "pix",
            Self::Transfer => "transfer",
            Self::Other => "other",
        }
    }
}

/// Payment record (append-only)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: i64,
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub amount: f64,
    pub method: PaymentMethod,
    pub note: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
}
