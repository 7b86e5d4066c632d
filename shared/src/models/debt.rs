//! Debt read model
//!
//! Debts are not stored: they are derived from unpaid orders.

use serde::{Deserialize, Serialize};

use super::order::Order;
use super::payment::{Payment, PaymentMethod};

/// Outstanding balance of one customer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerDebt {
    pub customer_id: i64,
    pub customer_name: String,
    pub total_debt: f64,
    pub unpaid_orders: i64,
}

/// Debt overview, customers sorted by debt descending
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtSummary {
    pub total_debt: f64,
    pub customer_count: usize,
    pub customers: Vec<CustomerDebt>,
}

/// Balance of one customer with the orders composing it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerDebtDetail {
    pub customer_id: i64,
    pub customer_name: String,
    pub total_debt: f64,
    pub orders: Vec<Order>,
}

/// Customer-level debt payment
///
/// Settles whole orders: the listed ones, or every unpaid order when
/// `order_ids` is absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebtPayment {
    #[serde(default)]
    pub method: PaymentMethod,
    pub order_ids: Option<Vec<i64>>,
    /// When present must equal the sum being settled
    pub amount: Option<f64>,
    pub note: Option<String>,
}

/// Outcome of a customer-level debt payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPaymentResult {
    pub customer_id: i64,
    pub amount_paid: f64,
    pub remaining_debt: f64,
    pub payments: Vec<Payment>,
}

/// Outcome of a full balance recompute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecalculateResult {
    pub customers_checked: usize,
    pub customers_corrected: usize,
}
