//! Order Model

use serde::{Deserialize, Serialize};

use super::payment::{Payment, PaymentMethod};

/// Order (pedido)
///
/// Unpaid orders are the source of truth for customer debt. Paid orders
/// are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub customer_id: Option<i64>,
    /// Joined from customer, None for walk-in orders
    pub customer_name: Option<String>,
    pub total_amount: f64,
    pub is_paid: bool,
    pub paid_at: Option<i64>,
    pub note: Option<String>,
    pub created_by: i64,
    pub created_at: i64,
    pub updated_at: i64,
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

/// Order line, price captured at order time
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    /// None once the product has been deleted
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

/// Order line as sent by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i64,
    pub quantity: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub customer_id: Option<i64>,
    pub items: Vec<OrderItemInput>,
    pub note: Option<String>,
}

/// Update order payload (only while unpaid)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    pub customer_id: Option<i64>,
    pub items: Option<Vec<OrderItemInput>>,
    pub note: Option<String>,
}

/// Pay order payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPay {
    #[serde(default)]
    pub method: PaymentMethod,
    /// When present must equal the order total
    pub amount: Option<f64>,
    pub note: Option<String>,
}

/// Result of paying an order
///
/// `payment` is `None` for zero-total orders, which are marked paid without
/// a payment record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderPaymentResult {
    pub order: Order,
    pub payment: Option<Payment>,
}
