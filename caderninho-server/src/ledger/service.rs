use std::sync::Arc;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{
    Customer, DebtPayment, DebtPaymentResult, Order, OrderCreate, OrderItemInput, OrderPay,
    OrderPaymentResult, OrderUpdate, Payment, PaymentMethod, Product, RecalculateResult,
    TransactionKind,
};
use sqlx::{SqliteConnection, SqlitePool};
use tokio::sync::{Mutex, MutexGuard};

use super::balance::{self, recompute_customer_debt};
use super::money::{
    amounts_match, order_total, require_finite, sum_amounts, to_decimal, to_f64, validate_quantity,
};
use crate::db::repository::caixa::NewTransaction;
use crate::db::repository::order::NewOrderItem;
use crate::db::repository::payment::NewPayment;
use crate::db::repository::{RepoError, caixa, customer, order, payment, product};
use crate::utils::time::business_date_string;
use crate::utils::validation::{MAX_NOTE_LEN, normalize_optional, validate_optional_text};
use crate::utils::{AppError, AppResult, ErrorCode};

/// Serialised writer for the ledger
///
/// Reads go straight to the pool. Writes take `write_lock`, open a
/// transaction, and recompute every affected customer before committing.
#[derive(Clone, Debug)]
pub struct LedgerService {
    pub(super) pool: SqlitePool,
    pub(super) timezone: Tz,
    write_lock: Arc<Mutex<()>>,
}

impl LedgerService {
    pub fn new(pool: SqlitePool, timezone: Tz) -> Self {
        Self {
            pool,
            timezone,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub(super) async fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().await
    }

    // ==================== Orders ====================

    /// Create an unpaid order, taking stock for tracked products
    pub async fn create_order(&self, data: OrderCreate, created_by: i64) -> AppResult<Order> {
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let note = normalize_optional(data.note);

        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        if let Some(customer_id) = data.customer_id {
            ensure_customer(&mut tx, customer_id).await?;
        }
        let items = take_items(&mut tx, &data.items).await?;
        let total = order_total(&items);

        let id = shared::util::snowflake_id();
        order::insert(&mut *tx, id, data.customer_id, to_f64(total), note.as_deref(), created_by)
            .await?;
        for item in &items {
            order::insert_item(&mut *tx, id, item).await?;
        }
        if let Some(customer_id) = data.customer_id {
            recompute_customer_debt(&mut tx, customer_id).await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(
            order_id = id,
            customer_id = ?data.customer_id,
            total = %total,
            items = items.len(),
            "Order created"
        );

        self.load_order(id).await
    }

    /// Edit an unpaid order
    ///
    /// New items replace the old ones: old quantities go back to stock before
    /// the new ones are taken. Both the previous and the new customer are
    /// recomputed.
    pub async fn update_order(&self, id: i64, data: OrderUpdate) -> AppResult<Order> {
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;

        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let existing = find_order(&mut tx, id).await?;
        if existing.is_paid {
            return Err(order_already_paid(id));
        }

        let customer_id = match data.customer_id {
            Some(customer_id) => {
                ensure_customer(&mut tx, customer_id).await?;
                Some(customer_id)
            }
            None => existing.customer_id,
        };

        let total = match &data.items {
            Some(inputs) => {
                restock_items(&mut tx, id).await?;
                let items = take_items(&mut tx, inputs).await?;
                order::delete_items(&mut *tx, id).await?;
                for item in &items {
                    order::insert_item(&mut *tx, id, item).await?;
                }
                order_total(&items)
            }
            None => to_decimal(existing.total_amount),
        };

        // "" clears the note, absent keeps it
        let note = match data.note {
            Some(note) => normalize_optional(Some(note)),
            None => existing.note.clone(),
        };

        if !order::update_unpaid(&mut *tx, id, customer_id, to_f64(total), note.as_deref()).await? {
            return Err(order_already_paid(id));
        }

        if let Some(previous) = existing.customer_id {
            recompute_customer_debt(&mut tx, previous).await?;
        }
        if let Some(current) = customer_id
            && existing.customer_id != Some(current)
        {
            recompute_customer_debt(&mut tx, current).await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(
            order_id = id,
            previous_customer = ?existing.customer_id,
            customer_id = ?customer_id,
            total = %total,
            "Order updated"
        );

        self.load_order(id).await
    }

    /// Settle an order in full
    ///
    /// Appends a payment of `total_amount`, logs a caixa inflow for cash when
    /// today's caixa is open, and recomputes the customer. Paying twice fails
    /// with `OrderAlreadyPaid`.
    pub async fn pay_order(
        &self,
        id: i64,
        data: OrderPay,
        paid_by: i64,
    ) -> AppResult<OrderPaymentResult> {
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let note = normalize_optional(data.note);

        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let existing = find_order(&mut tx, id).await?;
        if existing.is_paid {
            return Err(order_already_paid(id));
        }

        let total = to_decimal(existing.total_amount);
        if let Some(amount) = data.amount {
            check_amount(amount, total)?;
        }

        if !order::mark_paid(&mut *tx, id, shared::util::now_millis()).await? {
            return Err(order_already_paid(id));
        }

        let payment = self
            .record_payment(
                &mut tx,
                &existing,
                data.method,
                note.as_deref(),
                paid_by,
                format!("Payment for order {id}"),
            )
            .await?;

        if let Some(customer_id) = existing.customer_id {
            recompute_customer_debt(&mut tx, customer_id).await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(
            order_id = id,
            customer_id = ?existing.customer_id,
            amount = %total,
            method = data.method.as_str(),
            "Order paid"
        );

        Ok(OrderPaymentResult {
            order: self.load_order(id).await?,
            payment,
        })
    }

    /// Delete an unpaid order and give its stock back
    pub async fn delete_order(&self, id: i64) -> AppResult<()> {
        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let existing = find_order(&mut tx, id).await?;
        if existing.is_paid {
            return Err(order_already_paid(id));
        }

        restock_items(&mut tx, id).await?;
        if !order::delete_unpaid(&mut *tx, id).await? {
            return Err(order_already_paid(id));
        }
        if let Some(customer_id) = existing.customer_id {
            recompute_customer_debt(&mut tx, customer_id).await?;
        }

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(order_id = id, customer_id = ?existing.customer_id, "Order deleted");
        Ok(())
    }

    // ==================== Catalog removal ====================

    /// Delete a customer without unpaid orders
    ///
    /// The check and the delete share the write lock and one transaction, so
    /// no order can be attached in between. Paid history keeps its rows with
    /// `customer_id` set to NULL.
    pub async fn delete_customer(&self, id: i64) -> AppResult<Customer> {
        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let existing = customer::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| customer_not_found(id))?;
        let unpaid = order::count_unpaid_by_customer(&mut *tx, id).await?;
        if unpaid > 0 {
            return Err(AppError::new(ErrorCode::CustomerHasUnpaidOrders)
                .with_detail("customer_id", id)
                .with_detail("unpaid_orders", unpaid));
        }
        if !customer::delete(&mut *tx, id).await? {
            return Err(customer_not_found(id));
        }

        tx.commit().await.map_err(RepoError::from)?;
        Ok(existing)
    }

    /// Delete a product no unpaid order refers to
    pub async fn delete_product(&self, id: i64) -> AppResult<Product> {
        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let existing = product::find_by_id(&mut *tx, id)
            .await?
            .ok_or_else(|| product_not_found(id))?;
        if product::is_in_unpaid_order(&mut *tx, id).await? {
            return Err(AppError::new(ErrorCode::ProductInUse).with_detail("product_id", id));
        }
        if !product::delete(&mut *tx, id).await? {
            return Err(product_not_found(id));
        }

        tx.commit().await.map_err(RepoError::from)?;
        Ok(existing)
    }

    // ==================== Customer debt ====================

    /// Settle unpaid orders of a customer: all of them, or the listed ones
    ///
    /// Each settled order gets its own payment. The balance is recomputed
    /// once after all orders are marked paid.
    pub async fn pay_customer_debt(
        &self,
        customer_id: i64,
        data: DebtPayment,
        paid_by: i64,
    ) -> AppResult<DebtPaymentResult> {
        validate_optional_text(&data.note, "note", MAX_NOTE_LEN)?;
        let note = normalize_optional(data.note);

        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;

        let customer = customer::find_by_id(&mut *tx, customer_id)
            .await?
            .ok_or_else(|| customer_not_found(customer_id))?;

        let unpaid = order::find_unpaid_headers(&mut *tx, customer_id).await?;
        let targets = match &data.order_ids {
            None => unpaid,
            Some(ids) => select_orders(&mut tx, customer_id, unpaid, ids).await?,
        };
        if targets.is_empty() {
            return Err(AppError::with_message(
                ErrorCode::NothingToPay,
                format!("Customer {} has no unpaid orders", customer.name),
            ));
        }

        let total = sum_amounts(targets.iter().map(|o| o.total_amount));
        if let Some(amount) = data.amount {
            check_amount(amount, total)?;
        }

        let now = shared::util::now_millis();
        let mut payments = Vec::with_capacity(targets.len());
        for target in &targets {
            if !order::mark_paid(&mut *tx, target.id, now).await? {
                return Err(order_already_paid(target.id));
            }
            let recorded = self
                .record_payment(
                    &mut tx,
                    target,
                    data.method,
                    note.as_deref(),
                    paid_by,
                    format!("Debt payment from {}", customer.name),
                )
                .await?;
            payments.extend(recorded);
        }

        let remaining = recompute_customer_debt(&mut tx, customer_id).await?;

        tx.commit().await.map_err(RepoError::from)?;
        tracing::info!(
            customer_id,
            orders = targets.len(),
            amount = %total,
            remaining = %remaining,
            method = data.method.as_str(),
            "Customer debt paid"
        );

        Ok(DebtPaymentResult {
            customer_id,
            amount_paid: to_f64(total),
            remaining_debt: to_f64(remaining),
            payments,
        })
    }

    /// Recompute every customer balance in one transaction
    pub async fn recompute_all(&self) -> AppResult<RecalculateResult> {
        let _guard = self.lock().await;
        let mut tx = self.pool.begin().await.map_err(RepoError::from)?;
        let (checked, corrected) = balance::recompute_all(&mut tx).await?;
        tx.commit().await.map_err(RepoError::from)?;

        if corrected > 0 {
            tracing::warn!(checked, corrected, "Customer balances repaired");
        } else {
            tracing::info!(checked, "Customer balances consistent");
        }

        Ok(RecalculateResult {
            customers_checked: checked,
            customers_corrected: corrected,
        })
    }

    /// Order with items, read from the pool
    pub async fn load_order(&self, id: i64) -> AppResult<Order> {
        order::find_with_items(&self.pool, id)
            .await?
            .ok_or_else(|| order_not_found(id))
    }

    /// Append the payment for a just-settled order
    ///
    /// Zero-total orders settle without a payment row.
    async fn record_payment(
        &self,
        conn: &mut SqliteConnection,
        settled: &Order,
        method: PaymentMethod,
        note: Option<&str>,
        paid_by: i64,
        description: String,
    ) -> AppResult<Option<Payment>> {
        if settled.total_amount <= 0.0 {
            return Ok(None);
        }

        let payment = payment::insert(
            &mut *conn,
            NewPayment {
                customer_id: settled.customer_id,
                order_id: Some(settled.id),
                amount: settled.total_amount,
                method,
                note,
                created_by: paid_by,
            },
        )
        .await?;

        if method.is_cash() {
            self.record_cash_inflow(conn, &payment, &description).await?;
        }
        Ok(Some(payment))
    }

    /// Inflow into today's caixa, skipped when no caixa is open
    async fn record_cash_inflow(
        &self,
        conn: &mut SqliteConnection,
        payment: &Payment,
        description: &str,
    ) -> AppResult<()> {
        let date = business_date_string(self.timezone);
        match caixa::find_by_date(&mut *conn, &date).await? {
            Some(session) if !session.is_closed => {
                caixa::insert_transaction(
                    &mut *conn,
                    NewTransaction {
                        caixa_id: session.id,
                        kind: TransactionKind::Inflow,
                        amount: payment.amount,
                        description,
                        payment_id: Some(payment.id),
                        created_by: payment.created_by,
                    },
                )
                .await?;
            }
            _ => {
                tracing::debug!(payment_id = payment.id, date = %date, "No open caixa, cash inflow not recorded");
            }
        }
        Ok(())
    }
}

// ==================== Helpers ====================

fn order_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
        .with_detail("order_id", id)
}

fn order_already_paid(id: i64) -> AppError {
    AppError::new(ErrorCode::OrderAlreadyPaid).with_detail("order_id", id)
}

fn product_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        .with_detail("product_id", id)
}

fn customer_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
        .with_detail("customer_id", id)
}

async fn find_order(conn: &mut SqliteConnection, id: i64) -> AppResult<Order> {
    order::find_by_id(&mut *conn, id)
        .await?
        .ok_or_else(|| order_not_found(id))
}

async fn ensure_customer(conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
    customer::find_by_id(&mut *conn, id)
        .await?
        .map(|_| ())
        .ok_or_else(|| customer_not_found(id))
}

/// A sent amount must equal what is being settled (full settlement only)
fn check_amount(sent: f64, expected: Decimal) -> AppResult<()> {
    require_finite(sent, "amount")?;
    if !amounts_match(sent, expected) {
        return Err(AppError::with_message(
            ErrorCode::PaymentAmountMismatch,
            format!("amount {sent} does not match the amount due {expected}"),
        )
        .with_detail("expected", to_f64(expected))
        .with_detail("received", sent));
    }
    Ok(())
}

/// Resolve catalog prices and take stock for tracked products
async fn take_items(
    conn: &mut SqliteConnection,
    inputs: &[OrderItemInput],
) -> AppResult<Vec<NewOrderItem>> {
    if inputs.is_empty() {
        return Err(AppError::new(ErrorCode::OrderEmpty));
    }

    let mut items = Vec::with_capacity(inputs.len());
    for (index, input) in inputs.iter().enumerate() {
        validate_quantity(input.quantity, index)?;

        let product = product::find_by_id(&mut *conn, input.product_id)
            .await?
            .ok_or_else(|| product_not_found(input.product_id).with_detail("index", index))?;

        if product.stock_quantity.is_some()
            && !product::take_stock(&mut *conn, product.id, input.quantity).await?
        {
            let available = product::find_by_id(&mut *conn, product.id)
                .await?
                .and_then(|p| p.stock_quantity)
                .unwrap_or(0);
            return Err(AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!(
                    "Not enough stock for {}: requested {}, available {}",
                    product.name, input.quantity, available
                ),
            )
            .with_detail("product_id", product.id)
            .with_detail("requested", input.quantity)
            .with_detail("available", available));
        }

        items.push(NewOrderItem {
            product_id: product.id,
            product_name: product.name,
            quantity: input.quantity,
            price: product.price,
        });
    }
    Ok(items)
}

/// Return the quantities of an order's current items to stock
async fn restock_items(conn: &mut SqliteConnection, order_id: i64) -> AppResult<()> {
    for item in order::find_items(&mut *conn, order_id).await? {
        if let Some(product_id) = item.product_id {
            product::restock(&mut *conn, product_id, item.quantity).await?;
        }
    }
    Ok(())
}

/// Pick the listed orders out of the customer's unpaid set
async fn select_orders(
    conn: &mut SqliteConnection,
    customer_id: i64,
    mut unpaid: Vec<Order>,
    ids: &[i64],
) -> AppResult<Vec<Order>> {
    if ids.is_empty() {
        return Err(AppError::validation("order_ids must not be empty").with_detail("field", "order_ids"));
    }

    let mut selected: Vec<Order> = Vec::with_capacity(ids.len());
    for &id in ids {
        if selected.iter().any(|o| o.id == id) {
            continue;
        }
        if let Some(pos) = unpaid.iter().position(|o| o.id == id) {
            selected.push(unpaid.swap_remove(pos));
            continue;
        }
        // Not in the unpaid set: explain why
        let found = find_order(conn, id).await?;
        if found.customer_id != Some(customer_id) {
            return Err(AppError::validation(format!(
                "Order {id} does not belong to customer {customer_id}"
            ))
            .with_detail("order_id", id));
        }
        return Err(order_already_paid(id));
    }
    selected.sort_by_key(|o| (o.created_at, o.id));
    Ok(selected)
}
