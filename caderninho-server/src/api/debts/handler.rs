//! Debt API Handlers

use axum::{Extension, Json, extract::State};

use crate::api::extract::{AppJson, AppPath};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{customer, debt, order};
use crate::ledger::money::{sum_amounts, to_f64};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{
    CustomerDebtDetail, DebtPayment, DebtPaymentResult, DebtSummary, RecalculateResult,
};

/// GET /api/debts/summary
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<DebtSummary>> {
    let customers = debt::find_debtors(&state.pool).await?;
    let total = sum_amounts(customers.iter().map(|c| c.total_debt));
    Ok(Json(DebtSummary {
        total_debt: to_f64(total),
        customer_count: customers.len(),
        customers,
    }))
}

/// GET /api/debts/customer/{id} - balance with the unpaid orders behind it
pub async fn customer_detail(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<CustomerDebtDetail>> {
    let customer = customer::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
            .with_detail("customer_id", id)
    })?;
    let orders = order::find_unpaid_by_customer(&state.pool, id).await?;
    Ok(Json(CustomerDebtDetail {
        customer_id: customer.id,
        customer_name: customer.name,
        total_debt: customer.debt,
        orders,
    }))
}

/// POST /api/debts/customer/{id}/pay
pub async fn pay(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<DebtPayment>,
) -> AppResult<Json<DebtPaymentResult>> {
    let result = state
        .ledger
        .pay_customer_debt(id, payload, current_user.id)
        .await?;
    Ok(Json(result))
}

/// POST /api/debts/recalculate (admin)
pub async fn recalculate(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<RecalculateResult>> {
    tracing::info!(requested_by = current_user.id, "Balance recalculation requested");
    Ok(Json(state.ledger.recompute_all().await?))
}
