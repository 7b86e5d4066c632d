//! Order API Handlers
//!
//! Writes go through the ledger so the customer balance is recomputed in
//! the same transaction.

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::order::{self, OrderFilter};
use crate::utils::time::millis_range;
use crate::utils::types::{clamp_paging, default_limit};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Order, OrderCreate, OrderPay, OrderPaymentResult, OrderUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: Option<i64>,
    pub is_paid: Option<bool>,
    /// `YYYY-MM-DD`, inclusive, business timezone
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/orders
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Order>>> {
    let (from, to) = millis_range(
        query.from.as_deref(),
        query.to.as_deref(),
        state.config.timezone,
    )?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = OrderFilter {
        customer_id: query.customer_id,
        is_paid: query.is_paid,
        from,
        to,
        limit,
        offset,
    };
    let orders = order::find_all(&state.pool, &filter).await?;
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Order>> {
    let order = order::find_with_items(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::OrderNotFound, format!("Order {id} not found"))
            .with_detail("order_id", id)
    })?;
    Ok(Json(order))
}

/// POST /api/orders
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppJson(payload): AppJson<OrderCreate>,
) -> AppResult<Json<Order>> {
    let order = state.ledger.create_order(payload, current_user.id).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id} - unpaid orders only
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<OrderUpdate>,
) -> AppResult<Json<Order>> {
    let order = state.ledger.update_order(id, payload).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{id}/pay
pub async fn pay(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<OrderPay>,
) -> AppResult<Json<OrderPaymentResult>> {
    let result = state.ledger.pay_order(id, payload, current_user.id).await?;
    Ok(Json(result))
}

/// DELETE /api/orders/{id} (admin) - unpaid orders only, stock is returned
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    current_user.ensure_admin()?;
    state.ledger.delete_order(id).await?;
    tracing::info!(order_id = id, deleted_by = current_user.id, "Order removed");
    Ok(Json(ApiResponse::ok()))
}
