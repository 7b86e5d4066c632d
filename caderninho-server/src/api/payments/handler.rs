//! Payment API Handlers

use axum::{Json, extract::State};
use serde::Deserialize;

use crate::api::extract::{AppPath, AppQuery};
use crate::core::ServerState;
use crate::db::repository::payment::{self, PaymentFilter};
use crate::utils::time::millis_range;
use crate::utils::types::{clamp_paging, default_limit};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::Payment;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub customer_id: Option<i64>,
    pub order_id: Option<i64>,
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

/// GET /api/payments - newest first
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Payment>>> {
    let (from, to) = millis_range(
        query.from.as_deref(),
        query.to.as_deref(),
        state.config.timezone,
    )?;
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let filter = PaymentFilter {
        customer_id: query.customer_id,
        order_id: query.order_id,
        from,
        to,
        limit,
        offset,
    };
    Ok(Json(payment::find_all(&state.pool, &filter).await?))
}

/// GET /api/payments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Payment>> {
    let payment = payment::find_by_id(&state.pool, id).await?.ok_or_else(|| {
        AppError::with_message(ErrorCode::PaymentNotFound, format!("Payment {id} not found"))
            .with_detail("payment_id", id)
    })?;
    Ok(Json(payment))
}
