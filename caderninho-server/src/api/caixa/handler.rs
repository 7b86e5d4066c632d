//! Cash register API Handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;
use crate::utils::types::clamp_paging;
use shared::models::{
    Caixa, CaixaClose, CaixaOpen, CaixaStatus, CaixaSummary, CaixaTransaction,
    CaixaTransactionCreate,
};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
}

fn default_history_limit() -> i64 {
    30
}

/// POST /api/caixa/open
pub async fn open(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CaixaOpen>,
) -> AppResult<Json<Caixa>> {
    Ok(Json(state.ledger.open_caixa(payload, current_user.id).await?))
}

/// POST /api/caixa/transaction
pub async fn add_transaction(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CaixaTransactionCreate>,
) -> AppResult<Json<CaixaTransaction>> {
    let transaction = state
        .ledger
        .add_caixa_transaction(payload, current_user.id)
        .await?;
    Ok(Json(transaction))
}

/// POST /api/caixa/close
pub async fn close(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppJson(payload): AppJson<CaixaClose>,
) -> AppResult<Json<CaixaSummary>> {
    Ok(Json(state.ledger.close_caixa(payload, current_user.id).await?))
}

/// GET /api/caixa/status
pub async fn status(State(state): State<ServerState>) -> AppResult<Json<CaixaStatus>> {
    Ok(Json(state.ledger.caixa_status().await?))
}

/// GET /api/caixa/history
pub async fn history(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<HistoryQuery>,
) -> AppResult<Json<Vec<CaixaSummary>>> {
    let (limit, _) = clamp_paging(query.limit, 0);
    let sessions = state
        .ledger
        .caixa_history(query.from.as_deref(), query.to.as_deref(), limit)
        .await?;
    Ok(Json(sessions))
}

/// GET /api/caixa/{date}
pub async fn by_date(
    State(state): State<ServerState>,
    AppPath(date): AppPath<String>,
) -> AppResult<Json<CaixaStatus>> {
    Ok(Json(state.ledger.caixa_by_date(&date).await?))
}
