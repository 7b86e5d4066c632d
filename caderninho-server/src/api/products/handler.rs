//! Product API Handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, on_duplicate, product};
use crate::ledger::money::validate_price;
use crate::utils::types::{clamp_paging, default_limit};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, normalize_optional, validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Product, ProductCreate, ProductUpdate, StockAdjustment};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ProductNotFound, format!("Product {id} not found"))
        .with_detail("product_id", id)
}

fn name_taken(name: &str) -> (ErrorCode, String) {
    (
        ErrorCode::ProductNameExists,
        format!("A product named {name} already exists"),
    )
}

fn validate_stock(stock: Option<i64>) -> AppResult<()> {
    if let Some(stock) = stock
        && stock < 0
    {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("stock_quantity must not be negative, got {stock}"),
        )
        .with_detail("field", "stock_quantity"));
    }
    Ok(())
}

/// GET /api/products
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Product>>> {
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let search = normalize_optional(query.search);
    let products = product::find_all(&state.pool, search.as_deref(), limit, offset).await?;
    Ok(Json(products))
}

/// GET /api/products/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Product>> {
    let product = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(product))
}

/// POST /api/products
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<ProductCreate>,
) -> AppResult<Json<Product>> {
    let name = payload.name.trim().to_string();
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_price(payload.price)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_stock(payload.stock_quantity)?;

    let data = ProductCreate {
        name: name.clone(),
        price: payload.price,
        description: normalize_optional(payload.description),
        stock_quantity: payload.stock_quantity,
    };
    let (code, message) = name_taken(&name);
    let created = product::create(&state.pool, data)
        .await
        .map_err(on_duplicate(code, message))?;

    tracing::info!(product_id = created.id, name = %created.name, price = created.price, "Product created");
    Ok(Json(created))
}

/// PUT /api/products/{id}
///
/// Price changes do not touch existing orders, which keep the unit price
/// captured when they were placed.
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<ProductUpdate>,
) -> AppResult<Json<Product>> {
    let name = payload.name.map(|n| n.trim().to_string());
    if let Some(name) = &name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(price) = payload.price {
        validate_price(price)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_stock(payload.stock_quantity)?;

    let (code, message) = name_taken(name.as_deref().unwrap_or_default());
    let data = ProductUpdate {
        name,
        price: payload.price,
        description: payload.description.map(|d| d.trim().to_string()),
        stock_quantity: payload.stock_quantity,
    };
    let updated = product::update(&state.pool, id, data)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => on_duplicate(code, message)(other),
        })?;

    tracing::info!(product_id = id, "Product updated");
    Ok(Json(updated))
}

/// DELETE /api/products/{id} (admin)
///
/// Rejected while an unpaid order lists the product; paid orders keep the
/// captured name and price.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    current_user.ensure_admin()?;
    let existing = state.ledger.delete_product(id).await?;

    tracing::info!(
        product_id = id,
        name = %existing.name,
        deleted_by = current_user.id,
        "Product deleted"
    );
    Ok(Json(ApiResponse::ok()))
}

/// POST /api/products/{id}/stock - signed delta, result must stay >= 0
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<StockAdjustment>,
) -> AppResult<Json<Product>> {
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    if payload.delta == 0 {
        return Err(AppError::validation("delta must not be zero").with_detail("field", "delta"));
    }

    let existing = product::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let Some(current) = existing.stock_quantity else {
        return Err(AppError::validation(format!(
            "Stock is not tracked for {}",
            existing.name
        ))
        .with_detail("product_id", id));
    };

    let updated = product::adjust_stock(&state.pool, id, payload.delta)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ProductOutOfStock,
                format!(
                    "Adjustment of {} would leave {} below zero",
                    payload.delta, existing.name
                ),
            )
            .with_detail("product_id", id)
            .with_detail("available", current)
        })?;

    tracing::info!(
        product_id = id,
        delta = payload.delta,
        stock = ?updated.stock_quantity,
        note = ?payload.note,
        adjusted_by = current_user.id,
        "Stock adjusted"
    );
    Ok(Json(updated))
}
