//! Customer API Handlers

use axum::{Extension, Json, extract::State};
use serde::Deserialize;

use crate::api::extract::{AppJson, AppPath, AppQuery};
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, customer, on_duplicate, order};
use crate::utils::types::{clamp_paging, default_limit};
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, normalize_optional, validate_email,
    validate_optional_text, validate_required_text,
};
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Customer, CustomerCreate, CustomerDetail, CustomerUpdate};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::CustomerNotFound, format!("Customer {id} not found"))
        .with_detail("customer_id", id)
}

fn name_taken(name: &str) -> (ErrorCode, String) {
    (
        ErrorCode::CustomerNameExists,
        format!("A customer named {name} already exists"),
    )
}

fn validate_contact(
    phone: &Option<String>,
    email: &Option<String>,
    address: &Option<String>,
) -> AppResult<()> {
    validate_optional_text(phone, "phone", MAX_SHORT_TEXT_LEN)?;
    validate_email(email)?;
    validate_optional_text(address, "address", MAX_ADDRESS_LEN)?;
    Ok(())
}

/// GET /api/customers
pub async fn list(
    State(state): State<ServerState>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<Customer>>> {
    let (limit, offset) = clamp_paging(query.limit, query.offset);
    let search = normalize_optional(query.search);
    let customers = customer::find_all(&state.pool, search.as_deref(), limit, offset).await?;
    Ok(Json(customers))
}

/// GET /api/customers/{id} - customer with unpaid orders
pub async fn get_by_id(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<CustomerDetail>> {
    let customer = customer::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    let unpaid_orders = order::find_unpaid_by_customer(&state.pool, id).await?;
    Ok(Json(CustomerDetail {
        customer,
        unpaid_orders,
    }))
}

/// POST /api/customers
pub async fn create(
    State(state): State<ServerState>,
    AppJson(payload): AppJson<CustomerCreate>,
) -> AppResult<Json<Customer>> {
    let name = payload.name.trim().to_string();
    validate_required_text(&name, "name", MAX_NAME_LEN)?;
    validate_contact(&payload.phone, &payload.email, &payload.address)?;

    let data = CustomerCreate {
        name: name.clone(),
        phone: normalize_optional(payload.phone),
        email: normalize_optional(payload.email),
        address: normalize_optional(payload.address),
    };
    let (code, message) = name_taken(&name);
    let created = customer::create(&state.pool, data)
        .await
        .map_err(on_duplicate(code, message))?;

    tracing::info!(customer_id = created.id, name = %created.name, "Customer created");
    Ok(Json(created))
}

/// PUT /api/customers/{id}
pub async fn update(
    State(state): State<ServerState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<CustomerUpdate>,
) -> AppResult<Json<Customer>> {
    let name = payload.name.map(|n| n.trim().to_string());
    if let Some(name) = &name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_contact(&payload.phone, &payload.email, &payload.address)?;

    let (code, message) = name_taken(name.as_deref().unwrap_or_default());
    let data = CustomerUpdate {
        name,
        phone: payload.phone.map(|v| v.trim().to_string()),
        email: payload.email.map(|v| v.trim().to_string()),
        address: payload.address.map(|v| v.trim().to_string()),
    };
    let updated = customer::update(&state.pool, id, data)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => on_duplicate(code, message)(other),
        })?;

    tracing::info!(customer_id = id, "Customer updated");
    Ok(Json(updated))
}

/// DELETE /api/customers/{id} (admin)
///
/// Rejected while the customer has unpaid orders; paid orders and payments
/// keep their history with the customer reference cleared.
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<ApiResponse<()>>> {
    current_user.ensure_admin()?;
    let existing = state.ledger.delete_customer(id).await?;

    tracing::info!(
        customer_id = id,
        name = %existing.name,
        deleted_by = current_user.id,
        "Customer deleted"
    );
    Ok(Json(ApiResponse::ok()))
}
