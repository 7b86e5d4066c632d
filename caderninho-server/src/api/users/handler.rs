//! User Handlers

use axum::{Extension, Json, extract::State};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{on_duplicate, user};
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_password, validate_required_text};
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{User, UserCreate};

/// GET /api/users
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<User>>> {
    let users = user::find_all(&state.pool).await?;
    Ok(Json(users))
}

/// POST /api/users
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    AppJson(payload): AppJson<UserCreate>,
) -> AppResult<Json<User>> {
    let username = payload.username.trim().to_string();
    validate_required_text(&username, "username", MAX_SHORT_TEXT_LEN)?;
    validate_password(&payload.password)?;
    let display_name = payload
        .display_name
        .map(|d| d.trim().to_string())
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| username.clone());
    validate_required_text(&display_name, "display_name", MAX_NAME_LEN)?;

    let hash = hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(&state.pool, &username, &hash, &display_name, payload.role)
        .await
        .map_err(on_duplicate(
            ErrorCode::UsernameExists,
            format!("Username {username} is already taken"),
        ))?;

    tracing::info!(
        user_id = created.id,
        username = %created.username,
        role = created.role.as_str(),
        created_by = current_user.id,
        "User created"
    );
    Ok(Json(created))
}
