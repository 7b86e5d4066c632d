//! Authentication Handlers

use std::time::Duration;

use axum::{Extension, Json, extract::State};

use crate::api::extract::AppJson;
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::security_log;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::client::{LoginRequest, LoginResponse, UserInfo};

/// Fixed delay before answering a login, hides whether the user exists
const AUTH_FIXED_DELAY_MS: u64 = 300;

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    AppJson(req): AppJson<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let found = user::find_by_username(&state.pool, req.username.trim()).await?;

    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Same error for unknown user and wrong password
    let account = match found {
        Some(account) => {
            let valid = verify_password(&req.password, &account.password_hash).map_err(|e| {
                tracing::error!(user_id = account.id, error = %e, "Stored password hash is unreadable");
                AppError::internal("Password verification failed")
            })?;
            if !valid {
                security_log!("WARN", "login_failed", username = req.username.clone(), reason = "invalid_password");
                return Err(AppError::invalid_credentials());
            }
            account
        }
        None => {
            security_log!("WARN", "login_failed", username = req.username.clone(), reason = "user_not_found");
            return Err(AppError::invalid_credentials());
        }
    };

    if !account.is_active {
        security_log!("WARN", "login_disabled", user_id = account.id, username = account.username.clone());
        return Err(AppError::new(ErrorCode::AccountDisabled));
    }

    let jwt_service = state.get_jwt_service();
    let token = jwt_service
        .generate_token(account.id, &account.username, account.role)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    tracing::info!(
        user_id = account.id,
        username = %account.username,
        role = account.role.as_str(),
        "User logged in"
    );

    Ok(Json(LoginResponse {
        token,
        expires_in: jwt_service.expires_in_seconds(),
        user: UserInfo {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            role: account.role,
        },
    }))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserInfo>> {
    let account = user::find_by_id(&state.pool, current_user.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(AppError::unauthorized)?;

    Ok(Json(UserInfo {
        id: account.id,
        username: account.username,
        display_name: account.display_name,
        role: account.role,
    }))
}
