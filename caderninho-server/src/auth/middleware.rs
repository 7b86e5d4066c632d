//! Authentication middleware
//!
//! Every `/api/` route requires a bearer token except login and health.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// Routes reachable without a token
const PUBLIC_ROUTES: &[&str] = &["/api/auth/login", "/api/health"];

/// Validate the bearer token and insert [`CurrentUser`] into the request extensions
///
/// | Failure | Response |
/// |---------|----------|
/// | no Authorization header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | anything else | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // Non-API paths fall through to a normal 404
    if !path.starts_with("/api/") || PUBLIC_ROUTES.contains(&path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::unauthorized());
        }
    };

    let claims = match state.get_jwt_service().validate_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );
            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let user = CurrentUser::try_from(claims)
        .map_err(|e| AppError::invalid_token(format!("Malformed token claims: {}", e)))?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Admin-only route layer, runs after [`require_auth`]
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    user.ensure_admin()?;
    Ok(next.run(req).await)
}

/// Access the authenticated user from a request
pub trait CurrentUserExt {
    /// 401 when the request was not authenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::unauthorized)
    }
}

impl CurrentUser {
    /// 403 AdminRequired unless the caller is an admin
    pub fn ensure_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            return Ok(());
        }
        security_log!(
            "WARN",
            "admin_required",
            user_id = self.id,
            username = self.username.clone(),
            user_role = self.role.as_str()
        );
        Err(AppError::admin_required())
    }
}
