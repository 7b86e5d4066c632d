use chrono_tz::Tz;

use crate::auth::JwtConfig;
use crate::core::ServerError;
use crate::utils::time::parse_timezone;

/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Notes |
/// |----------|---------|-------|
/// | DATABASE_PATH | caderninho.db | SQLite file, `:memory:` for ephemeral |
/// | HTTP_PORT | 3000 | |
/// | TIMEZONE | America/Sao_Paulo | business date for the cash register |
/// | ENVIRONMENT | development | development, staging or production |
/// | LOG_LEVEL | info | overridden by RUST_LOG |
/// | LOG_DIR | unset | daily rolling file when set |
/// | REQUEST_TIMEOUT_MS | 30000 | |
/// | JWT_SECRET | generated in development | at least 32 chars |
/// | JWT_EXPIRATION_MINUTES | 1440 | |
/// | ADMIN_USERNAME | admin | bootstrap admin when no user exists |
/// | ADMIN_PASSWORD | unset | required outside development |
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub http_port: u16,
    pub timezone: Tz,
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
    pub jwt: JwtConfig,
    pub admin_username: String,
    pub admin_password: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let timezone = parse_timezone(
            &std::env::var("TIMEZONE").unwrap_or_else(|_| "America/Sao_Paulo".into()),
        )
        .map_err(ServerError::Config)?;
        let jwt = JwtConfig::from_env(environment == "development")?;

        Ok(Self {
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "caderninho.db".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            timezone,
            environment,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            jwt,
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password: std::env::var("ADMIN_PASSWORD").ok().filter(|p| !p.is_empty()),
        })
    }

    /// In-memory database, fixed secret, known admin credentials
    pub fn for_tests() -> Self {
        Self {
            database_path: ":memory:".into(),
            http_port: 0,
            timezone: chrono_tz::America::Sao_Paulo,
            environment: "test".into(),
            log_level: "warn".into(),
            log_dir: None,
            request_timeout_ms: 30000,
            jwt: JwtConfig {
                secret: "test-secret-with-at-least-thirty-two-characters".into(),
                expiration_minutes: 60,
                issuer: "caderninho".into(),
                audience: "caderninho-clients".into(),
            },
            admin_username: "admin".into(),
            admin_password: Some("admin-password".into()),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
