use std::sync::Arc;

use sqlx::SqlitePool;

use crate::auth::JwtService;
use crate::auth::password::hash_password;
use crate::core::{Config, Result, ServerError};
use crate::db::DbService;
use crate::db::repository::user;
use crate::ledger::LedgerService;
use shared::models::UserRole;

/// Development-only fallback for the bootstrap admin
const DEV_ADMIN_PASSWORD: &str = "admin123";

/// Shared handles for every handler
///
/// | Field | Notes |
/// |-------|-------|
/// | config | immutable settings |
/// | pool | SQLite pool, used directly for reads |
/// | jwt_service | token issue and validation |
/// | ledger | serialised writes touching balances, stock and the caixa |
///
/// Cloning is cheap; every field is reference counted.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub ledger: LedgerService,
}

impl ServerState {
    /// Open the database, apply migrations and make sure an admin exists
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = DbService::new(&config.database_path).await?;
        let state = Self::with_db(config.clone(), db);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    /// Build state around an already opened database
    pub fn with_db(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let ledger = LedgerService::new(db.pool.clone(), config.timezone);
        Self {
            config,
            pool: db.pool,
            jwt_service,
            ledger,
        }
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }

    /// Create the first admin account when the user table is empty
    pub async fn bootstrap_admin(&self) -> Result<()> {
        if user::count(&self.pool).await? > 0 {
            return Ok(());
        }

        let password = match &self.config.admin_password {
            Some(p) => p.clone(),
            None if self.config.is_development() => {
                tracing::warn!(
                    username = %self.config.admin_username,
                    "ADMIN_PASSWORD not set, bootstrap admin uses the development default"
                );
                DEV_ADMIN_PASSWORD.to_string()
            }
            None => {
                return Err(ServerError::Config(
                    "ADMIN_PASSWORD must be set to create the first admin".into(),
                ));
            }
        };

        let hash = hash_password(&password)
            .map_err(|e| ServerError::Config(format!("Failed to hash admin password: {e}")))?;
        let admin = user::create(
            &self.pool,
            &self.config.admin_username,
            &hash,
            "Administrator",
            UserRole::Admin,
        )
        .await?;

        tracing::info!(user_id = admin.id, username = %admin.username, "Bootstrap admin created");
        Ok(())
    }
}
