//! Shared server state
//!
//! [`ServerState`] holds the handles every handler needs: configuration,
//! the embedded database, the JWT validator and the mail notifier. It is
//! `Clone` (all members are cheap shared handles) and doubles as the axum
//! router state.

use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::services::EmailService;
use crate::utils::AppError;

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: Surreal<Db>,
    pub jwt: Arc<JwtService>,
    pub mailer: Arc<EmailService>,
}

impl ServerState {
    /// Initialize state for the server binary: ensures the work directory
    /// exists and opens the on-disk database.
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;
        }

        let db_service = DbService::new(&db_path.to_string_lossy()).await?;
        Ok(Self::with_db(config.clone(), db_service.db))
    }

    /// Build state around an existing database handle (tests use the
    /// in-memory engine here).
    pub fn with_db(config: Config, db: Surreal<Db>) -> Self {
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));
        let mailer = Arc::new(EmailService::from_config(&config));
        Self {
            config,
            db,
            jwt,
            mailer,
        }
    }
}
