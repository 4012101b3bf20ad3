//! Database Module
//!
//! Embedded SurrealDB: RocksDb engine for the server binary, in-memory
//! engine for tests. Index DDL is issued at startup.

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "storefront";
const DATABASE: &str = "storefront";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the on-disk database at `db_path`.
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::init(db).await
    }

    /// Open a fresh in-memory database (tests).
    pub async fn memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::init(db).await
    }

    async fn init(db: Surreal<Db>) -> Result<Self, AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        // Lookup paths used by tracking and route assignment
        db.query(
            "DEFINE INDEX IF NOT EXISTS user_email ON TABLE user FIELDS email UNIQUE;
             DEFINE INDEX IF NOT EXISTS order_guest_email ON TABLE order FIELDS owner.guest.email;
             DEFINE INDEX IF NOT EXISTS order_owner_user ON TABLE order FIELDS owner.registered.user;
             DEFINE INDEX IF NOT EXISTS route_driver ON TABLE delivery_route FIELDS driver;",
        )
        .await
        .map_err(|e| AppError::database(format!("Failed to define indexes: {e}")))?;

        tracing::info!("Database ready (embedded SurrealDB)");
        Ok(Self { db })
    }
}
