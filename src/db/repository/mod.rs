//! Repository Module
//!
//! Per-entity CRUD over the embedded SurrealDB. Engines talk to these
//! repositories, never to the database handle directly, so the order and
//! delivery logic stays testable against the in-memory engine.

pub mod delivery_route;
pub mod order;
pub mod product;
pub mod user;

pub use delivery_route::DeliveryRouteRepository;
pub use order::OrderRepository;
pub use product::ProductRepository;
pub use user::UserRepository;

use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }
}

// =============================================================================
// ID Convention: "table:key" everywhere on the wire, bare keys accepted.
// =============================================================================

/// Parse an external id into a [`RecordId`] for `table`.
///
/// Accepts `"table:key"` or a bare key. Returns `None` when the key is empty
/// or contains characters outside `[A-Za-z0-9_]` — callers decide whether
/// that is a 404 or a format error.
pub fn parse_record_id(table: &str, id: &str) -> Option<RecordId> {
    let key = match id.split_once(':') {
        Some((t, k)) if t == table => k,
        Some(_) => return None,
        None => id,
    };
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return None;
    }
    Some(RecordId::from_table_key(table, key))
}
