//! User/Driver Directory Model
//!
//! Identity and role only. Credentials and token issuance live outside this
//! service; the server merely validates bearer tokens minted against these
//! records.

use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// User role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Driver,
    Customer,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// Create user payload (seeding / admin tooling)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub role: Role,
}
