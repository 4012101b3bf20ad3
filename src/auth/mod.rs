//! Authentication
//!
//! JWT bearer validation only — token issuance is an external capability.
//! Protected handlers name [`CurrentUser`] in their signature; admin-only
//! handlers additionally call [`CurrentUser::require_admin`].

mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

use crate::db::models::Role;
use crate::utils::AppError;
use surrealdb::RecordId;

/// Authenticated caller, extracted from a validated JWT
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Full record id string, e.g. `user:x3k9...`
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if !self.is_admin() {
            tracing::warn!(user_id = %self.id, "admin-only endpoint denied");
            return Err(AppError::forbidden("Admin access required"));
        }
        Ok(())
    }

    /// The caller's user record id.
    pub fn record_id(&self) -> Result<RecordId, AppError> {
        crate::db::repository::parse_record_id("user", &self.id)
            .ok_or_else(|| AppError::invalid_token("Malformed subject in token"))
    }
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}
