//! Server configuration
//!
//! Every setting can be overridden through environment variables:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | WORK_DIR | /var/lib/storefront | Work directory (database lives under it) |
//! | HTTP_PORT | 5000 | HTTP API port |
//! | JWT_SECRET | storefront-dev-secret | HS256 signing secret |
//! | ENVIRONMENT | development | development \| staging \| production |
//! | MAIL_RELAY_URL | (unset) | HTTP mail relay; unset disables sending |
//! | MAIL_FROM | orders@storefront.local | From address on notifications |
//! | FRONT_END_URL | http://localhost:3000 | Base URL for payment links in emails |

use std::path::PathBuf;

use crate::auth::JwtConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub work_dir: String,
    pub http_port: u16,
    pub jwt: JwtConfig,
    pub environment: String,
    /// HTTP mail relay endpoint; `None` turns the notifier into a no-op.
    pub mail_relay_url: Option<String>,
    pub mail_from: String,
    pub front_end_url: String,
}

impl Config {
    /// Load from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/storefront".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            jwt: JwtConfig::default(),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            mail_relay_url: std::env::var("MAIL_RELAY_URL").ok(),
            mail_from: std::env::var("MAIL_FROM")
                .unwrap_or_else(|_| "orders@storefront.local".into()),
            front_end_url: std::env::var("FRONT_END_URL")
                .unwrap_or_else(|_| "http://localhost:3000".into()),
        }
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database").join("storefront.db")
    }
}
