//! JWT Service
//!
//! HS256 validation of bearer tokens minted by the external identity
//! service. `issue_token` exists for tests and operator tooling; there is no
//! login endpoint here.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::db::models::{Role, User};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid token: {0}")]
    InvalidToken(String),
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "storefront-dev-secret".into()),
            expiry_hours: 24,
        }
    }
}

/// Token claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User record id, e.g. `user:x3k9...`
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub exp: i64,
}

pub struct JwtService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// Mint a token for `user` (tests / tooling).
    pub fn issue_token(&self, user: &User) -> Result<String, JwtError> {
        let id = user
            .id
            .as_ref()
            .ok_or_else(|| JwtError::InvalidToken("User has no id".into()))?;
        let claims = Claims {
            sub: id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            exp: (Utc::now() + chrono::Duration::hours(self.config.expiry_hours)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::InvalidToken(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                _ => JwtError::InvalidToken(e.to_string()),
            })
    }

    /// Pull the token out of an `Authorization: Bearer <token>` header.
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ").map(str::trim)
    }
}
