//! JWT Extractor
//!
//! Naming [`CurrentUser`] in a handler signature is what makes an endpoint
//! require authentication; public handlers simply leave it out.

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Reuse a previous extraction on the same request
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let auth_header = parts
            .headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let token = match auth_header {
            Some(header) => JwtService::extract_from_header(header)
                .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
            None => {
                tracing::warn!(uri = %parts.uri, "missing authorization header");
                return Err(AppError::unauthorized());
            }
        };

        match state.jwt.validate_token(token) {
            Ok(claims) => {
                let user = CurrentUser::from(claims);
                parts.extensions.insert(user.clone());
                Ok(user)
            }
            Err(e) => {
                tracing::warn!(uri = %parts.uri, error = %e, "token validation failed");
                match e {
                    JwtError::ExpiredToken => Err(AppError::token_expired()),
                    JwtError::InvalidToken(_) => Err(AppError::invalid_token("Invalid token")),
                }
            }
        }
    }
}
