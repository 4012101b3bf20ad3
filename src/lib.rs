//! Storefront Server
//!
//! REST backend for the storefront and admin dashboard. The interesting part
//! lives in [`orders`] (order lifecycle + public tracking) and [`delivery`]
//! (route planning and per-stop delivery status); everything else is the
//! plumbing those engines sit on.

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod delivery;
pub mod orders;
pub mod services;
pub mod utils;

pub use crate::core::{Config, Server, ServerState};
pub use crate::utils::{AppError, AppResult};

/// Set up the process environment: .env file and logging.
///
/// Must be called once, before [`ServerState::initialize`].
pub fn setup_environment() {
    dotenv::dotenv().ok();
    utils::logger::init_logger(
        std::env::var("LOG_LEVEL").ok().as_deref(),
        std::env::var("LOG_DIR").ok().as_deref(),
    );
}
