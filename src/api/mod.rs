//! API route modules
//!
//! - [`health`] - liveness probe
//! - [`orders`] - order lifecycle and public tracking
//! - [`delivery`] - delivery route management

pub mod delivery;
pub mod health;
pub mod orders;

pub use crate::utils::{AppResponse, AppResult};
