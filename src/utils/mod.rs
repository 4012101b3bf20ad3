//! Shared utilities: error types, logging, validation helpers.

pub mod error;
pub mod logger;
pub mod validation;

pub use error::{AppError, AppResponse, AppResult};
