//! Delivery route engine.

pub mod engine;

pub use engine::{AddStopPayload, RouteEngine, RouteError, StopStatusPayload};
