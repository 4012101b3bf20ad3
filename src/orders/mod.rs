//! Order lifecycle engine and public tracking service.
//!
//! [`engine::OrderEngine`] owns every order mutation and the stock
//! decrement/restock side effects; [`tracking`] is the read-only public
//! lookup path with mandatory response sanitization.

pub mod engine;
pub mod tracking;

pub use engine::{CheckoutPayload, DraftPayload, OrderEngine, OrderError, PaymentInput};
pub use tracking::{TrackedOrder, TrackingError, TrackingService};
