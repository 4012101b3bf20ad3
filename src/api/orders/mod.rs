//! Order API Module
//!
//! Checkout (registered, guest, draft), payment, status administration,
//! cancellation and the public tracking endpoint.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/guest", post(handler::create_guest))
        .route("/draft", post(handler::create_draft))
        .route("/myorders", get(handler::my_orders))
        .route("/track", get(handler::track))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/pay", put(handler::pay))
        .route("/{id}/deliver", put(handler::deliver))
        .route("/{id}/status", put(handler::set_status))
        .route("/{id}/cancel", put(handler::cancel))
        .route("/{id}/shipping", put(handler::update_shipping))
}
