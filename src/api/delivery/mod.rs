//! Delivery API Module
//!
//! Route CRUD, stop management and route lifecycle transitions.

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/delivery", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/routes", post(handler::create).get(handler::list))
        .route(
            "/routes/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/routes/{id}/add-order", put(handler::add_order))
        .route("/routes/{id}/stops/{stop_id}", put(handler::update_stop))
        .route("/routes/{id}/start", put(handler::start))
        .route("/routes/{id}/complete", put(handler::complete))
        .route("/routes/{id}/cancel", put(handler::cancel))
        .route("/driver-routes", get(handler::driver_routes))
}
