//! Delivery API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{DeliveryRoute, RouteCreate, RouteUpdate};
use crate::delivery::{AddStopPayload, RouteEngine, StopStatusPayload};
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};

fn engine(state: &ServerState) -> RouteEngine {
    RouteEngine::new(state.db.clone())
}

/// Create a route in `Planning` (admin)
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<RouteCreate>,
) -> AppResult<Json<DeliveryRoute>> {
    user.require_admin()?;
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.vehicle, "vehicle", MAX_NAME_LEN)?;
    validate_required_text(&payload.start_location, "start_location", MAX_ADDRESS_LEN)?;
    let route = engine(&state).create(payload).await?;
    Ok(Json(route))
}

/// All routes, newest first (admin)
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<DeliveryRoute>>> {
    user.require_admin()?;
    let routes = engine(&state).list_all().await?;
    Ok(Json(routes))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryRoute>> {
    let route = engine(&state).get(&id).await?;
    Ok(Json(route))
}

/// Partial route edit (admin)
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<RouteUpdate>,
) -> AppResult<Json<DeliveryRoute>> {
    user.require_admin()?;
    let route = engine(&state).update(&id, payload).await?;
    Ok(Json(route))
}

/// Delete a route, detaching its orders first (admin)
pub async fn delete(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    user.require_admin()?;
    engine(&state).delete(&id).await?;
    Ok(Json(serde_json::json!({ "message": "Delivery route removed" })))
}

/// Append an order as a pending stop; ships the order (admin)
pub async fn add_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<AddStopPayload>,
) -> AppResult<Json<DeliveryRoute>> {
    user.require_admin()?;
    validate_optional_text(&payload.address, "address", MAX_ADDRESS_LEN)?;
    let route = engine(&state).add_order(&id, payload).await?;
    Ok(Json(route))
}

/// Driver stop progress update; `Completed` cascades order delivery
pub async fn update_stop(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path((id, stop_id)): Path<(String, String)>,
    Json(payload): Json<StopStatusPayload>,
) -> AppResult<Json<DeliveryRoute>> {
    let route = engine(&state).update_stop(&id, &stop_id, payload.status).await?;
    Ok(Json(route))
}

pub async fn start(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryRoute>> {
    let route = engine(&state).start(&id).await?;
    Ok(Json(route))
}

pub async fn complete(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryRoute>> {
    let route = engine(&state).complete(&id).await?;
    Ok(Json(route))
}

/// Cancel from any non-terminal state (admin)
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<DeliveryRoute>> {
    user.require_admin()?;
    let route = engine(&state).cancel(&id).await?;
    Ok(Json(route))
}

/// The calling driver's own routes
pub async fn driver_routes(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<DeliveryRoute>>> {
    let driver = user.record_id()?;
    let routes = engine(&state).driver_routes(&driver).await?;
    Ok(Json(routes))
}
