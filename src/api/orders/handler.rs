//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::models::{Order, OrderStatus, OrderOwner, ShippingAddress};
use crate::orders::{
    CheckoutPayload, DraftPayload, OrderEngine, PaymentInput, TrackedOrder, TrackingService,
};
use crate::orders::tracking::OrderWithOwner;
use crate::utils::{AppError, AppResult};

fn engine(state: &ServerState) -> OrderEngine {
    OrderEngine::with_mailer(state.db.clone(), state.mailer.clone())
}

/// Registered checkout
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CheckoutPayload>,
) -> AppResult<Json<Order>> {
    let owner = user.record_id()?;
    let order = engine(&state).create_registered(owner, payload).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct GuestCheckout {
    pub email: Option<String>,
    #[serde(flatten)]
    pub order: CheckoutPayload,
}

/// Guest checkout (public, requires a valid email)
pub async fn create_guest(
    State(state): State<ServerState>,
    Json(payload): Json<GuestCheckout>,
) -> AppResult<Json<Order>> {
    let order = engine(&state)
        .create_guest(payload.email, payload.order)
        .await?;
    Ok(Json(order))
}

/// Draft order (public, email optional, catalog-priced)
pub async fn create_draft(
    State(state): State<ServerState>,
    Json(payload): Json<DraftPayload>,
) -> AppResult<Json<Order>> {
    let order = engine(&state).create_draft(payload).await?;
    Ok(Json(order))
}

/// All orders, newest first (admin)
pub async fn list(State(state): State<ServerState>, user: CurrentUser) -> AppResult<Json<Vec<Order>>> {
    user.require_admin()?;
    let orders = engine(&state).list_all().await?;
    Ok(Json(orders))
}

/// The caller's own orders
pub async fn my_orders(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let owner = user.record_id()?;
    let orders = engine(&state).my_orders(&owner).await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    pub email: Option<String>,
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

/// Public tracking by email and/or order id, sanitized
pub async fn track(
    State(state): State<ServerState>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<Vec<TrackedOrder>>> {
    let service = TrackingService::new(state.db.clone());
    let orders = service
        .track(query.email.as_deref(), query.order_id.as_deref())
        .await?;
    Ok(Json(orders))
}

/// Full order with resolved owner (owner or admin)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<OrderWithOwner>> {
    let service = TrackingService::new(state.db.clone());
    let found = service.get_by_id(&id).await?;

    if !user.is_admin() {
        let is_owner = matches!(
            &found.order.owner,
            Some(OrderOwner::Registered { user: owner }) if owner.to_string() == user.id
        );
        if !is_owner {
            return Err(AppError::forbidden("Not authorized to view this order"));
        }
    }
    Ok(Json(found))
}

/// Record the payment receipt and mark the order paid
pub async fn pay(
    State(state): State<ServerState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(receipt): Json<PaymentInput>,
) -> AppResult<Json<Order>> {
    let order = engine(&state).mark_paid(&id, receipt).await?;
    Ok(Json(order))
}

/// Mark delivered (admin)
pub async fn deliver(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    user.require_admin()?;
    let order = engine(&state).mark_delivered(&id).await?;
    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct StatusPayload {
    pub status: OrderStatus,
}

/// Set order status through the state machine (admin)
pub async fn set_status(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(payload): Json<StatusPayload>,
) -> AppResult<Json<Order>> {
    user.require_admin()?;
    let order = engine(&state).set_status(&id, payload.status).await?;
    Ok(Json(order))
}

/// Cancel (owner or admin); restores stock when the order reserved any
pub async fn cancel(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Order>> {
    let order = engine(&state).cancel(&id, &user).await?;
    Ok(Json(order))
}

/// Update shipping address (public, blocked once paid — guest payment flow)
pub async fn update_shipping(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(address): Json<ShippingAddress>,
) -> AppResult<Json<Order>> {
    let order = engine(&state).update_shipping(&id, address).await?;
    Ok(Json(order))
}
