//! Delivery Route Engine
//!
//! Groups orders into driver itineraries and keeps the order lifecycle in
//! sync with stop progress: routing an order ships it, completing its stop
//! delivers it, and completing the last pending stop closes the route.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::{
    DeliveryRoute, Order, OrderStatus, RouteCreate, RouteStatus, RouteStop, RouteUpdate,
    StopStatus,
};
use crate::db::repository::{
    DeliveryRouteRepository, OrderRepository, RepoError, parse_record_id,
};
use crate::orders::OrderError;
use crate::utils::AppError;

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Delivery route not found: {0}")]
    RouteNotFound(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Stop not found: {0}")]
    StopNotFound(String),

    #[error("Order is already assigned to a delivery route")]
    OrderAlreadyRouted,

    #[error("Delivery route is already finalized")]
    RouteFinalized,

    #[error("Order has no shipping address and no stop address was provided")]
    MissingAddress,

    #[error("Invalid driver id: {0}")]
    InvalidDriver(String),

    #[error("Illegal route status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition {
        from: RouteStatus,
        to: RouteStatus,
    },

    #[error(transparent)]
    Order(#[from] OrderError),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::RouteNotFound(_)
            | RouteError::OrderNotFound(_)
            | RouteError::StopNotFound(_) => AppError::not_found(e.to_string()),
            RouteError::OrderAlreadyRouted
            | RouteError::RouteFinalized
            | RouteError::MissingAddress
            | RouteError::InvalidStatusTransition { .. } => AppError::business_rule(e.to_string()),
            RouteError::InvalidDriver(_) => AppError::validation(e.to_string()),
            RouteError::Order(err) => err.into(),
            RouteError::Repo(RepoError::NotFound(msg)) => AppError::not_found(msg),
            RouteError::Repo(RepoError::Validation(msg)) => AppError::validation(msg),
            RouteError::Repo(err) => AppError::database(err.to_string()),
        }
    }
}

/// Add-order payload: the order plus an optional address override
#[derive(Debug, Clone, Deserialize)]
pub struct AddStopPayload {
    pub order: String,
    pub address: Option<String>,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StopStatusPayload {
    pub status: StopStatus,
}

pub struct RouteEngine {
    routes: DeliveryRouteRepository,
    orders: OrderRepository,
}

impl RouteEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            routes: DeliveryRouteRepository::new(db.clone()),
            orders: OrderRepository::new(db),
        }
    }

    // ── Creation ────────────────────────────────────────────────────

    /// Create a route in `Planning`. Initial stops go through the same
    /// assignment rules as [`RouteEngine::add_order`], so every referenced
    /// order is validated and shipped before the route exists.
    pub async fn create(&self, payload: RouteCreate) -> Result<DeliveryRoute, RouteError> {
        let driver = parse_record_id("user", &payload.driver)
            .ok_or_else(|| RouteError::InvalidDriver(payload.driver.clone()))?;

        let mut stops = Vec::with_capacity(payload.stops.len());
        let mut stop_orders = Vec::with_capacity(payload.stops.len());
        for input in &payload.stops {
            let order = self.assignable_order(&input.order).await?;
            let order_id = Self::order_id(&order)?;
            stops.push(RouteStop::new(
                order_id.clone(),
                input.address.clone(),
                input.estimated_arrival,
            ));
            stop_orders.push(order_id);
        }

        let route = self
            .routes
            .create(DeliveryRoute {
                id: None,
                name: payload.name,
                driver,
                vehicle: payload.vehicle,
                start_location: payload.start_location,
                stops,
                status: RouteStatus::Planning,
                start_time: None,
                end_time: None,
                total_distance: rust_decimal::Decimal::ZERO,
                created_at: Utc::now(),
            })
            .await?;

        let route_id = Self::route_id(&route)?;
        for order_id in &stop_orders {
            self.orders.assign_route(order_id, &route_id).await?;
        }
        tracing::info!(route_id = %route_id, stops = route.stops.len(), "delivery route created");
        Ok(route)
    }

    // ── Stop management ─────────────────────────────────────────────

    /// Append an order as a `Pending` stop. Routing an order ships it; the
    /// stop address defaults to the order's shipping address when not given.
    pub async fn add_order(
        &self,
        route_id: &str,
        payload: AddStopPayload,
    ) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        if route.status.is_terminal() {
            return Err(RouteError::RouteFinalized);
        }

        let order = self.assignable_order(&payload.order).await?;
        let address = match payload.address {
            Some(a) => a,
            None => order
                .shipping_address
                .as_ref()
                .map(|a| format!("{}, {}, {}, {}", a.address, a.city, a.postal_code, a.country))
                .ok_or(RouteError::MissingAddress)?,
        };

        let order_id = Self::order_id(&order)?;
        let rid = Self::route_id(&route)?;

        let mut stops = route.stops;
        stops.push(RouteStop::new(
            order_id.clone(),
            address,
            payload.estimated_arrival,
        ));
        let updated = self.routes.save_stops(&rid, stops).await?;
        self.orders.assign_route(&order_id, &rid).await?;

        tracing::info!(route_id = %rid, order_id = %order_id, "order added to delivery route");
        Ok(updated)
    }

    /// Update one stop's status. `Completed` cascades delivery onto the
    /// referenced order; when that leaves every stop `Completed` the route
    /// closes and `end_time` is stamped. A `Failed` stop does neither.
    pub async fn update_stop(
        &self,
        route_id: &str,
        stop_id: &str,
        new_status: StopStatus,
    ) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        let rid = Self::route_id(&route)?;

        let mut stops = route.stops;
        let stop = stops
            .iter_mut()
            .find(|s| s.id == stop_id)
            .ok_or_else(|| RouteError::StopNotFound(stop_id.to_string()))?;
        stop.status = new_status;
        let order_id = stop.order.clone();

        let mut updated = self.routes.save_stops(&rid, stops).await?;

        if new_status == StopStatus::Completed {
            self.orders.mark_delivered(&order_id, Utc::now()).await?;
            tracing::info!(route_id = %rid, order_id = %order_id, "stop completed, order delivered");

            let all_done = updated
                .stops
                .iter()
                .all(|s| s.status == StopStatus::Completed);
            if all_done && !updated.status.is_terminal() {
                updated = self
                    .routes
                    .set_status(&rid, RouteStatus::Completed, None, Some(Utc::now()))
                    .await?;
                tracing::info!(route_id = %rid, "all stops completed, route closed");
            }
        }
        Ok(updated)
    }

    // ── Route lifecycle ─────────────────────────────────────────────

    /// `Planning -> InProgress`, stamping `start_time`.
    pub async fn start(&self, route_id: &str) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        if route.status != RouteStatus::Planning {
            return Err(RouteError::InvalidStatusTransition {
                from: route.status,
                to: RouteStatus::InProgress,
            });
        }
        let rid = Self::route_id(&route)?;
        Ok(self
            .routes
            .set_status(&rid, RouteStatus::InProgress, Some(Utc::now()), None)
            .await?)
    }

    /// Close the route regardless of remaining stop states (admin override
    /// for mixed Completed/Failed itineraries).
    pub async fn complete(&self, route_id: &str) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        if route.status.is_terminal() {
            return Err(RouteError::InvalidStatusTransition {
                from: route.status,
                to: RouteStatus::Completed,
            });
        }
        let rid = Self::route_id(&route)?;
        Ok(self
            .routes
            .set_status(&rid, RouteStatus::Completed, None, Some(Utc::now()))
            .await?)
    }

    /// Cancel from any non-terminal state.
    pub async fn cancel(&self, route_id: &str) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        if route.status.is_terminal() {
            return Err(RouteError::InvalidStatusTransition {
                from: route.status,
                to: RouteStatus::Cancelled,
            });
        }
        let rid = Self::route_id(&route)?;
        Ok(self
            .routes
            .set_status(&rid, RouteStatus::Cancelled, None, Some(Utc::now()))
            .await?)
    }

    /// Partial field edit from the admin dashboard.
    pub async fn update(
        &self,
        route_id: &str,
        data: RouteUpdate,
    ) -> Result<DeliveryRoute, RouteError> {
        let route = self.require(route_id).await?;
        let rid = Self::route_id(&route)?;
        Ok(self.routes.update(&rid, data).await?)
    }

    /// Delete a route, first clearing the route back-reference on every
    /// stop's order so no order points at a dead route.
    pub async fn delete(&self, route_id: &str) -> Result<(), RouteError> {
        let route = self.require(route_id).await?;
        let rid = Self::route_id(&route)?;

        for stop in &route.stops {
            self.orders.clear_route(&stop.order).await?;
        }
        self.routes.delete(&rid).await?;
        tracing::info!(route_id = %rid, orders = route.stops.len(), "delivery route deleted");
        Ok(())
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn get(&self, route_id: &str) -> Result<DeliveryRoute, RouteError> {
        self.require(route_id).await
    }

    pub async fn list_all(&self) -> Result<Vec<DeliveryRoute>, RouteError> {
        Ok(self.routes.find_all().await?)
    }

    pub async fn driver_routes(&self, driver: &RecordId) -> Result<Vec<DeliveryRoute>, RouteError> {
        Ok(self.routes.find_by_driver(driver).await?)
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Resolve an order that may be attached to a route: it must exist, not
    /// already belong to a route, and be shippable (so drafts and terminal
    /// orders are rejected here). An order that is already `Shipped` with no
    /// route reference is accepted again — that is what a route deletion
    /// leaves behind.
    async fn assignable_order(&self, order_id: &str) -> Result<Order, RouteError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| RouteError::OrderNotFound(order_id.to_string()))?;
        if order.delivery_route.is_some() {
            return Err(RouteError::OrderAlreadyRouted);
        }
        if order.status != OrderStatus::Shipped
            && !order.status.can_transition(OrderStatus::Shipped)
        {
            return Err(RouteError::Order(OrderError::InvalidStatusTransition {
                from: order.status,
                to: OrderStatus::Shipped,
            }));
        }
        Ok(order)
    }

    async fn require(&self, route_id: &str) -> Result<DeliveryRoute, RouteError> {
        self.routes
            .find_by_id(route_id)
            .await?
            .ok_or_else(|| RouteError::RouteNotFound(route_id.to_string()))
    }

    fn route_id(route: &DeliveryRoute) -> Result<RecordId, RouteError> {
        route
            .id
            .clone()
            .ok_or_else(|| RouteError::Repo(RepoError::Database("route record has no id".into())))
    }

    fn order_id(order: &Order) -> Result<RecordId, RouteError> {
        order
            .id
            .clone()
            .ok_or_else(|| RouteError::Repo(RepoError::Database("order record has no id".into())))
    }
}
