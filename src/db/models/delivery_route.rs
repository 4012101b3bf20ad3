//! Delivery Route Model
//!
//! Groups orders into one driver's itinerary. Stops are embedded objects
//! with their own uuid so individual stops stay addressable through the API.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Route lifecycle status.
///
/// `Scheduled` is an alias some admin views still send; it maps to
/// `Planning` on deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RouteStatus {
    #[serde(alias = "Scheduled")]
    Planning,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
    Cancelled,
}

impl RouteStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, RouteStatus::Completed | RouteStatus::Cancelled)
    }
}

/// Per-stop delivery status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopStatus {
    Pending,
    Completed,
    Failed,
}

/// One stop on a route
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStop {
    pub id: String,
    pub order: RecordId,
    pub address: String,
    pub estimated_arrival: Option<DateTime<Utc>>,
    pub status: StopStatus,
}

impl RouteStop {
    pub fn new(order: RecordId, address: String, estimated_arrival: Option<DateTime<Utc>>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order,
            address,
            estimated_arrival,
            status: StopStatus::Pending,
        }
    }
}

/// Delivery route entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRoute {
    pub id: Option<RecordId>,
    pub name: String,
    pub driver: RecordId,
    pub vehicle: String,
    pub start_location: String,
    pub stops: Vec<RouteStop>,
    pub status: RouteStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    /// Advisory, supplied by the dashboard; not computed here.
    pub total_distance: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Initial stop as submitted at route creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteStopInput {
    pub order: String,
    pub address: String,
    pub estimated_arrival: Option<DateTime<Utc>>,
}

/// Create route payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteCreate {
    pub name: String,
    pub driver: String,
    pub vehicle: String,
    pub start_location: String,
    #[serde(default)]
    pub stops: Vec<RouteStopInput>,
}

/// Partial route update (admin dashboard edit)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteUpdate {
    pub name: Option<String>,
    pub driver: Option<String>,
    pub vehicle: Option<String>,
    pub start_location: Option<String>,
    pub status: Option<RouteStatus>,
    pub total_distance: Option<Decimal>,
}
