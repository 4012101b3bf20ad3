//! Delivery Route Repository

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{DeliveryRoute, RouteStatus, RouteStop, RouteUpdate};
use chrono::{DateTime, Utc};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

pub const ROUTE_TABLE: &str = "delivery_route";

#[derive(Clone)]
pub struct DeliveryRouteRepository {
    base: BaseRepository,
}

impl DeliveryRouteRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, route: DeliveryRoute) -> RepoResult<DeliveryRoute> {
        let created: Option<DeliveryRoute> =
            self.base.db().create(ROUTE_TABLE).content(route).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create delivery route".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<DeliveryRoute>> {
        let Some(record_id) = parse_record_id(ROUTE_TABLE, id) else {
            return Ok(None);
        };
        let route: Option<DeliveryRoute> = self.base.db().select(record_id).await?;
        Ok(route)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<DeliveryRoute>> {
        let routes: Vec<DeliveryRoute> = self
            .base
            .db()
            .query("SELECT * FROM delivery_route ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(routes)
    }

    pub async fn find_by_driver(&self, driver: &RecordId) -> RepoResult<Vec<DeliveryRoute>> {
        let routes: Vec<DeliveryRoute> = self
            .base
            .db()
            .query("SELECT * FROM delivery_route WHERE driver = $driver ORDER BY created_at DESC")
            .bind(("driver", driver.clone()))
            .await?
            .take(0)?;
        Ok(routes)
    }

    /// Replace the stop list wholesale (stops are embedded objects).
    pub async fn save_stops(&self, id: &RecordId, stops: Vec<RouteStop>) -> RepoResult<DeliveryRoute> {
        let updated: Vec<DeliveryRoute> = self
            .base
            .db()
            .query("UPDATE $id SET stops = $stops RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("stops", stops))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    pub async fn set_status(
        &self,
        id: &RecordId,
        status: RouteStatus,
        start_time: Option<DateTime<Utc>>,
        end_time: Option<DateTime<Utc>>,
    ) -> RepoResult<DeliveryRoute> {
        let mut set_parts = vec!["status = $status"];
        if start_time.is_some() {
            set_parts.push("start_time = $start_time");
        }
        if end_time.is_some() {
            set_parts.push("end_time = $end_time");
        }
        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));

        let mut query = self
            .base
            .db()
            .query(query_str)
            .bind(("id", id.clone()))
            .bind(("status", status));
        if let Some(t) = start_time {
            query = query.bind(("start_time", t));
        }
        if let Some(t) = end_time {
            query = query.bind(("end_time", t));
        }

        let updated: Vec<DeliveryRoute> = query.await?.take(0)?;
        Self::first_or_not_found(updated, id)
    }

    /// Partial field update from the admin dashboard.
    pub async fn update(&self, id: &RecordId, data: RouteUpdate) -> RepoResult<DeliveryRoute> {
        let mut set_parts: Vec<&str> = Vec::new();
        if data.name.is_some() {
            set_parts.push("name = $name");
        }
        if data.driver.is_some() {
            set_parts.push("driver = $driver");
        }
        if data.vehicle.is_some() {
            set_parts.push("vehicle = $vehicle");
        }
        if data.start_location.is_some() {
            set_parts.push("start_location = $start_location");
        }
        if data.status.is_some() {
            set_parts.push("status = $status");
        }
        if data.total_distance.is_some() {
            set_parts.push("total_distance = $total_distance");
        }

        if set_parts.is_empty() {
            let existing: Option<DeliveryRoute> = self.base.db().select(id.clone()).await?;
            return existing
                .ok_or_else(|| RepoError::NotFound(format!("Delivery route {id} not found")));
        }

        let driver = match data.driver.as_deref() {
            Some(d) => Some(
                parse_record_id("user", d)
                    .ok_or_else(|| RepoError::Validation(format!("Invalid driver id: {d}")))?,
            ),
            None => None,
        };

        let query_str = format!("UPDATE $id SET {} RETURN AFTER", set_parts.join(", "));
        let mut query = self.base.db().query(query_str).bind(("id", id.clone()));
        if let Some(v) = data.name {
            query = query.bind(("name", v));
        }
        if let Some(v) = driver {
            query = query.bind(("driver", v));
        }
        if let Some(v) = data.vehicle {
            query = query.bind(("vehicle", v));
        }
        if let Some(v) = data.start_location {
            query = query.bind(("start_location", v));
        }
        if let Some(v) = data.status {
            query = query.bind(("status", v));
        }
        if let Some(v) = data.total_distance {
            query = query.bind(("total_distance", v));
        }

        let updated: Vec<DeliveryRoute> = query.await?.take(0)?;
        Self::first_or_not_found(updated, id)
    }

    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let deleted: Option<DeliveryRoute> = self.base.db().delete(id.clone()).await?;
        if deleted.is_none() {
            return Err(RepoError::NotFound(format!("Delivery route {id} not found")));
        }
        Ok(())
    }

    fn first_or_not_found(routes: Vec<DeliveryRoute>, id: &RecordId) -> RepoResult<DeliveryRoute> {
        routes
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Delivery route {id} not found")))
    }
}
