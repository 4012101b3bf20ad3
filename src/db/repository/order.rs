//! Order Repository
//!
//! Persistence for the order lifecycle engine. Field-targeted UPDATEs keep
//! line-item snapshots immutable after creation.

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderStatus, PaymentResult, ShippingAddress};
use chrono::{DateTime, Utc};
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;

pub const ORDER_TABLE: &str = "order";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn create(&self, order: Order) -> RepoResult<Order> {
        let created: Option<Order> = self.base.db().create(ORDER_TABLE).content(order).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create order".to_string()))
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Order>> {
        let Some(record_id) = parse_record_id(ORDER_TABLE, id) else {
            return Ok(None);
        };
        self.find_by_record_id(&record_id).await
    }

    pub async fn find_by_record_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order ORDER BY created_at DESC")
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_owner_user(&self, user: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE owner.registered.user = $user ORDER BY created_at DESC")
            .bind(("user", user.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn find_by_guest_email(&self, email: &str) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM order WHERE owner.guest.email = $email ORDER BY created_at DESC")
            .bind(("email", email.to_string()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    pub async fn set_shipping_address(
        &self,
        id: &RecordId,
        address: ShippingAddress,
    ) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET shipping_address = $address RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("address", address))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    pub async fn mark_paid(
        &self,
        id: &RecordId,
        result: PaymentResult,
        paid_at: DateTime<Utc>,
    ) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET is_paid = true, paid_at = $paid_at, payment_result = $result RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("paid_at", paid_at))
            .bind(("result", result))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    pub async fn set_status(&self, id: &RecordId, status: OrderStatus) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", status))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    pub async fn mark_delivered(&self, id: &RecordId, at: DateTime<Utc>) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET is_delivered = true, delivered_at = $at, status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("at", at))
            .bind(("status", OrderStatus::Delivered))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    /// Cancel and clear the reservation flag in one write.
    pub async fn cancel(&self, id: &RecordId) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET status = $status, stock_reserved = false RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("status", OrderStatus::Cancelled))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    /// Attach the order to a route and mark it shipped.
    pub async fn assign_route(&self, id: &RecordId, route: &RecordId) -> RepoResult<Order> {
        let updated: Vec<Order> = self
            .base
            .db()
            .query("UPDATE $id SET delivery_route = $route, status = $status RETURN AFTER")
            .bind(("id", id.clone()))
            .bind(("route", route.clone()))
            .bind(("status", OrderStatus::Shipped))
            .await?
            .take(0)?;
        Self::first_or_not_found(updated, id)
    }

    /// Remove an order record outright. Only used to unwind a checkout whose
    /// stock reservation failed partway; committed orders are never deleted.
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        let _: Option<Order> = self.base.db().delete(id.clone()).await?;
        Ok(())
    }

    /// Drop the route back-reference (route deletion cleanup).
    pub async fn clear_route(&self, id: &RecordId) -> RepoResult<()> {
        self.base
            .db()
            .query("UPDATE $id SET delivery_route = NONE")
            .bind(("id", id.clone()))
            .await?
            .check()?;
        Ok(())
    }

    fn first_or_not_found(orders: Vec<Order>, id: &RecordId) -> RepoResult<Order> {
        orders
            .into_iter()
            .next()
            .ok_or_else(|| RepoError::NotFound(format!("Order {id} not found")))
    }
}
