//! Order Lookup / Tracking
//!
//! Read side of the order store. The authenticated path returns the full
//! order with its owner resolved; the public path resolves by email or
//! order id and always sanitizes the response: line items are reduced to
//! name/qty/price and the address to city/country, so product ids, street
//! addresses and payment details never leave the server unauthenticated.

use rust_decimal::Decimal;
use serde::Serialize;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::db::models::{Order, OrderOwner, OrderStatus};
use crate::db::repository::{OrderRepository, RepoError, UserRepository};
use crate::utils::AppError;
use crate::utils::validation::is_valid_email;

#[derive(Debug, Error)]
pub enum TrackingError {
    #[error("Please provide either an email or an order ID")]
    MissingQuery,

    #[error("Invalid order ID format")]
    InvalidOrderIdFormat,

    #[error("Invalid email format")]
    InvalidEmailFormat,

    #[error("No orders found")]
    NoOrdersFound,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<TrackingError> for AppError {
    fn from(e: TrackingError) -> Self {
        match e {
            TrackingError::MissingQuery
            | TrackingError::InvalidOrderIdFormat
            | TrackingError::InvalidEmailFormat => AppError::validation(e.to_string()),
            TrackingError::NoOrdersFound | TrackingError::OrderNotFound(_) => {
                AppError::not_found(e.to_string())
            }
            TrackingError::Repo(RepoError::NotFound(msg)) => AppError::not_found(msg),
            TrackingError::Repo(err) => AppError::database(err.to_string()),
        }
    }
}

/// Full order plus the resolved owner identity (authenticated responses)
#[derive(Debug, Serialize)]
pub struct OrderWithOwner {
    #[serde(flatten)]
    pub order: Order,
    pub owner_name: Option<String>,
    pub owner_email: Option<String>,
}

/// Sanitized line item for public tracking
#[derive(Debug, Serialize, PartialEq)]
pub struct TrackedItem {
    pub name: String,
    pub qty: i64,
    pub price: Decimal,
}

/// Sanitized address for public tracking
#[derive(Debug, Serialize, PartialEq)]
pub struct TrackedAddress {
    pub city: String,
    pub country: String,
}

/// Public tracking view of one order. Built only through
/// [`TrackedOrder::from`] so every public response goes through the same
/// field stripping.
#[derive(Debug, Serialize)]
pub struct TrackedOrder {
    pub id: String,
    pub status: OrderStatus,
    pub order_items: Vec<TrackedItem>,
    pub shipping_address: Option<TrackedAddress>,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Order> for TrackedOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order
                .id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            status: order.status,
            order_items: order
                .order_items
                .into_iter()
                .map(|i| TrackedItem {
                    name: i.name,
                    qty: i.qty,
                    price: i.price,
                })
                .collect(),
            shipping_address: order.shipping_address.map(|a| TrackedAddress {
                city: a.city,
                country: a.country,
            }),
            total_price: order.total_price,
            is_paid: order.is_paid,
            is_delivered: order.is_delivered,
            created_at: order.created_at,
        }
    }
}

pub struct TrackingService {
    orders: OrderRepository,
    users: UserRepository,
}

impl TrackingService {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            users: UserRepository::new(db),
        }
    }

    /// Authenticated lookup: full order with the owner's name/email resolved.
    pub async fn get_by_id(&self, order_id: &str) -> Result<OrderWithOwner, TrackingError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| TrackingError::OrderNotFound(order_id.to_string()))?;

        let (owner_name, owner_email) = match &order.owner {
            Some(OrderOwner::Registered { user }) => {
                match self.users.find_by_id(&user.to_string()).await? {
                    Some(u) => (Some(u.name), Some(u.email)),
                    None => (None, None),
                }
            }
            Some(OrderOwner::Guest { email }) => (None, Some(email.clone())),
            None => (None, None),
        };

        Ok(OrderWithOwner {
            order,
            owner_name,
            owner_email,
        })
    }

    /// Public lookup by email and/or order id, sanitized.
    ///
    /// An order id that does not parse is an error on its own, but a silent
    /// fallback when an email is also supplied. Email search unions guest
    /// orders with the registered account matching that email.
    pub async fn track(
        &self,
        email: Option<&str>,
        order_id: Option<&str>,
    ) -> Result<Vec<TrackedOrder>, TrackingError> {
        let email = email.map(str::trim).filter(|e| !e.is_empty());
        let order_id = order_id.map(str::trim).filter(|o| !o.is_empty());

        if email.is_none() && order_id.is_none() {
            return Err(TrackingError::MissingQuery);
        }

        let mut found: Vec<Order> = Vec::new();

        if let Some(oid) = order_id {
            match self.orders.find_by_id(oid).await? {
                Some(order) => found.push(order),
                None if Self::looks_like_order_id(oid) => {}
                None if email.is_some() => {} // malformed id, fall back to email
                None => return Err(TrackingError::InvalidOrderIdFormat),
            }
        }

        if found.is_empty()
            && let Some(email) = email
        {
            if !is_valid_email(email) {
                return Err(TrackingError::InvalidEmailFormat);
            }
            found.extend(self.orders.find_by_guest_email(email).await?);
            if let Some(user) = self.users.find_by_email(email).await?
                && let Some(user_id) = user.id
            {
                found.extend(self.orders.find_by_owner_user(&user_id).await?);
            }
        }

        if found.is_empty() {
            return Err(TrackingError::NoOrdersFound);
        }

        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found.into_iter().map(TrackedOrder::from).collect())
    }

    fn looks_like_order_id(raw: &str) -> bool {
        let key = raw.strip_prefix("order:").unwrap_or(raw);
        !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }
}
