//! Order Model
//!
//! One purchase transaction, registered or anonymous. Line items are
//! snapshots taken at creation time; catalog price changes never affect an
//! existing order.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

/// Order lifecycle status.
///
/// Transitions are validated by [`OrderStatus::can_transition`]; `Delivered`
/// and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum OrderStatus {
    Draft,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Whether a direct transition `self -> to` is legal.
    pub fn can_transition(self, to: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, to),
            (Draft, Processing)
                | (Draft, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
                | (Shipped, Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Who an order is attributable to.
///
/// Exactly one of a registered user or a guest email. `Order.owner` is
/// `None` only for drafts created without an email; both checkout
/// constructors require an owner.
///
/// Externally tagged on purpose: the embedded store persists this as
/// `{ registered: { user } }` / `{ guest: { email } }`, which the owner
/// queries address as `owner.registered.user` and `owner.guest.email`.
/// (SurrealDB's serializer cannot store internally tagged enum variants.)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum OrderOwner {
    Registered { user: RecordId },
    Guest { email: String },
}

impl OrderOwner {
    pub fn guest_email(&self) -> Option<&str> {
        match self {
            OrderOwner::Guest { email } => Some(email),
            OrderOwner::Registered { .. } => None,
        }
    }

    pub fn user(&self) -> Option<&RecordId> {
        match self {
            OrderOwner::Registered { user } => Some(user),
            OrderOwner::Guest { .. } => None,
        }
    }
}

/// Line item snapshot (immutable after creation)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderItem {
    pub product: RecordId,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: i64,
}

/// Shipping address
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// Payment receipt from the external gateway, stored verbatim
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PaymentResult {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Option<RecordId>,
    pub owner: Option<OrderOwner>,
    pub order_items: Vec<OrderItem>,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: Option<String>,
    pub payment_result: Option<PaymentResult>,
    pub tax_price: Decimal,
    pub shipping_price: Decimal,
    pub total_price: Decimal,
    pub is_paid: bool,
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivery_route: Option<RecordId>,
    /// True iff creation decremented stock; cancellation restocks only then.
    pub stock_reserved: bool,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Sum of line totals (derivable, not persisted separately).
    pub fn items_price(&self) -> Decimal {
        self.order_items
            .iter()
            .map(|i| i.price * Decimal::from(i.qty))
            .sum()
    }
}

/// Line item as submitted by the storefront cart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemInput {
    pub product: String,
    pub name: String,
    pub image: String,
    pub price: Decimal,
    pub qty: i64,
}
