//! Order Lifecycle Engine
//!
//! Creates, validates and transitions orders, and owns the stock
//! decrement/restock side effects. Checkout is all-or-nothing: stock is
//! reserved per item with a conditional decrement, and a failure partway
//! restores the items already taken and unwinds the order record.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use surrealdb::{RecordId, Surreal};
use surrealdb::engine::local::Db;
use thiserror::Error;

use crate::auth::CurrentUser;
use crate::db::models::{
    Order, OrderItem, OrderItemInput, OrderOwner, OrderStatus, PaymentResult, ShippingAddress,
};
use crate::db::repository::{OrderRepository, ProductRepository, RepoError};
use crate::services::EmailService;
use crate::utils::AppError;
use crate::utils::validation::is_valid_email;

/// Tax applied to draft orders, as a fraction of the item subtotal.
const DRAFT_TAX_RATE_PERCENT: i64 = 15;
/// Flat shipping fee below the free-shipping threshold.
const FLAT_SHIPPING_FEE: i64 = 10;

#[derive(Debug, Error)]
pub enum OrderError {
    #[error("No order items")]
    EmptyOrder,

    #[error("Invalid quantity for {0}")]
    InvalidQuantity(String),

    #[error("Product not found: {0}")]
    ProductNotFound(String),

    #[error("{0} is out of stock")]
    InsufficientStock(String),

    #[error("Valid email is required")]
    InvalidEmail,

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Cannot update shipping address for paid orders")]
    OrderAlreadyPaid,

    #[error("Cannot cancel delivered order")]
    AlreadyDelivered,

    #[error("Not authorized")]
    Unauthorized,

    #[error("Illegal status transition: {from:?} -> {to:?}")]
    InvalidStatusTransition { from: OrderStatus, to: OrderStatus },

    #[error(transparent)]
    Repo(#[from] RepoError),
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::EmptyOrder
            | OrderError::InvalidQuantity(_)
            | OrderError::InvalidEmail => AppError::validation(e.to_string()),
            OrderError::ProductNotFound(_) | OrderError::OrderNotFound(_) => {
                AppError::not_found(e.to_string())
            }
            OrderError::InsufficientStock(_)
            | OrderError::OrderAlreadyPaid
            | OrderError::AlreadyDelivered
            | OrderError::InvalidStatusTransition { .. } => AppError::business_rule(e.to_string()),
            OrderError::Unauthorized => AppError::forbidden("Not authorized"),
            OrderError::Repo(RepoError::NotFound(msg)) => AppError::not_found(msg),
            OrderError::Repo(err) => AppError::database(err.to_string()),
        }
    }
}

/// Checkout payload (registered and guest)
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutPayload {
    pub order_items: Vec<OrderItemInput>,
    pub shipping_address: ShippingAddress,
    pub payment_method: String,
    #[serde(default)]
    pub tax_price: Decimal,
    #[serde(default)]
    pub shipping_price: Decimal,
    pub total_price: Decimal,
}

/// Draft payload: items plus an optional contact email
#[derive(Debug, Clone, Deserialize)]
pub struct DraftPayload {
    pub order_items: Vec<OrderItemInput>,
    pub email: Option<String>,
}

/// Payment receipt as posted by the storefront after gateway approval
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentInput {
    pub id: String,
    pub status: String,
    pub update_time: String,
    pub email_address: String,
}

impl From<PaymentInput> for PaymentResult {
    fn from(p: PaymentInput) -> Self {
        Self {
            id: p.id,
            status: p.status,
            update_time: p.update_time,
            email_address: p.email_address,
        }
    }
}

pub struct OrderEngine {
    orders: OrderRepository,
    products: ProductRepository,
    mailer: Option<Arc<EmailService>>,
}

impl OrderEngine {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db),
            mailer: None,
        }
    }

    /// Engine with the confirmation-email collaborator attached.
    pub fn with_mailer(db: Surreal<Db>, mailer: Arc<EmailService>) -> Self {
        Self {
            mailer: Some(mailer),
            ..Self::new(db)
        }
    }

    // ── Creation ────────────────────────────────────────────────────

    /// Registered checkout: validates items and stock, persists with status
    /// `Processing`, then reserves stock.
    pub async fn create_registered(
        &self,
        owner: RecordId,
        payload: CheckoutPayload,
    ) -> Result<Order, OrderError> {
        self.checkout(OrderOwner::Registered { user: owner }, payload)
            .await
    }

    /// Guest checkout: same as registered, but attributed to a validated
    /// email and followed by a confirmation email.
    pub async fn create_guest(
        &self,
        email: Option<String>,
        payload: CheckoutPayload,
    ) -> Result<Order, OrderError> {
        // Email gate comes first: no product lookups for an unattributable order
        let email = match email {
            Some(e) if is_valid_email(&e) => e,
            _ => return Err(OrderError::InvalidEmail),
        };

        let order = self
            .checkout(OrderOwner::Guest { email: email.clone() }, payload)
            .await?;

        if let Some(mailer) = &self.mailer {
            mailer.spawn_order_confirmation(email, order.clone());
        }
        Ok(order)
    }

    /// Draft order: prices are computed from the catalog, never taken from
    /// the client; stock is not touched.
    pub async fn create_draft(&self, payload: DraftPayload) -> Result<Order, OrderError> {
        if payload.order_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }
        if let Some(email) = &payload.email
            && !is_valid_email(email)
        {
            return Err(OrderError::InvalidEmail);
        }

        let mut items = Vec::with_capacity(payload.order_items.len());
        let mut items_price = Decimal::ZERO;
        for input in &payload.order_items {
            if input.qty < 1 {
                return Err(OrderError::InvalidQuantity(input.name.clone()));
            }
            let product = self
                .products
                .find_by_id(&input.product)
                .await?
                .ok_or_else(|| OrderError::ProductNotFound(input.product.clone()))?;
            let product_id = Self::product_id(&product)?;
            items_price += product.price * Decimal::from(input.qty);
            items.push(OrderItem {
                product: product_id,
                name: product.name,
                image: product.image,
                price: product.price,
                qty: input.qty,
            });
        }

        let tax_price = items_price * Decimal::new(DRAFT_TAX_RATE_PERCENT, 2);
        let shipping_price = if items_price > Decimal::ONE_HUNDRED {
            Decimal::ZERO
        } else {
            Decimal::from(FLAT_SHIPPING_FEE)
        };
        let total_price = items_price + tax_price + shipping_price;

        let order = self
            .orders
            .create(Order {
                id: None,
                owner: payload
                    .email
                    .clone()
                    .map(|email| OrderOwner::Guest { email }),
                order_items: items,
                shipping_address: None,
                payment_method: None,
                payment_result: None,
                tax_price,
                shipping_price,
                total_price,
                is_paid: false,
                paid_at: None,
                is_delivered: false,
                delivered_at: None,
                delivery_route: None,
                stock_reserved: false,
                status: OrderStatus::Draft,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(order_id = ?order.id, total = %order.total_price, "draft order created");

        if let (Some(mailer), Some(email)) = (&self.mailer, payload.email) {
            mailer.spawn_order_confirmation(email, order.clone());
        }
        Ok(order)
    }

    async fn checkout(
        &self,
        owner: OrderOwner,
        payload: CheckoutPayload,
    ) -> Result<Order, OrderError> {
        if payload.order_items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        // Pre-validation: resolve every product and fail fast before any write
        let mut items = Vec::with_capacity(payload.order_items.len());
        for input in &payload.order_items {
            if input.qty < 1 {
                return Err(OrderError::InvalidQuantity(input.name.clone()));
            }
            let product = self
                .products
                .find_by_id(&input.product)
                .await?
                .ok_or_else(|| OrderError::ProductNotFound(input.product.clone()))?;
            if product.count_in_stock < input.qty {
                return Err(OrderError::InsufficientStock(product.name));
            }
            items.push(OrderItem {
                product: Self::product_id(&product)?,
                name: input.name.clone(),
                image: input.image.clone(),
                price: input.price,
                qty: input.qty,
            });
        }

        let order = self
            .orders
            .create(Order {
                id: None,
                owner: Some(owner),
                order_items: items,
                shipping_address: Some(payload.shipping_address),
                payment_method: Some(payload.payment_method),
                payment_result: None,
                tax_price: payload.tax_price,
                shipping_price: payload.shipping_price,
                total_price: payload.total_price,
                is_paid: false,
                paid_at: None,
                is_delivered: false,
                delivered_at: None,
                delivery_route: None,
                stock_reserved: true,
                status: OrderStatus::Processing,
                created_at: Utc::now(),
            })
            .await?;

        self.reserve_stock(order).await
    }

    /// Decrement stock per line item. The conditional update is the race
    /// guard; on a mid-loop failure every decrement so far is restored and
    /// the order record is unwound, so the operation is all-or-nothing.
    async fn reserve_stock(&self, order: Order) -> Result<Order, OrderError> {
        for (idx, item) in order.order_items.iter().enumerate() {
            let reserved = self.products.try_decrement_stock(&item.product, item.qty).await?;
            if !reserved {
                for done in &order.order_items[..idx] {
                    self.products.restock(&done.product, done.qty).await?;
                }
                if let Some(id) = &order.id {
                    self.orders.delete(id).await?;
                }
                tracing::warn!(product = %item.product, qty = item.qty, "checkout lost stock race, unwound");
                return Err(OrderError::InsufficientStock(item.name.clone()));
            }
        }
        tracing::info!(order_id = ?order.id, items = order.order_items.len(), "order created, stock reserved");
        Ok(order)
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Overwrite the shipping address. Immutable once paid.
    pub async fn update_shipping(
        &self,
        order_id: &str,
        address: ShippingAddress,
    ) -> Result<Order, OrderError> {
        let order = self.require(order_id).await?;
        if order.is_paid {
            return Err(OrderError::OrderAlreadyPaid);
        }
        let id = Self::order_id(&order)?;
        Ok(self.orders.set_shipping_address(&id, address).await?)
    }

    /// Store the gateway receipt verbatim and flag the order paid.
    pub async fn mark_paid(
        &self,
        order_id: &str,
        receipt: PaymentInput,
    ) -> Result<Order, OrderError> {
        let order = self.require(order_id).await?;
        let id = Self::order_id(&order)?;
        let updated = self.orders.mark_paid(&id, receipt.into(), Utc::now()).await?;
        tracing::info!(order_id = %id, "order marked paid");
        Ok(updated)
    }

    /// Deliver directly (admin path). Valid only from `Shipped`.
    pub async fn mark_delivered(&self, order_id: &str) -> Result<Order, OrderError> {
        let order = self.require(order_id).await?;
        if !order.status.can_transition(OrderStatus::Delivered) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to: OrderStatus::Delivered,
            });
        }
        let id = Self::order_id(&order)?;
        Ok(self.orders.mark_delivered(&id, Utc::now()).await?)
    }

    /// Admin status update, validated against the state machine. Setting the
    /// current status again is a no-op; `Delivered` keeps the boolean/date
    /// representation in sync.
    pub async fn set_status(
        &self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<Order, OrderError> {
        let order = self.require(order_id).await?;
        if order.status == new_status {
            return Ok(order);
        }
        if !order.status.can_transition(new_status) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to: new_status,
            });
        }
        let id = Self::order_id(&order)?;
        let updated = if new_status == OrderStatus::Delivered {
            self.orders.mark_delivered(&id, Utc::now()).await?
        } else {
            self.orders.set_status(&id, new_status).await?
        };
        tracing::info!(order_id = %id, status = ?new_status, "order status updated");
        Ok(updated)
    }

    /// Cancel an order (owner or admin) and restore stock for every line
    /// item — but only when this order actually reserved stock at creation
    /// (drafts never did).
    pub async fn cancel(
        &self,
        order_id: &str,
        requester: &CurrentUser,
    ) -> Result<Order, OrderError> {
        let order = self.require(order_id).await?;

        let is_owner = order
            .owner
            .as_ref()
            .and_then(OrderOwner::user)
            .is_some_and(|u| u.to_string() == requester.id);
        if !requester.is_admin() && !is_owner {
            return Err(OrderError::Unauthorized);
        }

        if order.is_delivered {
            return Err(OrderError::AlreadyDelivered);
        }
        if !order.status.can_transition(OrderStatus::Cancelled) {
            return Err(OrderError::InvalidStatusTransition {
                from: order.status,
                to: OrderStatus::Cancelled,
            });
        }

        if order.stock_reserved {
            for item in &order.order_items {
                self.products.restock(&item.product, item.qty).await?;
            }
        }

        let id = Self::order_id(&order)?;
        let cancelled = self.orders.cancel(&id).await?;
        tracing::info!(order_id = %id, restocked = order.stock_reserved, "order cancelled");
        Ok(cancelled)
    }

    // ── Reads ───────────────────────────────────────────────────────

    pub async fn find(&self, order_id: &str) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.find_by_id(order_id).await?)
    }

    pub async fn my_orders(&self, user: &RecordId) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_by_owner_user(user).await?)
    }

    pub async fn list_all(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.find_all().await?)
    }

    // ── Helpers ─────────────────────────────────────────────────────

    async fn require(&self, order_id: &str) -> Result<Order, OrderError> {
        self.orders
            .find_by_id(order_id)
            .await?
            .ok_or_else(|| OrderError::OrderNotFound(order_id.to_string()))
    }

    fn order_id(order: &Order) -> Result<RecordId, OrderError> {
        order
            .id
            .clone()
            .ok_or_else(|| OrderError::Repo(RepoError::Database("order record has no id".into())))
    }

    fn product_id(product: &crate::db::models::Product) -> Result<RecordId, OrderError> {
        product
            .id
            .clone()
            .ok_or_else(|| OrderError::Repo(RepoError::Database("product record has no id".into())))
    }
}
