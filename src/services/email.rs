//! Order notification emails
//!
//! Fire-and-forget collaborator: rendering + delivery through an HTTP mail
//! relay. A send failure is logged and reported nowhere else — the order
//! that triggered it is already committed and stands.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use crate::core::Config;
use crate::db::models::Order;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Mail relay error: {0}")]
    Relay(String),
}

#[derive(Serialize)]
struct RelayMessage {
    from: String,
    to: String,
    subject: String,
    text: String,
}

pub struct EmailService {
    client: reqwest::Client,
    relay_url: Option<String>,
    from: String,
    front_end_url: String,
}

impl EmailService {
    pub fn from_config(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            relay_url: config.mail_relay_url.clone(),
            from: config.mail_from.clone(),
            front_end_url: config.front_end_url.clone(),
        }
    }

    /// Send the confirmation for `order` to `to`.
    pub async fn send_order_confirmation(&self, to: &str, order: &Order) -> Result<(), EmailError> {
        let Some(relay_url) = &self.relay_url else {
            tracing::debug!(to, "mail relay not configured, skipping order confirmation");
            return Ok(());
        };

        let order_id = order
            .id
            .as_ref()
            .map(|id| id.to_string())
            .unwrap_or_default();
        let message = RelayMessage {
            from: self.from.clone(),
            to: to.to_string(),
            subject: format!("Order Confirmation - Order #{order_id}"),
            text: self.render_confirmation(&order_id, order),
        };

        let response = self
            .client
            .post(relay_url)
            .json(&message)
            .send()
            .await
            .map_err(|e| EmailError::Relay(e.to_string()))?;

        if !response.status().is_success() {
            return Err(EmailError::Relay(format!(
                "relay returned {}",
                response.status()
            )));
        }
        Ok(())
    }

    /// Fire-and-forget variant used by the checkout paths.
    pub fn spawn_order_confirmation(self: &Arc<Self>, to: String, order: Order) {
        let mailer = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = mailer.send_order_confirmation(&to, &order).await {
                tracing::error!(to = %to, error = %e, "failed to send order confirmation");
            }
        });
    }

    fn render_confirmation(&self, order_id: &str, order: &Order) -> String {
        let items_list: String = order
            .order_items
            .iter()
            .map(|item| {
                format!(
                    "  - {} x {} - ${}\n",
                    item.name,
                    item.qty,
                    item.price * Decimal::from(item.qty)
                )
            })
            .collect();
        let subtotal = order.total_price - order.tax_price - order.shipping_price;
        let payment_method = order.payment_method.as_deref().unwrap_or("Pay on Delivery");

        format!(
            "Dear Customer,\n\n\
             Your order #{order_id} is pending. Here are the details:\n\n\
             Order Items:\n{items_list}\n\
             Subtotal: ${subtotal}\n\
             Tax: ${tax}\n\
             Shipping: ${shipping}\n\
             Total: ${total}\n\n\
             Payment Method: {payment_method}\n\n\
             Please go to {front_end}/guest-payment/{order_id} to pay for your order. \
             After that, we will process your order.\n\n\
             Thank you for shopping with us!\n",
            tax = order.tax_price,
            shipping = order.shipping_price,
            total = order.total_price,
            front_end = self.front_end_url,
        )
    }
}
