//! Order-confirmation notification worker.
//!
//! Delivery is best-effort by contract: placement enqueues a payload and
//! moves on. A background worker drains a bounded queue and POSTs each
//! confirmation to the configured webhook with a small retry budget; every
//! failure path is logged and swallowed. Without a configured webhook URL the
//! worker drops payloads on the floor (and says so once at startup).

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::sync::mpsc;

use clothstore_core::{Email, OrderId};

use crate::db::PlacedOrder;

/// Queue depth before `enqueue` starts shedding payloads.
const QUEUE_CAPACITY: usize = 64;

/// Delivery attempts per payload.
const MAX_ATTEMPTS: u32 = 3;

/// Pause between delivery attempts.
const RETRY_DELAY: Duration = Duration::from_secs(2);

/// Per-request timeout for the webhook call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One purchased line as the webhook payload describes it.
#[derive(Debug, Clone, Serialize)]
pub struct ConfirmationLine {
    pub name: String,
    pub size: String,
    pub quantity: i32,
    pub price: Decimal,
}

/// The order-confirmation webhook payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub recipient_email: String,
    pub lines: Vec<ConfirmationLine>,
    pub total: Decimal,
    pub order_date: DateTime<Utc>,
}

impl OrderConfirmation {
    /// Build a confirmation payload from a placed order.
    #[must_use]
    pub fn from_placed(placed: &PlacedOrder, recipient: &Email) -> Self {
        Self {
            order_id: placed.order.id,
            recipient_email: recipient.as_str().to_owned(),
            lines: placed
                .lines
                .iter()
                .map(|line| ConfirmationLine {
                    name: line.product_name.clone(),
                    size: line.size.clone(),
                    quantity: line.quantity,
                    price: line.price_at_purchase.amount(),
                })
                .collect(),
            total: placed.order.total_price.amount(),
            order_date: placed.order.order_date,
        }
    }
}

/// Handle to the background notification worker.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: mpsc::Sender<OrderConfirmation>,
}

impl Notifier {
    /// Spawn the worker task and return the enqueue handle.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn spawn(webhook_url: Option<String>) -> Self {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);

        if webhook_url.is_none() {
            tracing::warn!("ORDER_WEBHOOK_URL not set; order confirmations will not be delivered");
        }

        tokio::spawn(run_worker(webhook_url, rx));

        Self { tx }
    }

    /// Queue a confirmation for delivery. Never blocks; a full queue or a
    /// stopped worker sheds the payload with a log line.
    pub fn enqueue(&self, confirmation: OrderConfirmation) {
        let order_id = confirmation.order_id;
        if let Err(e) = self.tx.try_send(confirmation) {
            tracing::warn!(%order_id, error = %e, "dropping order confirmation");
        }
    }
}

/// Drain the queue, delivering each payload with retries.
async fn run_worker(webhook_url: Option<String>, mut rx: mpsc::Receiver<OrderConfirmation>) {
    let client = match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "notification worker failed to build HTTP client");
            return;
        }
    };

    while let Some(confirmation) = rx.recv().await {
        let Some(url) = webhook_url.as_deref() else {
            tracing::debug!(order_id = %confirmation.order_id, "no webhook configured, dropping confirmation");
            continue;
        };

        deliver_with_retries(&client, url, &confirmation).await;
    }
}

async fn deliver_with_retries(client: &reqwest::Client, url: &str, payload: &OrderConfirmation) {
    for attempt in 1..=MAX_ATTEMPTS {
        match deliver(client, url, payload).await {
            Ok(()) => {
                tracing::info!(order_id = %payload.order_id, "order confirmation delivered");
                return;
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %payload.order_id,
                    attempt,
                    error = %e,
                    "order confirmation delivery failed"
                );
                if attempt < MAX_ATTEMPTS {
                    tokio::time::sleep(RETRY_DELAY).await;
                }
            }
        }
    }
    tracing::error!(
        order_id = %payload.order_id,
        "order confirmation not delivered after {MAX_ATTEMPTS} attempts; giving up"
    );
}

async fn deliver(
    client: &reqwest::Client,
    url: &str,
    payload: &OrderConfirmation,
) -> Result<(), reqwest::Error> {
    client
        .post(url)
        .json(payload)
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}
