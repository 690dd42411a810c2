//! Order placement service.
//!
//! Wraps the transactional placement write with the precondition checks and
//! the two post-commit effects: publishing the cart-changed event and
//! enqueueing the confirmation notification. Neither post-commit effect can
//! fail the order.

use sqlx::PgPool;
use thiserror::Error;

use clothstore_core::Identity;

use crate::db::{
    OrderRepository, PlaceOrderError, PlacedOrder, ProfileRepository, RepositoryError,
};

use super::events::CartEvents;
use super::notify::{Notifier, OrderConfirmation};

/// Errors from the checkout flow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Anonymous identities cannot place orders.
    #[error("checkout requires a signed-in account")]
    Unauthenticated,

    /// The placement write sequence failed.
    #[error(transparent)]
    Place(#[from] PlaceOrderError),

    /// A read outside the placement transaction failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Checkout operations for one request.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    events: &'a CartEvents,
    notifier: &'a Notifier,
}

impl<'a> CheckoutService<'a> {
    /// Create a checkout service over the shared pool, event channel, and
    /// notification worker.
    #[must_use]
    pub const fn new(pool: &'a PgPool, events: &'a CartEvents, notifier: &'a Notifier) -> Self {
        Self {
            pool,
            events,
            notifier,
        }
    }

    /// Convert the identity's cart into an order.
    ///
    /// All-or-nothing from the caller's viewpoint: on any pre-commit failure
    /// nothing is persisted and the cart is untouched, so retrying is safe.
    /// On success the cart is empty, exactly one order with one line per cart
    /// line exists, and the returned order carries the id to display.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::Unauthenticated` for anonymous identities.
    /// - `CheckoutError::Place(PlaceOrderError::EmptyCart)` if the cart has no lines.
    /// - `CheckoutError::Place(PlaceOrderError::Repository)` if a write failed
    ///   and rolled back.
    /// - `CheckoutError::Place(PlaceOrderError::PartialFailure)` if the commit
    ///   acknowledgment was lost; logged with the order id for reconciliation.
    pub async fn place_order(&self, identity: &Identity) -> Result<PlacedOrder, CheckoutError> {
        let Some(user_id) = identity.as_user() else {
            return Err(CheckoutError::Unauthenticated);
        };

        let placed = OrderRepository::new(self.pool)
            .place(user_id)
            .await
            .inspect_err(|e| {
                if let PlaceOrderError::PartialFailure { order_id, step, .. } = e {
                    tracing::error!(
                        %order_id,
                        step,
                        %user_id,
                        "order placement commit not acknowledged; manual reconciliation required"
                    );
                }
            })?;

        tracing::info!(
            order_id = %placed.order.id,
            %user_id,
            total = %placed.order.total_price,
            lines = placed.lines.len(),
            "order placed"
        );

        self.events.publish(identity);
        self.send_confirmation(identity, &placed).await;

        Ok(placed)
    }

    /// Enqueue the confirmation notification. Best-effort: a missing profile
    /// or a failed lookup is logged and swallowed.
    async fn send_confirmation(&self, identity: &Identity, placed: &PlacedOrder) {
        let Some(user_id) = identity.as_user() else {
            return;
        };

        match ProfileRepository::new(self.pool).get(user_id).await {
            Ok(Some(profile)) => {
                self.notifier
                    .enqueue(OrderConfirmation::from_placed(placed, &profile.email));
            }
            Ok(None) => {
                tracing::warn!(
                    order_id = %placed.order.id,
                    %user_id,
                    "no profile for order confirmation recipient"
                );
            }
            Err(e) => {
                tracing::warn!(
                    order_id = %placed.order.id,
                    %user_id,
                    error = %e,
                    "failed to load profile for order confirmation"
                );
            }
        }
    }
}
