//! Checkout route handlers.
//!
//! Checkout requires a signed-in account; guests are redirected to login by
//! the extractor. Payment is explicitly mocked: placing the order writes the
//! order records and nothing else.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use clothstore_core::Identity;

use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;
use crate::routes::cart::CartView;
use crate::services::{CartService, CheckoutService};
use crate::state::AppState;

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutShowTemplate {
    pub cart: CartView,
    pub email: String,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/confirmed.html")]
pub struct CheckoutConfirmedTemplate {
    pub order_id: String,
    pub email: String,
}

/// Display the checkout summary.
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<CheckoutShowTemplate> {
    let identity = Identity::Authenticated(user.id);
    let entries = CartService::new(state.pool(), state.events())
        .list(&identity)
        .await?;

    Ok(CheckoutShowTemplate {
        cart: CartView::from(entries.as_slice()),
        email: user.email.to_string(),
    })
}

/// Place the order.
///
/// All-or-nothing: on failure nothing is persisted and the cart is untouched,
/// so the customer can simply try again.
#[instrument(skip(state, user))]
pub async fn place(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<CheckoutConfirmedTemplate> {
    let identity = Identity::Authenticated(user.id);
    let placed = CheckoutService::new(state.pool(), state.events(), state.notifier())
        .place_order(&identity)
        .await?;

    Ok(CheckoutConfirmedTemplate {
        order_id: placed.order.id.to_string(),
        email: user.email.to_string(),
    })
}
