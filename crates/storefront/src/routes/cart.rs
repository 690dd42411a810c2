//! Cart route handlers.
//!
//! Cart operations use HTMX for dynamic updates without full page reloads.
//! Every mutation answers with an `HX-Trigger: cart-updated` header so the
//! badge refreshes in-page, and `GET /cart/events` streams badge counts for
//! other browsing contexts of the same identity.

use std::convert::Infallible;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    response::{AppendHeaders, IntoResponse, Response},
};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::instrument;

use clothstore_core::{CartLineId, ProductId};

use crate::error::Result;
use crate::filters;
use crate::middleware::CurrentIdentity;
use crate::models::{CartEntry, cart::cart_total};
use crate::services::CartService;
use crate::state::AppState;

/// Cart item display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub product_id: String,
    pub name: String,
    pub size: String,
    pub quantity: i32,
    pub price: String,
    pub line_price: String,
    pub image_url: String,
}

impl From<&CartEntry> for CartItemView {
    fn from(entry: &CartEntry) -> Self {
        Self {
            id: entry.line.id.to_string(),
            product_id: entry.product.id.to_string(),
            name: entry.product.name.clone(),
            size: entry.line.size.clone(),
            quantity: entry.line.quantity,
            price: entry.product.price.to_string(),
            line_price: format!("${:.2}", entry.subtotal()),
            image_url: entry.product.image_url.clone(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: usize,
}

impl CartView {
    /// Create an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            subtotal: "$0.00".to_string(),
            item_count: 0,
        }
    }
}

impl From<&[CartEntry]> for CartView {
    fn from(entries: &[CartEntry]) -> Self {
        Self {
            items: entries.iter().map(CartItemView::from).collect(),
            subtotal: format!("${:.2}", cart_total(entries)),
            item_count: entries.len(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: uuid::Uuid,
    pub size: String,
    pub quantity: Option<i32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub line_id: uuid::Uuid,
    pub quantity: i32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub line_id: uuid::Uuid,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub signed_in: bool,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: i64,
}

/// Display cart page.
#[instrument(skip(state, identity))]
pub async fn show(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<CartShowTemplate> {
    let entries = CartService::new(state.pool(), state.events())
        .list(&identity)
        .await?;

    Ok(CartShowTemplate {
        cart: CartView::from(entries.as_slice()),
        signed_in: identity.is_authenticated(),
    })
}

/// Add item to cart (HTMX).
///
/// Merges into an existing line for the same (product, size) if one exists.
/// Returns the refreshed badge with an HTMX trigger to update other elements.
#[instrument(skip(state, identity))]
pub async fn add(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let service = CartService::new(state.pool(), state.events());
    service
        .add(
            &identity,
            ProductId::new(form.product_id),
            &form.size,
            form.quantity.unwrap_or(1),
        )
        .await?;

    let count = service.count(&identity).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartCountTemplate { count },
    )
        .into_response())
}

/// Update cart item quantity (HTMX).
///
/// Quantities below 1 are absorbed as a no-op; the fragment re-renders the
/// cart either way.
#[instrument(skip(state, identity))]
pub async fn update(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let service = CartService::new(state.pool(), state.events());
    service
        .set_quantity(&identity, CartLineId::new(form.line_id), form.quantity)
        .await?;

    let entries = service.list(&identity).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(entries.as_slice()),
        },
    )
        .into_response())
}

/// Remove item from cart (HTMX).
#[instrument(skip(state, identity))]
pub async fn remove(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let service = CartService::new(state.pool(), state.events());
    service
        .remove(&identity, CartLineId::new(form.line_id))
        .await?;

    let entries = service.list(&identity).await?;

    Ok((
        AppendHeaders([("HX-Trigger", "cart-updated")]),
        CartItemsTemplate {
            cart: CartView::from(entries.as_slice()),
        },
    )
        .into_response())
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, identity))]
pub async fn count(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> Result<CartCountTemplate> {
    let count = CartService::new(state.pool(), state.events())
        .count(&identity)
        .await?;

    Ok(CartCountTemplate { count })
}

/// Stream badge counts for this identity (SSE).
///
/// Emits the current count on connect, then a fresh count every time a
/// mutation for the same identity is published on the event channel. This is
/// how a second tab learns its badge is stale.
#[instrument(skip(state, identity))]
pub async fn events(
    State(state): State<AppState>,
    CurrentIdentity(identity): CurrentIdentity,
) -> impl IntoResponse {
    let mut rx = state.events().subscribe();
    let owner_key = identity.owner_key();

    let stream = async_stream::stream! {
        let service = CartService::new(state.pool(), state.events());

        if let Ok(count) = service.count(&identity).await {
            yield Ok::<_, Infallible>(Event::default().event("cart-count").data(count.to_string()));
        }

        loop {
            match rx.recv().await {
                Ok(event) if event.owner_key == owner_key => {
                    match service.count(&identity).await {
                        Ok(count) => {
                            yield Ok(Event::default().event("cart-count").data(count.to_string()));
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "failed to recompute badge count");
                        }
                    }
                }
                // Other identities' mutations are not our business.
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "badge stream lagged; resyncing");
                    if let Ok(count) = service.count(&identity).await {
                        yield Ok(Event::default().event("cart-count").data(count.to_string()));
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
