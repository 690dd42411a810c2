//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog listing (search, filters, pagination)
//! GET  /health                 - Health check (in main)
//!
//! # Products
//! GET  /products/{id}          - Product detail with add-to-cart form
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add or merge a line (returns badge, triggers cart-updated)
//! POST /cart/update            - Set quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove line (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//! GET  /cart/events            - Badge counts over SSE (cross-tab refresh)
//!
//! # Checkout (signed-in only)
//! GET  /checkout               - Order summary
//! POST /checkout               - Place the order, render confirmation
//!
//! # Orders (signed-in only)
//! GET  /orders                 - Order history with frozen prices
//! ```

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/cart", get(cart::show))
        .route("/cart/add", post(cart::add))
        .route("/cart/update", post(cart::update))
        .route("/cart/remove", post(cart::remove))
        .route("/cart/count", get(cart::count))
        .route("/cart/events", get(cart::events))
        .route("/checkout", get(checkout::show).post(checkout::place))
        .route("/orders", get(orders::index))
}
