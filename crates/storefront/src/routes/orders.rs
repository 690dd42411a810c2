//! Order history route handlers.
//!
//! Read-only: every price shown here is the frozen price-at-purchase, so the
//! page is immune to later catalog changes.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::Result;
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::OrderWithLines;
use crate::state::AppState;

/// Order line display data.
#[derive(Clone)]
pub struct OrderLineView {
    pub name: String,
    pub image_url: String,
    pub size: String,
    pub quantity: i32,
    pub price: String,
    pub line_price: String,
}

/// Order display data.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub date: String,
    pub status: String,
    pub total: String,
    pub lines: Vec<OrderLineView>,
}

impl From<&OrderWithLines> for OrderView {
    fn from(entry: &OrderWithLines) -> Self {
        Self {
            id: entry.order.id.to_string(),
            date: entry.order.order_date.format("%B %-d, %Y").to_string(),
            status: entry.order.status.to_string(),
            total: entry.order.total_price.to_string(),
            lines: entry
                .lines
                .iter()
                .map(|detail| OrderLineView {
                    name: detail.product_name.clone(),
                    image_url: detail.product_image_url.clone(),
                    size: detail.line.size.clone(),
                    quantity: detail.line.quantity,
                    price: detail.line.price_at_purchase.to_string(),
                    line_price: format!("${:.2}", detail.line.subtotal()),
                })
                .collect(),
        }
    }
}

/// Order history page template.
#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub orders: Vec<OrderView>,
}

/// Display the signed-in user's order history, newest first.
#[instrument(skip(state, user))]
pub async fn index(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<OrdersIndexTemplate> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;

    Ok(OrdersIndexTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
    })
}
