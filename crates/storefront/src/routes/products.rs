//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use clothstore_core::{Category, Price, ProductId};
use rust_decimal::Decimal;

use crate::error::{AppError, Result};
use crate::filters;
use crate::models::{CatalogFilter, Product};
use crate::state::AppState;

/// Product card display data for the listing grid.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub name: String,
    pub price: String,
    pub image_url: String,
    pub category: String,
}

impl From<&Product> for ProductCardView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
            category: product.category.to_string(),
        }
    }
}

/// Product detail display data.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: String,
    pub category: String,
    pub sizes: Vec<String>,
}

impl From<&Product> for ProductDetailView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.to_string(),
            image_url: product.image_url.clone(),
            category: product.category.to_string(),
            sizes: product.sizes.clone(),
        }
    }
}

/// Catalog listing query parameters.
///
/// Prices arrive as raw strings because browsers submit empty fields as
/// empty strings; anything unparseable is treated as unset.
#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub size: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub page: Option<u32>,
}

fn parse_price(input: Option<String>) -> Option<Price> {
    input
        .as_deref()
        .and_then(|s| s.trim().parse::<Decimal>().ok())
        .map(Price::new)
}

impl CatalogQuery {
    fn into_filter(self) -> CatalogFilter {
        CatalogFilter {
            search: self.q.filter(|s| !s.is_empty()),
            // Unknown category values fall back to "all"
            category: self
                .category
                .and_then(|c| c.parse::<Category>().ok()),
            size: self.size.filter(|s| !s.is_empty() && s != "All"),
            min_price: parse_price(self.min_price),
            max_price: parse_price(self.max_price),
            page: self.page.unwrap_or(1).max(1),
        }
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCardView>,
    pub search: String,
    pub selected_category: String,
    pub selected_size: String,
    pub current_page: u32,
    pub total_pages: u32,
    pub categories: Vec<String>,
    pub size_options: Vec<String>,
}

/// Sizes offered in the listing filter.
const SIZE_OPTIONS: [&str; 5] = ["XS", "S", "M", "L", "XL"];

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetailView,
}

/// Display the catalog listing page.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<CatalogQuery>,
) -> Result<ProductsIndexTemplate> {
    let filter = query.into_filter();
    let page = crate::db::ProductRepository::new(state.pool())
        .page(&filter)
        .await?;

    Ok(ProductsIndexTemplate {
        products: page.products.iter().map(ProductCardView::from).collect(),
        search: filter.search.clone().unwrap_or_default(),
        selected_category: filter
            .category
            .map_or_else(|| "All".to_owned(), |c| c.to_string()),
        selected_size: filter.size.clone().unwrap_or_else(|| "All".to_owned()),
        current_page: filter.page,
        total_pages: page.total_pages(),
        categories: Category::ALL.iter().map(ToString::to_string).collect(),
        size_options: SIZE_OPTIONS.iter().map(ToString::to_string).collect(),
    })
}

/// Display a product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<ProductShowTemplate> {
    let product = crate::db::ProductRepository::new(state.pool())
        .get(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        product: ProductDetailView::from(&product),
    })
}
