//! Catalog repository.
//!
//! Products are read-only here; writes happen through the seeding CLI and
//! external catalog management.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use clothstore_core::{Category, Price, ProductId};

use super::RepositoryError;
use crate::models::{CatalogFilter, CatalogPage, Product};

/// Database row for a product, mapped into [`Product`] on read.
#[derive(Debug, FromRow)]
pub(crate) struct ProductRow {
    pub id: uuid::Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image_url: String,
    pub category: String,
    pub sizes: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl ProductRow {
    pub(crate) fn into_product(self) -> Result<Product, RepositoryError> {
        let category: Category = self.category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        if self.sizes.is_empty() {
            return Err(RepositoryError::DataCorruption(format!(
                "product {} has no sizes",
                self.id
            )));
        }

        Ok(Product {
            id: ProductId::new(self.id),
            name: self.name,
            description: self.description,
            price: Price::new(self.price),
            image_url: self.image_url,
            category,
            sizes: self.sizes,
            created_at: self.created_at,
        })
    }
}

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, image_url, category, sizes, created_at";

/// Repository for catalog reads.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the row is invalid.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM storefront.product WHERE id = $1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// One page of the catalog, newest first, with the total match count.
    ///
    /// Search, category, and price bounds are applied in SQL; the size filter
    /// narrows the fetched page afterwards, so a size-filtered page may come
    /// back shorter than `PER_PAGE` while the total still counts every
    /// size-unfiltered match.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn page(&self, filter: &CatalogFilter) -> Result<CatalogPage, RepositoryError> {
        const WHERE_CLAUSE: &str = "\
            ($1::text IS NULL OR name ILIKE '%' || $1 || '%' OR description ILIKE '%' || $1 || '%') \
            AND ($2::text IS NULL OR category = $2) \
            AND ($3::numeric IS NULL OR price >= $3) \
            AND ($4::numeric IS NULL OR price <= $4)";

        let search = filter.search.as_deref().filter(|s| !s.is_empty());
        let category = filter.category.map(Category::as_str);
        let min_price = filter.min_price.map(Price::amount);
        let max_price = filter.max_price.map(Price::amount);

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM storefront.product WHERE {WHERE_CLAUSE}"
        ))
        .bind(search)
        .bind(category)
        .bind(min_price)
        .bind(max_price)
        .fetch_one(self.pool)
        .await?;

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM storefront.product \
             WHERE {WHERE_CLAUSE} \
             ORDER BY created_at DESC \
             LIMIT $5 OFFSET $6"
        ))
        .bind(search)
        .bind(category)
        .bind(min_price)
        .bind(max_price)
        .bind(i64::from(CatalogFilter::PER_PAGE))
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        let mut products = Vec::with_capacity(rows.len());
        for row in rows {
            products.push(row.into_product()?);
        }

        if let Some(size) = filter.size.as_deref().filter(|s| !s.is_empty()) {
            products.retain(|p| p.has_size(size));
        }

        Ok(CatalogPage { products, total })
    }
}
