//! Cart line repository.
//!
//! The uniqueness invariant — one row per (owner, product, size) — is
//! enforced by a storage-level unique constraint, and merges happen in a
//! single `ON CONFLICT` upsert so two concurrent adds for the same
//! combination cannot race a check-then-act window into a duplicate row.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use clothstore_core::{
    CartLineId, Category, GuestToken, Identity, OwnerKind, Price, ProductId, UserId,
};

use super::RepositoryError;
use crate::models::{CartEntry, CartLine, Product};

/// Reconstruct an [`Identity`] from its storage pair.
pub(crate) fn owner_from_parts(kind: &str, key: &str) -> Result<Identity, RepositoryError> {
    let kind: OwnerKind = kind.parse().map_err(RepositoryError::DataCorruption)?;
    match kind {
        OwnerKind::Guest => {
            let token = GuestToken::parse(key).map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid guest token in database: {e}"))
            })?;
            Ok(Identity::Anonymous(token))
        }
        OwnerKind::User => {
            let user_id: UserId = key.parse().map_err(|e| {
                RepositoryError::DataCorruption(format!("invalid user id in database: {e}"))
            })?;
            Ok(Identity::Authenticated(user_id))
        }
    }
}

/// Cart line row without product data.
#[derive(Debug, FromRow)]
struct CartLineRow {
    id: uuid::Uuid,
    owner_kind: String,
    owner_id: String,
    product_id: uuid::Uuid,
    size: String,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CartLineRow {
    fn into_line(self) -> Result<CartLine, RepositoryError> {
        Ok(CartLine {
            id: CartLineId::new(self.id),
            owner: owner_from_parts(&self.owner_kind, &self.owner_id)?,
            product_id: ProductId::new(self.product_id),
            size: self.size,
            quantity: self.quantity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Cart line row joined with its product.
#[derive(Debug, FromRow)]
pub(crate) struct CartEntryRow {
    pub id: uuid::Uuid,
    pub owner_kind: String,
    pub owner_id: String,
    pub product_id: uuid::Uuid,
    pub size: String,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub product_name: String,
    pub product_description: String,
    pub product_price: Decimal,
    pub product_image_url: String,
    pub product_category: String,
    pub product_sizes: Vec<String>,
    pub product_created_at: DateTime<Utc>,
}

impl CartEntryRow {
    pub(crate) fn into_entry(self) -> Result<CartEntry, RepositoryError> {
        let category: Category = self.product_category.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category in database: {e}"))
        })?;

        let product = Product {
            id: ProductId::new(self.product_id),
            name: self.product_name,
            description: self.product_description,
            price: Price::new(self.product_price),
            image_url: self.product_image_url,
            category,
            sizes: self.product_sizes,
            created_at: self.product_created_at,
        };

        let line = CartLine {
            id: CartLineId::new(self.id),
            owner: owner_from_parts(&self.owner_kind, &self.owner_id)?,
            product_id: product.id,
            size: self.size,
            quantity: self.quantity,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };

        Ok(CartEntry { line, product })
    }
}

/// Cart lines joined with products for one owner, most recent first.
pub(crate) const ENTRIES_FOR_OWNER_SQL: &str = "\
    SELECT cl.id, cl.owner_kind, cl.owner_id, cl.product_id, cl.size, cl.quantity, \
           cl.created_at, cl.updated_at, \
           p.name AS product_name, p.description AS product_description, \
           p.price AS product_price, p.image_url AS product_image_url, \
           p.category AS product_category, p.sizes AS product_sizes, \
           p.created_at AS product_created_at \
    FROM storefront.cart_line cl \
    JOIN storefront.product p ON p.id = cl.product_id \
    WHERE cl.owner_kind = $1 AND cl.owner_id = $2 \
    ORDER BY cl.created_at DESC";

const LINE_COLUMNS: &str =
    "id, owner_kind, owner_id, product_id, size, quantity, created_at, updated_at";

/// Repository for cart line operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All cart lines for an identity, joined with their products, most
    /// recent first. Read-only.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list(&self, owner: &Identity) -> Result<Vec<CartEntry>, RepositoryError> {
        let rows: Vec<CartEntryRow> = sqlx::query_as(ENTRIES_FOR_OWNER_SQL)
            .bind(owner.owner_kind().as_str())
            .bind(owner.owner_key())
            .fetch_all(self.pool)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(row.into_entry()?);
        }
        Ok(entries)
    }

    /// Insert a cart line, or merge quantities into the existing line for the
    /// same (owner, product, size).
    ///
    /// The merge is a single atomic upsert against the unique constraint; the
    /// caller is expected to have validated size and quantity against the
    /// product first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the returned row is invalid.
    pub async fn add_or_merge(
        &self,
        owner: &Identity,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<CartLine, RepositoryError> {
        let sql = format!(
            "INSERT INTO storefront.cart_line (owner_kind, owner_id, product_id, size, quantity) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (owner_kind, owner_id, product_id, size) \
             DO UPDATE SET quantity = cart_line.quantity + EXCLUDED.quantity, updated_at = now() \
             RETURNING {LINE_COLUMNS}"
        );
        let row: CartLineRow = sqlx::query_as(&sql)
            .bind(owner.owner_kind().as_str())
            .bind(owner.owner_key())
            .bind(product_id.as_uuid())
            .bind(size)
            .bind(quantity)
            .fetch_one(self.pool)
            .await?;

        row.into_line()
    }

    /// Set a line's quantity to an exact value.
    ///
    /// Quantities below 1 are refused as a silent no-op (`Ok(false)`), never
    /// an error and never a delete. Returns `Ok(false)` too when the line no
    /// longer exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_quantity(
        &self,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<bool, RepositoryError> {
        if quantity < 1 {
            return Ok(false);
        }

        let result = sqlx::query(
            "UPDATE storefront.cart_line SET quantity = $2, updated_at = now() WHERE id = $1",
        )
        .bind(line_id.as_uuid())
        .bind(quantity)
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Delete a line unconditionally. Removing a nonexistent line is not an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(&self, line_id: CartLineId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM storefront.cart_line WHERE id = $1")
            .bind(line_id.as_uuid())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Delete all lines for an identity. Used by order placement after the
    /// order writes commit, and available to tooling.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, owner: &Identity) -> Result<u64, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM storefront.cart_line WHERE owner_kind = $1 AND owner_id = $2")
                .bind(owner.owner_kind().as_str())
                .bind(owner.owner_key())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected())
    }

    /// Number of distinct cart lines for an identity (the badge definition).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self, owner: &Identity) -> Result<i64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM storefront.cart_line WHERE owner_kind = $1 AND owner_id = $2",
        )
        .bind(owner.owner_kind().as_str())
        .bind(owner.owner_key())
        .fetch_one(self.pool)
        .await?;

        Ok(count)
    }
}
