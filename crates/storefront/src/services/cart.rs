//! Cart service: validation, storage, and event publication.
//!
//! Route handlers go through this service so every mutation is validated the
//! same way and every mutation publishes a cart-changed event.

use sqlx::PgPool;
use thiserror::Error;

use clothstore_core::{CartLineId, Identity, ProductId};

use crate::db::{CartRepository, ProductRepository, RepositoryError};
use crate::models::{CartEntry, CartLine};

use super::events::CartEvents;

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The referenced product does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// The requested size is not offered for the product.
    #[error("size {size} is not available for {product}")]
    InvalidSize { size: String, product: String },

    /// Quantity must be at least 1.
    #[error("quantity must be at least 1 (got {0})")]
    InvalidQuantity(i32),

    /// Storage failure.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Cart operations for one request.
pub struct CartService<'a> {
    pool: &'a PgPool,
    events: &'a CartEvents,
}

impl<'a> CartService<'a> {
    /// Create a cart service over the shared pool and event channel.
    #[must_use]
    pub const fn new(pool: &'a PgPool, events: &'a CartEvents) -> Self {
        Self { pool, events }
    }

    /// The identity's cart, joined with products, most recent first.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the read fails.
    pub async fn list(&self, owner: &Identity) -> Result<Vec<CartEntry>, CartError> {
        Ok(CartRepository::new(self.pool).list(owner).await?)
    }

    /// Add `quantity` units of (product, size) to the cart, merging into an
    /// existing line for the same combination.
    ///
    /// # Errors
    ///
    /// - `CartError::InvalidQuantity` if `quantity < 1` (rejected before any write).
    /// - `CartError::ProductNotFound` if the product does not exist.
    /// - `CartError::InvalidSize` if the product is not offered in `size`.
    /// - `CartError::Repository` if storage fails.
    pub async fn add(
        &self,
        owner: &Identity,
        product_id: ProductId,
        size: &str,
        quantity: i32,
    ) -> Result<CartLine, CartError> {
        if quantity < 1 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let product = ProductRepository::new(self.pool)
            .get(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;

        if !product.has_size(size) {
            return Err(CartError::InvalidSize {
                size: size.to_owned(),
                product: product.name,
            });
        }

        let line = CartRepository::new(self.pool)
            .add_or_merge(owner, product_id, size, quantity)
            .await?;

        tracing::debug!(owner = %owner, %product_id, size, quantity, "cart line added");
        self.events.publish(owner);
        Ok(line)
    }

    /// Set a line's quantity to an exact value.
    ///
    /// Quantities below 1 are absorbed as a no-op, matching the store
    /// contract; the UI's decrement button bottoms out at 1 but the store
    /// refuses to persist anything lower regardless.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the write fails.
    pub async fn set_quantity(
        &self,
        owner: &Identity,
        line_id: CartLineId,
        quantity: i32,
    ) -> Result<bool, CartError> {
        let changed = CartRepository::new(self.pool)
            .set_quantity(line_id, quantity)
            .await?;

        if changed {
            self.events.publish(owner);
        }
        Ok(changed)
    }

    /// Delete a line. Removing a nonexistent line is not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the write fails.
    pub async fn remove(&self, owner: &Identity, line_id: CartLineId) -> Result<(), CartError> {
        CartRepository::new(self.pool).remove(line_id).await?;
        self.events.publish(owner);
        Ok(())
    }

    /// Delete all lines for the identity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the write fails.
    pub async fn clear(&self, owner: &Identity) -> Result<u64, CartError> {
        let removed = CartRepository::new(self.pool).clear(owner).await?;
        if removed > 0 {
            self.events.publish(owner);
        }
        Ok(removed)
    }

    /// The badge count: number of distinct lines for the identity.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if the read fails.
    pub async fn count(&self, owner: &Identity) -> Result<i64, CartError> {
        Ok(CartRepository::new(self.pool).count(owner).await?)
    }
}
