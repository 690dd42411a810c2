//! Order repository: transactional placement and order history.
//!
//! Placement runs the whole write sequence — header, lines, cart clear — in
//! one transaction, so a failure partway rolls everything back and the caller
//! sees all-or-nothing. The single residual window is a failed commit
//! acknowledgment, surfaced as [`PlaceOrderError::PartialFailure`] with the
//! order id so the rows can be reconciled by hand.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use thiserror::Error;

use clothstore_core::{OrderId, OrderLineId, OrderStatus, OwnerKind, Price, ProductId, UserId};

use super::RepositoryError;
use super::cart::{CartEntryRow, ENTRIES_FOR_OWNER_SQL};
use crate::models::order::{self, Order, OrderLine, OrderLineWithProduct, OrderWithLines};
use crate::models::CartEntry;

/// Errors from the placement write sequence.
#[derive(Debug, Error)]
pub enum PlaceOrderError {
    /// The identity's cart had no lines.
    #[error("cart is empty")]
    EmptyCart,

    /// A write failed before commit; the transaction rolled back and nothing
    /// was persisted.
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The commit acknowledgment failed after every write succeeded; the
    /// order may or may not have been persisted.
    #[error("order {order_id} commit not acknowledged at step {step}: {source}")]
    PartialFailure {
        order_id: OrderId,
        step: &'static str,
        source: sqlx::Error,
    },
}

impl From<sqlx::Error> for PlaceOrderError {
    fn from(e: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(e))
    }
}

/// A successfully placed order, with the display data the confirmation
/// notification needs.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    pub lines: Vec<PlacedLine>,
}

/// One purchased line as the notification payload describes it.
#[derive(Debug, Clone)]
pub struct PlacedLine {
    pub product_name: String,
    pub size: String,
    pub quantity: i32,
    pub price_at_purchase: Price,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    total_price: Decimal,
    order_date: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status: OrderStatus = self.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order status in database: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            total_price: Price::new(self.total_price),
            order_date: self.order_date,
            status,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct OrderLineDetailRow {
    id: uuid::Uuid,
    order_id: uuid::Uuid,
    product_id: uuid::Uuid,
    size: String,
    quantity: i32,
    price_at_purchase: Decimal,
    created_at: DateTime<Utc>,
    product_name: String,
    product_image_url: String,
}

impl OrderLineDetailRow {
    fn into_detail(self) -> OrderLineWithProduct {
        OrderLineWithProduct {
            line: OrderLine {
                id: OrderLineId::new(self.id),
                order_id: OrderId::new(self.order_id),
                product_id: ProductId::new(self.product_id),
                size: self.size,
                quantity: self.quantity,
                price_at_purchase: Price::new(self.price_at_purchase),
                created_at: self.created_at,
            },
            product_name: self.product_name,
            product_image_url: self.product_image_url,
        }
    }
}

const ORDER_COLUMNS: &str = "id, user_id, total_price, order_date, status, created_at";

/// Repository for order placement and history.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Convert a user's cart into an order.
    ///
    /// Reads the cart, snapshots prices, writes the header and lines, and
    /// clears the cart — all inside one transaction. On success the cart is
    /// empty and exactly one order with one line per cart line exists.
    ///
    /// # Errors
    ///
    /// - `PlaceOrderError::EmptyCart` if the user has no cart lines.
    /// - `PlaceOrderError::Repository` if any write fails before commit;
    ///   nothing is persisted.
    /// - `PlaceOrderError::PartialFailure` if the commit itself fails after
    ///   all writes succeeded.
    pub async fn place(&self, user_id: UserId) -> Result<PlacedOrder, PlaceOrderError> {
        let mut tx = self.pool.begin().await?;

        // Read the cart inside the transaction so the snapshot and the writes
        // see one consistent state.
        let rows: Vec<CartEntryRow> = sqlx::query_as(ENTRIES_FOR_OWNER_SQL)
            .bind(OwnerKind::User.as_str())
            .bind(user_id.to_string())
            .fetch_all(&mut *tx)
            .await?;

        if rows.is_empty() {
            return Err(PlaceOrderError::EmptyCart);
        }

        let mut entries: Vec<CartEntry> = Vec::with_capacity(rows.len());
        for row in rows {
            entries.push(row.into_entry()?);
        }

        let drafts = order::snapshot(&entries);
        let total = order::order_total(&drafts);

        let sql = format!(
            "INSERT INTO storefront.customer_order (user_id, total_price, status) \
             VALUES ($1, $2, $3) \
             RETURNING {ORDER_COLUMNS}"
        );
        let header: OrderRow = sqlx::query_as(&sql)
            .bind(user_id.as_uuid())
            .bind(total)
            .bind(OrderStatus::Confirmed.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let order = header.into_order()?;

        for draft in &drafts {
            sqlx::query(
                "INSERT INTO storefront.order_line \
                 (order_id, product_id, size, quantity, price_at_purchase) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(order.id.as_uuid())
            .bind(draft.product_id.as_uuid())
            .bind(&draft.size)
            .bind(draft.quantity)
            .bind(draft.price_at_purchase.amount())
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("DELETE FROM storefront.cart_line WHERE owner_kind = $1 AND owner_id = $2")
            .bind(OwnerKind::User.as_str())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await?;

        tx.commit().await.map_err(|e| PlaceOrderError::PartialFailure {
            order_id: order.id,
            step: "commit",
            source: e,
        })?;

        let lines = entries
            .iter()
            .zip(&drafts)
            .map(|(entry, draft)| PlacedLine {
                product_name: entry.product.name.clone(),
                size: draft.size.clone(),
                quantity: draft.quantity,
                price_at_purchase: draft.price_at_purchase,
            })
            .collect();

        Ok(PlacedOrder { order, lines })
    }

    /// A user's orders, newest first, each with its lines and product display
    /// fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if any row is invalid.
    pub async fn list_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<OrderWithLines>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM storefront.customer_order \
             WHERE user_id = $1 \
             ORDER BY order_date DESC"
        );
        let order_rows: Vec<OrderRow> = sqlx::query_as(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(self.pool)
            .await?;

        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            orders.push(row.into_order()?);
        }

        let order_ids: Vec<uuid::Uuid> = orders.iter().map(|o| o.id.as_uuid()).collect();

        let line_rows: Vec<OrderLineDetailRow> = sqlx::query_as(
            "SELECT ol.id, ol.order_id, ol.product_id, ol.size, ol.quantity, \
                    ol.price_at_purchase, ol.created_at, \
                    p.name AS product_name, p.image_url AS product_image_url \
             FROM storefront.order_line ol \
             JOIN storefront.product p ON p.id = ol.product_id \
             WHERE ol.order_id = ANY($1) \
             ORDER BY ol.created_at ASC",
        )
        .bind(&order_ids)
        .fetch_all(self.pool)
        .await?;

        let mut result: Vec<OrderWithLines> = orders
            .into_iter()
            .map(|order| OrderWithLines {
                order,
                lines: Vec::new(),
            })
            .collect();

        for row in line_rows {
            let detail = row.into_detail();
            if let Some(entry) = result
                .iter_mut()
                .find(|o| o.order.id == detail.line.order_id)
            {
                entry.lines.push(detail);
            }
        }

        Ok(result)
    }
}
