//! Order domain types and the pricing snapshot.
//!
//! An order freezes the prices in force at placement time. Everything here is
//! immutable once written; later catalog price changes must not be visible in
//! any of these types.

use chrono::{DateTime, Utc};
use clothstore_core::{OrderId, OrderLineId, OrderStatus, Price, ProductId, UserId};
use rust_decimal::Decimal;

use super::cart::CartEntry;

/// Immutable order header.
#[derive(Debug, Clone)]
pub struct Order {
    /// Unique order ID, shown to the customer on confirmation.
    pub id: OrderId,
    /// Account that placed the order. Orders never belong to guests.
    pub user_id: UserId,
    /// Sum of line subtotals at placement time.
    pub total_price: Price,
    /// When the order was placed.
    pub order_date: DateTime<Utc>,
    /// Always starts `confirmed`; no transitions are modeled.
    pub status: OrderStatus,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// One purchased line, with the price copied at placement time.
#[derive(Debug, Clone)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
    /// Catalog price at the moment of placement. Never recomputed.
    pub price_at_purchase: Price,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    /// Subtotal at the frozen purchase price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.price_at_purchase.line_total(self.quantity)
    }
}

/// An order line awaiting insertion, produced by [`snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLineDraft {
    pub product_id: ProductId,
    pub size: String,
    pub quantity: i32,
    pub price_at_purchase: Price,
}

/// Copy current catalog prices out of the cart, one draft per line.
///
/// The price is copied verbatim: no currency conversion, no extra rounding.
/// Prices that drifted since the cart page was rendered are used silently.
#[must_use]
pub fn snapshot(entries: &[CartEntry]) -> Vec<OrderLineDraft> {
    entries
        .iter()
        .map(|entry| OrderLineDraft {
            product_id: entry.line.product_id,
            size: entry.line.size.clone(),
            quantity: entry.line.quantity,
            price_at_purchase: entry.product.price,
        })
        .collect()
}

/// Order total for a set of drafts: Σ price-at-purchase × quantity.
#[must_use]
pub fn order_total(drafts: &[OrderLineDraft]) -> Decimal {
    drafts
        .iter()
        .map(|draft| draft.price_at_purchase.line_total(draft.quantity))
        .sum()
}

/// An order joined with its lines and enough product detail to render the
/// history page.
#[derive(Debug, Clone)]
pub struct OrderWithLines {
    pub order: Order,
    pub lines: Vec<OrderLineWithProduct>,
}

/// An order line joined with display fields from its product.
#[derive(Debug, Clone)]
pub struct OrderLineWithProduct {
    pub line: OrderLine,
    pub product_name: String,
    pub product_image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::cart::CartLine;
    use crate::models::product::Product;
    use chrono::Utc;
    use clothstore_core::{CartLineId, Category, Identity};

    fn entry(name: &str, size: &str, quantity: i32, price_cents: i64) -> CartEntry {
        let product = Product {
            id: ProductId::generate(),
            name: name.to_owned(),
            description: String::new(),
            price: Price::from_cents(price_cents),
            image_url: String::new(),
            category: Category::Men,
            sizes: vec![size.to_owned()],
            created_at: Utc::now(),
        };
        CartEntry {
            line: CartLine {
                id: CartLineId::generate(),
                owner: Identity::Authenticated(UserId::generate()),
                product_id: product.id,
                size: size.to_owned(),
                quantity,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            product,
        }
    }

    #[test]
    fn snapshot_copies_one_draft_per_line() {
        let entries = vec![entry("Shirt", "M", 3, 2000), entry("Jacket", "L", 1, 5000)];
        let drafts = snapshot(&entries);

        assert_eq!(drafts.len(), 2);
        for (draft, entry) in drafts.iter().zip(&entries) {
            assert_eq!(draft.product_id, entry.line.product_id);
            assert_eq!(draft.size, entry.line.size);
            assert_eq!(draft.quantity, entry.line.quantity);
            assert_eq!(draft.price_at_purchase, entry.product.price);
        }
    }

    #[test]
    fn total_matches_the_displayed_cart_sum() {
        // 3 x $20.00 + 1 x $50.00 = $110.00
        let entries = vec![entry("Shirt", "M", 3, 2000), entry("Jacket", "L", 1, 5000)];
        let drafts = snapshot(&entries);
        assert_eq!(order_total(&drafts), Decimal::new(11000, 2));
    }

    #[test]
    fn drafts_keep_their_price_when_the_catalog_moves() {
        let mut entries = vec![entry("Shirt", "M", 2, 2000)];
        let drafts = snapshot(&entries);

        // A later catalog price change must not reach the drafts.
        if let Some(e) = entries.first_mut() {
            e.product.price = Price::from_cents(9900);
        }
        assert_eq!(
            drafts.first().map(|d| d.price_at_purchase),
            Some(Price::from_cents(2000))
        );
    }

    #[test]
    fn empty_cart_totals_to_zero() {
        assert_eq!(order_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn order_line_subtotal_uses_frozen_price() {
        let line = OrderLine {
            id: OrderLineId::generate(),
            order_id: OrderId::generate(),
            product_id: ProductId::generate(),
            size: "M".to_owned(),
            quantity: 4,
            price_at_purchase: Price::from_cents(1250),
            created_at: Utc::now(),
        };
        assert_eq!(line.subtotal(), Decimal::new(5000, 2));
    }
}
