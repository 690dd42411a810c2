//! Cart domain types.

use chrono::{DateTime, Utc};
use clothstore_core::{CartLineId, Identity, ProductId};
use rust_decimal::Decimal;

use super::product::Product;

/// One cart line: a (owner, product, size) combination with a quantity.
///
/// At most one line exists per combination; re-adding the same product and
/// size merges quantities instead of creating a second row. Quantity never
/// drops below 1 while the line exists.
#[derive(Debug, Clone)]
pub struct CartLine {
    /// Unique line ID.
    pub id: CartLineId,
    /// Identity the line belongs to.
    pub owner: Identity,
    /// Product the line references.
    pub product_id: ProductId,
    /// Chosen size; always one of the product's available sizes.
    pub size: String,
    /// Units of the product at this size. Always >= 1.
    pub quantity: i32,
    /// When the line was first added.
    pub created_at: DateTime<Utc>,
    /// Last quantity change.
    pub updated_at: DateTime<Utc>,
}

/// A cart line joined with its product, as the cart and checkout pages
/// consume it.
#[derive(Debug, Clone)]
pub struct CartEntry {
    pub line: CartLine,
    pub product: Product,
}

impl CartEntry {
    /// Line subtotal at the product's current catalog price.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.product.price.line_total(self.line.quantity)
    }
}

/// Sum of line subtotals at current catalog prices, as shown on the cart and
/// checkout pages.
#[must_use]
pub fn cart_total(entries: &[CartEntry]) -> Decimal {
    entries.iter().map(CartEntry::subtotal).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use clothstore_core::{Category, GuestToken, Price};

    fn entry(price_cents: i64, quantity: i32) -> CartEntry {
        let product = Product {
            id: ProductId::generate(),
            name: "Tee".to_owned(),
            description: String::new(),
            price: Price::from_cents(price_cents),
            image_url: String::new(),
            category: Category::Women,
            sizes: vec!["M".to_owned()],
            created_at: Utc::now(),
        };
        CartEntry {
            line: CartLine {
                id: CartLineId::generate(),
                owner: Identity::Anonymous(GuestToken::generate()),
                product_id: product.id,
                size: "M".to_owned(),
                quantity,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            product,
        }
    }

    #[test]
    fn subtotal_multiplies_price_by_quantity() {
        assert_eq!(entry(2000, 3).subtotal(), Decimal::new(6000, 2));
    }

    #[test]
    fn cart_total_sums_line_subtotals() {
        let entries = vec![entry(2000, 3), entry(5000, 1)];
        assert_eq!(cart_total(&entries), Decimal::new(11000, 2));
        assert_eq!(cart_total(&[]), Decimal::ZERO);
    }
}
