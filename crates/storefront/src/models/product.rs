//! Catalog product domain types.
//!
//! Products are read-only for the storefront; the catalog is mutated only by
//! the seeding CLI and external management tooling.

use chrono::{DateTime, Utc};
use clothstore_core::{Category, Price, ProductId};

/// A catalog entry.
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Long-form description.
    pub description: String,
    /// Current catalog price. Orders copy this value at placement time and
    /// never read it again.
    pub price: Price,
    /// Image location for display.
    pub image_url: String,
    /// Department the product belongs to.
    pub category: Category,
    /// Available sizes, in display order. Never empty.
    pub sizes: Vec<String>,
    /// When the product entered the catalog.
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether `size` is one of this product's available sizes.
    #[must_use]
    pub fn has_size(&self, size: &str) -> bool {
        self.sizes.iter().any(|s| s == size)
    }
}

/// Filters for the paged catalog listing.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilter {
    /// Case-insensitive substring match against name or description.
    pub search: Option<String>,
    /// Restrict to one department.
    pub category: Option<Category>,
    /// Keep only products offered in this size.
    pub size: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<Price>,
    /// Inclusive upper price bound.
    pub max_price: Option<Price>,
    /// 1-based page number.
    pub page: u32,
}

impl CatalogFilter {
    /// Products per listing page.
    pub const PER_PAGE: u32 = 12;

    /// Row offset for the requested page.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (Self::PER_PAGE as i64)
    }
}

/// One page of catalog results.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    /// Products on this page, newest first.
    pub products: Vec<Product>,
    /// Total matching products across all pages (before the size filter).
    pub total: i64,
}

impl CatalogPage {
    /// Number of pages needed for the full result set.
    #[must_use]
    pub const fn total_pages(&self) -> u32 {
        let per_page = CatalogFilter::PER_PAGE as i64;
        let pages = self.total.div_ceil(per_page);
        if pages < 1 { 1 } else { pages as u32 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(sizes: &[&str]) -> Product {
        Product {
            id: ProductId::generate(),
            name: "Linen Shirt".to_owned(),
            description: "A shirt".to_owned(),
            price: Price::from_cents(2000),
            image_url: "https://img.example/shirt.jpg".to_owned(),
            category: Category::Men,
            sizes: sizes.iter().map(|s| (*s).to_owned()).collect(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn has_size_matches_exactly() {
        let p = product(&["S", "M", "L"]);
        assert!(p.has_size("M"));
        assert!(!p.has_size("XL"));
        assert!(!p.has_size("m"));
    }

    #[test]
    fn filter_offset_is_zero_based_per_page() {
        let mut filter = CatalogFilter { page: 1, ..CatalogFilter::default() };
        assert_eq!(filter.offset(), 0);
        filter.page = 3;
        assert_eq!(filter.offset(), 24);
        // Page 0 is treated as page 1
        filter.page = 0;
        assert_eq!(filter.offset(), 0);
    }

    #[test]
    fn page_count_rounds_up_and_floors_at_one() {
        let page = |total| CatalogPage { products: Vec::new(), total };
        assert_eq!(page(0).total_pages(), 1);
        assert_eq!(page(12).total_pages(), 1);
        assert_eq!(page(13).total_pages(), 2);
        assert_eq!(page(25).total_pages(), 3);
    }
}
