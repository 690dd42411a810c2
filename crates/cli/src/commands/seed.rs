//! Catalog seeding.
//!
//! Inserts a small demo catalog so a fresh install has something to browse.
//! Re-running is safe: products are matched by name and skipped if present.

use clothstore_core::Category;
use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    image_url: &'static str,
    category: Category,
    sizes: &'static [&'static str],
}

const ADULT_SIZES: &[&str] = &["XS", "S", "M", "L", "XL"];
const KID_SIZES: &[&str] = &["S", "M", "L"];

const CATALOG: &[SeedProduct] = &[
    SeedProduct {
        name: "Linen Shirt",
        description: "Breathable linen shirt for warm days.",
        price_cents: 2000,
        image_url: "https://images.clothstore.example/linen-shirt.jpg",
        category: Category::Men,
        sizes: ADULT_SIZES,
    },
    SeedProduct {
        name: "Denim Jacket",
        description: "Classic denim jacket with a relaxed fit.",
        price_cents: 5000,
        image_url: "https://images.clothstore.example/denim-jacket.jpg",
        category: Category::Men,
        sizes: ADULT_SIZES,
    },
    SeedProduct {
        name: "Wrap Dress",
        description: "Soft jersey wrap dress.",
        price_cents: 4500,
        image_url: "https://images.clothstore.example/wrap-dress.jpg",
        category: Category::Women,
        sizes: ADULT_SIZES,
    },
    SeedProduct {
        name: "Wool Cardigan",
        description: "Mid-weight merino cardigan.",
        price_cents: 6500,
        image_url: "https://images.clothstore.example/wool-cardigan.jpg",
        category: Category::Women,
        sizes: ADULT_SIZES,
    },
    SeedProduct {
        name: "Canvas Sneakers",
        description: "Everyday low-top sneakers.",
        price_cents: 3500,
        image_url: "https://images.clothstore.example/canvas-sneakers.jpg",
        category: Category::Kids,
        sizes: KID_SIZES,
    },
    SeedProduct {
        name: "Rain Parka",
        description: "Hooded parka with taped seams.",
        price_cents: 4000,
        image_url: "https://images.clothstore.example/rain-parka.jpg",
        category: Category::Kids,
        sizes: KID_SIZES,
    },
];

/// Seed the catalog with demo products.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or an insert fails.
pub async fn catalog() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("CLOTHSTORE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| SeedError::MissingEnvVar("CLOTHSTORE_DATABASE_URL"))?;

    let pool = PgPool::connect(&database_url).await?;

    let mut inserted = 0_u64;
    for product in CATALOG {
        let sizes: Vec<String> = product.sizes.iter().map(|s| (*s).to_owned()).collect();
        let result = sqlx::query(
            "INSERT INTO storefront.product (name, description, price, image_url, category, sizes) \
             SELECT $1, $2, $3, $4, $5, $6 \
             WHERE NOT EXISTS (SELECT 1 FROM storefront.product WHERE name = $1)",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(Decimal::new(product.price_cents, 2))
        .bind(product.image_url)
        .bind(product.category.as_str())
        .bind(&sizes)
        .execute(&pool)
        .await?;
        inserted += result.rows_affected();
    }

    tracing::info!(inserted, "catalog seeded");
    Ok(())
}
