//! Integration test support for ClothStore.
//!
//! # Running Tests
//!
//! These tests need a live `PostgreSQL` and are `#[ignore]`d by default:
//!
//! ```bash
//! # Point the tests at a scratch database
//! export CLOTHSTORE_TEST_DATABASE_URL=postgres://localhost/clothstore_test
//!
//! # Run them
//! cargo test -p clothstore-integration-tests -- --ignored
//! ```
//!
//! Each test creates its own uniquely-named products and profiles, so tests
//! can run against a shared database without clobbering each other.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use clothstore_core::{Category, Email, ProductId, UserId};

/// Connect to the test database and bring the schema up to date.
///
/// Reads `CLOTHSTORE_TEST_DATABASE_URL`, falling back to
/// `CLOTHSTORE_DATABASE_URL`.
///
/// # Panics
///
/// Panics if no database URL is configured or the connection/migration fails;
/// these tests only run when explicitly asked for.
pub async fn test_pool() -> PgPool {
    dotenvy::dotenv().ok();

    let url = std::env::var("CLOTHSTORE_TEST_DATABASE_URL")
        .or_else(|_| std::env::var("CLOTHSTORE_DATABASE_URL"))
        .expect("set CLOTHSTORE_TEST_DATABASE_URL to run integration tests");

    let pool = PgPool::connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("../storefront/migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    pool
}

/// Insert a product with a unique name and return its id.
pub async fn insert_product(
    pool: &PgPool,
    price_cents: i64,
    sizes: &[&str],
) -> ProductId {
    let name = format!("Test Product {}", Uuid::new_v4());
    let sizes: Vec<String> = sizes.iter().map(|s| (*s).to_owned()).collect();

    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO storefront.product (name, description, price, image_url, category, sizes) \
         VALUES ($1, $2, $3, $4, $5, $6) RETURNING id",
    )
    .bind(&name)
    .bind("integration test product")
    .bind(Decimal::new(price_cents, 2))
    .bind("https://images.clothstore.example/test.jpg")
    .bind(Category::Men.as_str())
    .bind(&sizes)
    .fetch_one(pool)
    .await
    .expect("failed to insert product");

    ProductId::new(id)
}

/// Update a product's catalog price.
pub async fn set_product_price(pool: &PgPool, product_id: ProductId, price_cents: i64) {
    sqlx::query("UPDATE storefront.product SET price = $2 WHERE id = $1")
        .bind(product_id.as_uuid())
        .bind(Decimal::new(price_cents, 2))
        .execute(pool)
        .await
        .expect("failed to update product price");
}

/// Insert a profile with a unique email and return its id and email.
pub async fn insert_profile(pool: &PgPool) -> (UserId, Email) {
    let id = UserId::generate();
    let email = Email::parse(&format!("shopper-{}@clothstore.example", id.as_uuid()))
        .expect("generated email is valid");

    sqlx::query("INSERT INTO storefront.profile (id, name, email) VALUES ($1, $2, $3)")
        .bind(id.as_uuid())
        .bind("Test Shopper")
        .bind(email.as_str())
        .execute(pool)
        .await
        .expect("failed to insert profile");

    (id, email)
}
