//! Order placement pipeline against a live database.
//!
//! Run with: `cargo test -p clothstore-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use rust_decimal::Decimal;
use sqlx::PgPool;

use clothstore_core::{GuestToken, Identity, OrderStatus, UserId};
use clothstore_integration_tests::{insert_product, insert_profile, set_product_price, test_pool};
use clothstore_storefront::db::{OrderRepository, PlaceOrderError};
use clothstore_storefront::services::{
    CartEvents, CartService, CheckoutError, CheckoutService, Notifier,
};

async fn order_count(pool: &PgPool, user_id: UserId) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM storefront.customer_order WHERE user_id = $1")
        .bind(user_id.as_uuid())
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn placement_freezes_prices_and_empties_the_cart() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let notifier = Notifier::spawn(None);
    let cart = CartService::new(&pool, &events);
    let checkout = CheckoutService::new(&pool, &events, &notifier);

    let (user_id, _email) = insert_profile(&pool).await;
    let identity = Identity::Authenticated(user_id);

    // Cart: 3 x $20.00 + 1 x $50.00
    let shirt = insert_product(&pool, 2000, &["M"]).await;
    let jacket = insert_product(&pool, 5000, &["L"]).await;
    cart.add(&identity, shirt, "M", 3).await.unwrap();
    cart.add(&identity, jacket, "L", 1).await.unwrap();

    let placed = checkout.place_order(&identity).await.unwrap();

    assert_eq!(placed.order.user_id, user_id);
    assert_eq!(placed.order.status, OrderStatus::Confirmed);
    assert_eq!(placed.order.total_price.amount(), Decimal::new(11000, 2));
    assert_eq!(placed.lines.len(), 2);

    // Cart is empty afterwards
    assert_eq!(cart.count(&identity).await.unwrap(), 0);

    // The order history carries one line per cart line, prices copied
    let orders = OrderRepository::new(&pool).list_for_user(user_id).await.unwrap();
    assert_eq!(orders.len(), 1);
    let order = orders.first().unwrap();
    assert_eq!(order.lines.len(), 2);

    let mut prices: Vec<Decimal> = order
        .lines
        .iter()
        .map(|l| l.line.price_at_purchase.amount())
        .collect();
    prices.sort();
    assert_eq!(prices, vec![Decimal::new(2000, 2), Decimal::new(5000, 2)]);

    let quantities: i32 = order.lines.iter().map(|l| l.line.quantity).sum();
    assert_eq!(quantities, 4);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn historical_orders_are_immune_to_catalog_price_changes() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let notifier = Notifier::spawn(None);
    let cart = CartService::new(&pool, &events);
    let checkout = CheckoutService::new(&pool, &events, &notifier);

    let (user_id, _email) = insert_profile(&pool).await;
    let identity = Identity::Authenticated(user_id);

    let product = insert_product(&pool, 2000, &["M"]).await;
    cart.add(&identity, product, "M", 2).await.unwrap();

    let placed = checkout.place_order(&identity).await.unwrap();
    assert_eq!(placed.order.total_price.amount(), Decimal::new(4000, 2));

    // Reprice the product after the fact
    set_product_price(&pool, product, 9900).await;

    let orders = OrderRepository::new(&pool).list_for_user(user_id).await.unwrap();
    let order = orders.first().unwrap();
    assert_eq!(
        order.order.total_price.amount(),
        Decimal::new(4000, 2),
        "order total must not move with the catalog"
    );
    assert_eq!(
        order.lines.first().unwrap().line.price_at_purchase.amount(),
        Decimal::new(2000, 2),
        "line price must stay frozen"
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn placement_requires_an_authenticated_identity() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let notifier = Notifier::spawn(None);
    let checkout = CheckoutService::new(&pool, &events, &notifier);

    let guest = Identity::Anonymous(GuestToken::generate());
    let err = checkout.place_order(&guest).await.unwrap_err();
    assert!(matches!(err, CheckoutError::Unauthenticated));
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn placement_rejects_an_empty_cart() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let notifier = Notifier::spawn(None);
    let checkout = CheckoutService::new(&pool, &events, &notifier);

    let (user_id, _email) = insert_profile(&pool).await;
    let identity = Identity::Authenticated(user_id);

    let err = checkout.place_order(&identity).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Place(PlaceOrderError::EmptyCart)
    ));
    assert_eq!(order_count(&pool, user_id).await, 0);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn a_failed_line_insert_rolls_the_whole_placement_back() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let notifier = Notifier::spawn(None);
    let cart = CartService::new(&pool, &events);
    let checkout = CheckoutService::new(&pool, &events, &notifier);

    // Fault injection: refuse order_line inserts for the sentinel size. The
    // WHEN clause keeps every other test's rows out of the blast radius.
    sqlx::query(
        "CREATE OR REPLACE FUNCTION storefront.fail_order_line() RETURNS trigger AS $fn$ \
         BEGIN RAISE EXCEPTION 'fault injection'; END \
         $fn$ LANGUAGE plpgsql",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query(
        "CREATE OR REPLACE TRIGGER order_line_fault \
         BEFORE INSERT ON storefront.order_line \
         FOR EACH ROW WHEN (NEW.size = 'FAULT') \
         EXECUTE FUNCTION storefront.fail_order_line()",
    )
    .execute(&pool)
    .await
    .unwrap();

    let (user_id, _email) = insert_profile(&pool).await;
    let identity = Identity::Authenticated(user_id);
    let product = insert_product(&pool, 2000, &["FAULT"]).await;
    cart.add(&identity, product, "FAULT", 1).await.unwrap();

    let err = checkout.place_order(&identity).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Place(PlaceOrderError::Repository(_))
    ));

    // All-or-nothing: no order header survives and the cart is untouched
    assert_eq!(order_count(&pool, user_id).await, 0);
    assert_eq!(cart.count(&identity).await.unwrap(), 1);

    sqlx::query("DROP TRIGGER IF EXISTS order_line_fault ON storefront.order_line")
        .execute(&pool)
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn guest_lines_stay_with_the_token_after_sign_in() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let cart = CartService::new(&pool, &events);

    let token = GuestToken::generate();
    let guest = Identity::Anonymous(token.clone());
    let product = insert_product(&pool, 2000, &["M"]).await;
    cart.add(&guest, product, "M", 1).await.unwrap();

    // The same person signs in; the active identity switches to the account.
    let (user_id, _email) = insert_profile(&pool).await;
    let account = Identity::Authenticated(user_id);

    assert_eq!(cart.count(&account).await.unwrap(), 0, "account cart starts empty");
    assert_eq!(cart.count(&guest).await.unwrap(), 1, "token keeps its lines");
}
