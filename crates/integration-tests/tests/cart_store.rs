//! Cart store invariants against a live database.
//!
//! Run with: `cargo test -p clothstore-integration-tests -- --ignored`

#![allow(clippy::unwrap_used)]

use clothstore_core::{CartLineId, GuestToken, Identity};
use clothstore_integration_tests::{insert_product, test_pool};
use clothstore_storefront::services::{CartError, CartEvents, CartService};

fn guest() -> Identity {
    Identity::Anonymous(GuestToken::generate())
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn readding_the_same_product_and_size_merges_into_one_line() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["S", "M", "L"]).await;

    service.add(&owner, product, "M", 2).await.unwrap();
    service.add(&owner, product, "M", 1).await.unwrap();

    let entries = service.list(&owner).await.unwrap();
    assert_eq!(entries.len(), 1, "one line per (owner, product, size)");
    let entry = entries.first().unwrap();
    assert_eq!(entry.line.quantity, 3, "quantities merge, rows do not");
    assert_eq!(entry.line.size, "M");
    assert_eq!(entry.line.product_id, product);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn different_sizes_get_their_own_lines() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["S", "M", "L"]).await;

    service.add(&owner, product, "M", 1).await.unwrap();
    service.add(&owner, product, "L", 1).await.unwrap();

    let entries = service.list(&owner).await.unwrap();
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn carts_are_scoped_to_their_identity() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner_a = guest();
    let owner_b = guest();
    let product = insert_product(&pool, 2000, &["M"]).await;

    service.add(&owner_a, product, "M", 1).await.unwrap();

    assert_eq!(service.list(&owner_a).await.unwrap().len(), 1);
    assert!(service.list(&owner_b).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn set_quantity_below_one_is_a_silent_noop() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["M"]).await;
    let line = service.add(&owner, product, "M", 2).await.unwrap();

    let changed = service.set_quantity(&owner, line.id, 0).await.unwrap();
    assert!(!changed, "below-1 must be refused");

    let entries = service.list(&owner).await.unwrap();
    assert_eq!(entries.first().unwrap().line.quantity, 2, "unchanged");

    let changed = service.set_quantity(&owner, line.id, 5).await.unwrap();
    assert!(changed);
    let entries = service.list(&owner).await.unwrap();
    assert_eq!(entries.first().unwrap().line.quantity, 5, "exactly q");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn remove_is_idempotent() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["M"]).await;
    let line = service.add(&owner, product, "M", 1).await.unwrap();

    service.remove(&owner, line.id).await.unwrap();
    assert!(service.list(&owner).await.unwrap().is_empty());

    // Removing again (or removing a line that never existed) is not an error.
    service.remove(&owner, line.id).await.unwrap();
    service
        .remove(&owner, CartLineId::generate())
        .await
        .unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn add_rejects_bad_size_and_quantity_before_writing() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["S", "M"]).await;

    let err = service.add(&owner, product, "XL", 1).await.unwrap_err();
    assert!(matches!(err, CartError::InvalidSize { .. }));

    let err = service.add(&owner, product, "M", 0).await.unwrap_err();
    assert!(matches!(err, CartError::InvalidQuantity(0)));

    assert!(
        service.list(&owner).await.unwrap().is_empty(),
        "rejected adds must not write"
    );
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn badge_count_tracks_distinct_lines_through_mutations() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);
    let mut rx = events.subscribe();

    let owner = guest();
    let product_a = insert_product(&pool, 2000, &["M"]).await;
    let product_b = insert_product(&pool, 3000, &["L"]).await;

    service.add(&owner, product_a, "M", 2).await.unwrap();
    assert_eq!(service.count(&owner).await.unwrap(), 1);

    // Merging does not create a second line, so the badge stays at 1
    service.add(&owner, product_a, "M", 3).await.unwrap();
    assert_eq!(service.count(&owner).await.unwrap(), 1);

    service.add(&owner, product_b, "L", 1).await.unwrap();
    assert_eq!(service.count(&owner).await.unwrap(), 2);

    let entries = service.list(&owner).await.unwrap();
    assert_eq!(
        service.count(&owner).await.unwrap(),
        i64::try_from(entries.len()).unwrap(),
        "badge equals list().len()"
    );

    // One event per mutation
    for _ in 0..3 {
        let event = rx.recv().await.unwrap();
        assert_eq!(event.owner_key, owner.owner_key());
    }
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn clear_empties_the_cart() {
    let pool = test_pool().await;
    let events = CartEvents::default();
    let service = CartService::new(&pool, &events);

    let owner = guest();
    let product = insert_product(&pool, 2000, &["S", "M"]).await;
    service.add(&owner, product, "S", 1).await.unwrap();
    service.add(&owner, product, "M", 1).await.unwrap();

    let removed = service.clear(&owner).await.unwrap();
    assert_eq!(removed, 2);
    assert_eq!(service.count(&owner).await.unwrap(), 0);
}
