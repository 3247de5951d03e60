//! End-to-end behaviour of the sync engine against the in-memory services.

mod common;

use std::time::Duration;

use common::{catalog, harness, owner, product, quantity};
use eco_commerce::checkout::{PricingPolicy, ShippingTier};
use eco_commerce::eco::{EcoBand, EcoPolicy};
use eco_commerce::{Currency, Money, OwnerId};
use eco_sync::{InMemoryCartRemote, InMemoryCatalog, RemoteCall, RemoteError, SyncError, SyncWarning};

#[tokio::test]
async fn test_refresh_enriches_every_line() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 2)
            .with_line("shopper-1", "straw", 1),
        catalog(),
    );

    let cart = h.engine.refresh(&owner()).await.unwrap();

    assert_eq!(cart.owner_id, owner());
    assert_eq!(cart.unique_item_count(), 2);
    let tote = cart.get_item(&product("tote")).unwrap();
    assert_eq!(tote.quantity, 2);
    assert_eq!(tote.snapshot.name, "Organic Tote");
    assert_eq!(tote.snapshot.price, Money::new(1_500, Currency::USD));
    assert_eq!(tote.snapshot.primary_image(), Some("https://cdn.ecocart.test/tote.jpg"));
    assert_eq!(cart.get_item(&product("straw")).unwrap().snapshot.sustainability_rating, None);

    assert_eq!(h.store.snapshot(), Some(cart));
    assert_eq!(h.store.item_count(), 3);
    assert_eq!(h.catalog.fetch_count(), 2);
}

#[tokio::test]
async fn test_refresh_purges_depleted_rows() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 0)
            .with_line("shopper-1", "straw", -2)
            .with_line("shopper-1", "bottle", 1),
        catalog(),
    );

    let cart = h.engine.refresh(&owner()).await.unwrap();

    assert_eq!(cart.unique_item_count(), 1);
    assert!(cart.get_item(&product("tote")).is_none());
    assert!(cart.get_item(&product("straw")).is_none());
    assert_eq!(quantity(&h.store, "bottle"), 1);

    let calls = h.remote.calls();
    assert!(calls.contains(&RemoteCall::Remove(owner(), product("tote"))));
    assert!(calls.contains(&RemoteCall::Remove(owner(), product("straw"))));
    assert_eq!(h.remote.lines(&owner()).len(), 1);
    // Depleted rows are never looked up.
    assert_eq!(h.catalog.fetch_count(), 1);
}

#[tokio::test]
async fn test_failed_purge_is_not_fatal() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 0)
            .with_line("shopper-1", "bottle", 2),
        catalog(),
    );
    h.remote.set_remove_failure(Some("maintenance"));

    let cart = h.engine.refresh(&owner()).await.unwrap();

    assert!(cart.get_item(&product("tote")).is_none());
    assert_eq!(quantity(&h.store, "bottle"), 2);
    // The zero row is still on the server; the next refresh retries.
    assert_eq!(h.remote.lines(&owner()).len(), 2);
}

#[tokio::test]
async fn test_view_failure_leaves_store_untouched() {
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "tote", 1), catalog());
    let before = h.engine.refresh(&owner()).await.unwrap();
    let generation = h.store.generation();

    h.remote.set_view_failure(Some("connection reset"));
    let result = h.engine.refresh(&owner()).await;

    assert_eq!(
        result,
        Err(SyncError::View {
            owner_id: owner(),
            source: RemoteError::Unavailable("connection reset".to_string()),
        })
    );
    assert_eq!(h.store.snapshot(), Some(before));
    assert_eq!(h.store.generation(), generation);
}

#[tokio::test]
async fn test_catalog_failure_is_fatal() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 1)
            .with_line("shopper-1", "bottle", 1),
        catalog(),
    );
    h.catalog.set_failing("bottle", true);

    let result = h.engine.refresh(&owner()).await;

    assert!(matches!(
        result,
        Err(SyncError::Catalog { ref product_id, .. }) if *product_id == product("bottle")
    ));
    assert!(!h.store.is_loaded());
    assert_eq!(h.store.generation(), 0);
}

#[tokio::test]
async fn test_unknown_product_is_fatal() {
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "mystery", 1), catalog());

    let result = h.engine.refresh(&owner()).await;

    assert!(matches!(
        result,
        Err(SyncError::Catalog {
            source: RemoteError::NotFound(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_negative_catalog_price_is_rejected() {
    let catalog = InMemoryCatalog::new().with_product(
        "refund",
        eco_commerce::catalog::CatalogEntry::new("Refund", Money::new(-100, Currency::USD)),
    );
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "refund", 1), catalog);

    assert!(matches!(h.engine.refresh(&owner()).await, Err(SyncError::Commerce(_))));
    assert!(!h.store.is_loaded());
}

#[tokio::test]
async fn test_add_applies_signed_deltas() {
    let h = harness(InMemoryCartRemote::new(), catalog());

    let update = h.engine.add(&owner(), &product("tote"), 2, false).await.unwrap();
    assert!(update.is_clean());
    assert_eq!(update.cart.get_item(&product("tote")).unwrap().quantity, 2);

    h.engine.add(&owner(), &product("tote"), 3, false).await.unwrap();
    assert_eq!(quantity(&h.store, "tote"), 5);

    h.engine.add(&owner(), &product("tote"), -1, false).await.unwrap();
    assert_eq!(quantity(&h.store, "tote"), 4);
}

#[tokio::test]
async fn test_rejected_add_returns_warning_and_accurate_cart() {
    let h = harness(InMemoryCartRemote::new().with_stock("tote", 2), catalog());

    h.engine.add(&owner(), &product("tote"), 2, false).await.unwrap();
    let update = h.engine.add(&owner(), &product("tote"), 1, false).await.unwrap();

    assert!(!update.is_clean());
    assert_eq!(update.warnings.len(), 1);
    assert!(matches!(
        &update.warnings[0],
        SyncWarning::AddRejected {
            quantity: 1,
            reason: RemoteError::InsufficientStock { available: 2, .. },
            ..
        }
    ));
    assert_eq!(update.warnings[0].product_id(), &product("tote"));
    // The refresh still ran and reflects what the server holds.
    assert_eq!(quantity(&h.store, "tote"), 2);
    assert_eq!(h.remote.calls().last(), Some(&RemoteCall::View(owner())));
}

#[tokio::test]
async fn test_add_with_delete_flag_removes_line() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 3)
            .with_line("shopper-1", "bottle", 1),
        catalog(),
    );

    let update = h.engine.add(&owner(), &product("tote"), 7, true).await.unwrap();

    assert!(update.is_clean());
    assert!(update.cart.get_item(&product("tote")).is_none());
    assert_eq!(quantity(&h.store, "bottle"), 1);
    assert_eq!(
        h.remote.calls(),
        vec![RemoteCall::Remove(owner(), product("tote")), RemoteCall::View(owner())]
    );
}

#[tokio::test]
async fn test_remove_failure_returns_warning() {
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "tote", 1), catalog());
    h.engine.refresh(&owner()).await.unwrap();
    h.remote.set_remove_failure(Some("timeout"));

    let update = h.engine.remove(&owner(), &product("tote")).await.unwrap();

    assert_eq!(
        update.warnings,
        vec![SyncWarning::RemoveFailed {
            product_id: product("tote"),
            reason: RemoteError::Unavailable("timeout".to_string()),
        }]
    );
    assert_eq!(quantity(&h.store, "tote"), 1);
}

#[tokio::test]
async fn test_remove_missing_line_is_clean() {
    let h = harness(InMemoryCartRemote::new(), catalog());

    let update = h.engine.remove(&owner(), &product("tote")).await.unwrap();

    assert!(update.is_clean());
    assert!(update.cart.is_empty());
}

#[tokio::test]
async fn test_decrement_steps_down_then_removes() {
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "tote", 2), catalog());

    // Nothing loaded yet: the engine reads the cart before deciding.
    h.engine.decrement(&owner(), &product("tote")).await.unwrap();
    assert_eq!(quantity(&h.store, "tote"), 1);
    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::View(owner()),
            RemoteCall::Add(owner(), product("tote"), -1),
            RemoteCall::View(owner()),
        ]
    );

    h.engine.decrement(&owner(), &product("tote")).await.unwrap();
    assert_eq!(quantity(&h.store, "tote"), 0);
    assert!(h.remote.lines(&owner()).is_empty());
}

#[tokio::test]
async fn test_overlapping_mutations_apply_in_call_order() {
    let h = harness(
        InMemoryCartRemote::new().with_latency(Duration::from_millis(20)),
        catalog(),
    );

    let owner = owner();
    let tote = product("tote");
    let bottle = product("bottle");
    let (first, second) = tokio::join!(
        h.engine.add(&owner, &tote, 1, false),
        h.engine.add(&owner, &bottle, 1, false),
    );
    first.unwrap();
    let second = second.unwrap();

    // Each mutation is followed by its own refresh before the next begins.
    assert_eq!(
        h.remote.calls(),
        vec![
            RemoteCall::Add(owner.clone(), tote, 1),
            RemoteCall::View(owner.clone()),
            RemoteCall::Add(owner.clone(), bottle, 1),
            RemoteCall::View(owner),
        ]
    );
    assert_eq!(second.cart.unique_item_count(), 2);
    assert_eq!(h.store.snapshot(), Some(second.cart));
}

#[tokio::test]
async fn test_overlapping_decrements_both_count() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_latency(Duration::from_millis(10))
            .with_line("shopper-1", "tote", 2),
        catalog(),
    );
    h.engine.refresh(&owner()).await.unwrap();

    let owner = owner();
    let tote = product("tote");
    let (first, second) = tokio::join!(
        h.engine.decrement(&owner, &tote),
        h.engine.decrement(&owner, &tote),
    );
    first.unwrap();
    second.unwrap();

    assert_eq!(quantity(&h.store, "tote"), 0);
    assert!(h.remote.lines(&owner).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_spawned_operations_share_one_engine() {
    let h = harness(InMemoryCartRemote::new(), catalog());

    let handles: Vec<_> = ["tote", "bottle", "straw"]
        .into_iter()
        .map(|id| {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.add(&owner(), &product(id), 1, false).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.store.item_count(), 3);
    let calls = h.remote.calls();
    assert_eq!(calls.len(), 6);
    for pair in calls.chunks(2) {
        assert!(matches!(pair[0], RemoteCall::Add(..)));
        assert_eq!(pair[1], RemoteCall::View(owner()));
    }
}

#[tokio::test]
async fn test_catalog_fetches_run_concurrently() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 1)
            .with_line("shopper-1", "bottle", 1)
            .with_line("shopper-1", "straw", 1),
        catalog().with_latency(Duration::from_millis(30)),
    );

    h.engine.refresh(&owner()).await.unwrap();

    assert_eq!(h.catalog.fetch_count(), 3);
    assert_eq!(h.catalog.max_concurrent_fetches(), 3);
}

#[tokio::test]
async fn test_refresh_for_another_owner_replaces_cart() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 1)
            .with_line("shopper-2", "bottle", 4),
        catalog(),
    );
    let other = OwnerId::new("shopper-2");

    h.engine.refresh(&owner()).await.unwrap();
    h.engine.refresh(&other).await.unwrap();

    assert_eq!(h.store.owner_id(), Some(other));
    assert_eq!(quantity(&h.store, "tote"), 0);
    assert_eq!(quantity(&h.store, "bottle"), 4);
}

#[tokio::test]
async fn test_reset_clears_store_only() {
    let h = harness(InMemoryCartRemote::new().with_line("shopper-1", "tote", 1), catalog());
    h.engine.refresh(&owner()).await.unwrap();
    let generation = h.store.generation();

    h.engine.reset().await;

    assert!(!h.store.is_loaded());
    assert_eq!(h.store.generation(), generation + 1);
    assert_eq!(h.remote.lines(&owner()).len(), 1);
}

#[tokio::test]
async fn test_summary_follows_refreshed_cart() {
    let h = harness(
        InMemoryCartRemote::new()
            .with_line("shopper-1", "tote", 2)
            .with_line("shopper-1", "straw", 1),
        catalog(),
    );
    h.engine.refresh(&owner()).await.unwrap();

    let summary = h
        .store
        .summary(
            ShippingTier::Standard,
            &Money::new(100, Currency::USD),
            &PricingPolicy::default(),
            &EcoPolicy::default(),
        )
        .unwrap();

    // 2 x 15.00 + 3.00
    assert_eq!(summary.pricing.subtotal.amount_cents, 3_300);
    assert_eq!(summary.pricing.shipping.cost.amount_cents, 7_399);
    assert_eq!(summary.pricing.total.amount_cents, 10_799);
    // mean(80, 30) = 55, and 1.00 / 33.00 clears the 3% rung.
    assert_eq!(summary.eco.base, 55);
    assert_eq!(summary.eco.improvement, 20);
    assert_eq!(summary.eco.score, 75);
    assert_eq!(summary.eco.band(), EcoBand::High);
    assert_eq!(summary.item_count, 3);
}

#[tokio::test]
async fn test_summary_crosses_free_shipping_threshold() {
    let h = harness(InMemoryCartRemote::new(), catalog());
    let pricing = PricingPolicy::default();

    h.engine.add(&owner(), &product("bottle"), 19, false).await.unwrap();
    let below = h
        .store
        .summary(ShippingTier::Free, &Money::zero(Currency::USD), &pricing, &EcoPolicy::default())
        .unwrap();
    assert_eq!(below.pricing.shipping.tier, ShippingTier::Standard);

    h.engine.add(&owner(), &product("bottle"), 1, false).await.unwrap();
    let at = h
        .store
        .summary(ShippingTier::Express, &Money::zero(Currency::USD), &pricing, &EcoPolicy::default())
        .unwrap();
    // 20 x 25.00 = 500.00, exactly the threshold.
    assert_eq!(at.pricing.shipping.tier, ShippingTier::Free);
    assert_eq!(at.pricing.total.amount_cents, 50_000);
}
