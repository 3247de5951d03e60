//! Shared fixtures for the sync engine tests.

#![allow(dead_code)]

use std::sync::Arc;

use eco_commerce::catalog::CatalogEntry;
use eco_commerce::{Currency, Money, OwnerId, ProductId};
use eco_sync::{CartStore, CartSyncEngine, InMemoryCartRemote, InMemoryCatalog};

pub type TestEngine = CartSyncEngine<InMemoryCartRemote, InMemoryCatalog>;

pub fn owner() -> OwnerId {
    OwnerId::new("shopper-1")
}

pub fn product(id: &str) -> ProductId {
    ProductId::new(id)
}

/// Tote 15.00 rated 80, bottle 25.00 rated 60, straw 3.00 unrated.
pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_product(
            "tote",
            CatalogEntry::new("Organic Tote", Money::new(1_500, Currency::USD))
                .with_rating(80.0)
                .with_image("https://cdn.ecocart.test/tote.jpg"),
        )
        .with_product(
            "bottle",
            CatalogEntry::new("Steel Bottle", Money::new(2_500, Currency::USD)).with_rating(60.0),
        )
        .with_product("straw", CatalogEntry::new("Bamboo Straw", Money::new(300, Currency::USD)))
}

pub struct Harness {
    pub engine: Arc<TestEngine>,
    pub remote: Arc<InMemoryCartRemote>,
    pub catalog: Arc<InMemoryCatalog>,
    pub store: CartStore,
}

pub fn harness(remote: InMemoryCartRemote, catalog: InMemoryCatalog) -> Harness {
    let remote = Arc::new(remote);
    let catalog = Arc::new(catalog);
    let store = CartStore::new();
    let engine = Arc::new(CartSyncEngine::new(remote.clone(), catalog.clone(), store.clone()));
    Harness {
        engine,
        remote,
        catalog,
        store,
    }
}

/// Quantity of a product in the store, zero when absent.
pub fn quantity(store: &CartStore, id: &str) -> i64 {
    store.get_item(&product(id)).map_or(0, |item| item.quantity)
}
