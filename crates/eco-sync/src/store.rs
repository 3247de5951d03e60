//! Shared container for the current enriched cart.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use eco_commerce::cart::CartLineItem;
use eco_commerce::checkout::{PricingPolicy, ShippingTier};
use eco_commerce::eco::EcoPolicy;
use eco_commerce::{Cart, CartSummary, CommerceError, Money, OwnerId, ProductId};
use parking_lot::RwLock;

/// Holds the cart the sync engine last read from the remote.
///
/// Cloning a `CartStore` yields another handle to the same cart. Readers
/// only ever see cloned snapshots; the write half is crate-private so the
/// sync engine is its sole writer.
#[derive(Debug, Clone, Default)]
pub struct CartStore {
    inner: Arc<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    cart: RwLock<Option<Cart>>,
    generation: AtomicU64,
}

impl CartStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current cart, if one has been loaded.
    pub fn snapshot(&self) -> Option<Cart> {
        self.inner.cart.read().clone()
    }

    /// Whether a cart has been loaded since creation or the last reset.
    pub fn is_loaded(&self) -> bool {
        self.inner.cart.read().is_some()
    }

    /// Owner of the loaded cart.
    pub fn owner_id(&self) -> Option<OwnerId> {
        self.inner.cart.read().as_ref().map(|c| c.owner_id.clone())
    }

    /// Copy of one line.
    pub fn get_item(&self, product_id: &ProductId) -> Option<CartLineItem> {
        self.inner
            .cart
            .read()
            .as_ref()
            .and_then(|c| c.get_item(product_id).cloned())
    }

    /// Sum of line quantities, zero when nothing is loaded.
    pub fn item_count(&self) -> i64 {
        self.inner.cart.read().as_ref().map_or(0, Cart::item_count)
    }

    /// Number of times the cart has been replaced or cleared.
    ///
    /// Presentation layers poll this to know when to re-render.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }

    /// Pricing and Eco-Meter for the current snapshot.
    ///
    /// An unloaded store is summarized as an empty cart.
    pub fn summary(
        &self,
        selected: ShippingTier,
        donation: &Money,
        pricing_policy: &PricingPolicy,
        eco_policy: &EcoPolicy,
    ) -> Result<CartSummary, CommerceError> {
        let cart = self.snapshot().unwrap_or_default();
        CartSummary::compute(&cart, selected, donation, pricing_policy, eco_policy)
    }

    /// Replace the cart wholesale.
    pub(crate) fn replace(&self, cart: Cart) {
        *self.inner.cart.write() = Some(cart);
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Drop the cart (session teardown).
    pub(crate) fn clear(&self) {
        *self.inner.cart.write() = None;
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_commerce::catalog::ProductSnapshot;
    use eco_commerce::{CartId, Currency};

    fn cart(owner: &str, quantity: i64) -> Cart {
        Cart::with_items(
            CartId::new("cart-1"),
            OwnerId::new(owner),
            vec![CartLineItem::new(
                ProductId::new("tote"),
                quantity,
                ProductSnapshot {
                    name: "Tote".to_string(),
                    price: Money::new(1_000, Currency::USD),
                    images: Vec::new(),
                    sustainability_rating: Some(80.0),
                },
            )],
        )
    }

    #[test]
    fn test_new_store_is_empty() {
        let store = CartStore::new();
        assert!(!store.is_loaded());
        assert_eq!(store.item_count(), 0);
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn test_replace_is_visible_through_clones() {
        let store = CartStore::new();
        let reader = store.clone();

        store.replace(cart("u1", 3));
        assert_eq!(reader.item_count(), 3);
        assert_eq!(reader.owner_id(), Some(OwnerId::new("u1")));
        assert_eq!(reader.generation(), 1);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let store = CartStore::new();
        store.replace(cart("u1", 3));

        let mut snapshot = store.snapshot().unwrap();
        snapshot.items.clear();
        assert_eq!(store.item_count(), 3);
    }

    #[test]
    fn test_clear() {
        let store = CartStore::new();
        store.replace(cart("u1", 1));
        store.clear();
        assert!(store.snapshot().is_none());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn test_summary_of_loaded_and_unloaded_store() {
        let store = CartStore::new();
        let zero = Money::zero(Currency::USD);
        let pricing = PricingPolicy::default();
        let eco = EcoPolicy::default();

        let empty = store.summary(ShippingTier::Standard, &zero, &pricing, &eco).unwrap();
        assert_eq!(empty.eco.score, 0);
        assert_eq!(empty.pricing.total.amount_cents, 7_399);

        store.replace(cart("u1", 3));
        let summary = store.summary(ShippingTier::Standard, &zero, &pricing, &eco).unwrap();
        assert_eq!(summary.pricing.total.amount_cents, 10_399);
        assert_eq!(summary.eco.score, 80);
    }

    #[test]
    fn test_summary_of_empty_store_in_other_currency() {
        let store = CartStore::new();
        let pricing = PricingPolicy::default();
        let eco = EcoPolicy::default();

        let empty = store
            .summary(ShippingTier::Standard, &Money::zero(Currency::EUR), &pricing, &eco)
            .unwrap();
        assert_eq!(empty.pricing.subtotal, Money::zero(Currency::EUR));
        assert_eq!(empty.pricing.total, Money::new(7_399, Currency::EUR));
        assert_eq!(empty.eco.score, 0);

        let donated = store
            .summary(ShippingTier::Standard, &Money::new(300, Currency::EUR), &pricing, &eco)
            .unwrap();
        assert_eq!(donated.pricing.total, Money::new(7_699, Currency::EUR));
        assert!(donated.eco.improvement > 0);
    }
}
