//! In-memory cart service and catalog.
//!
//! Used by the CLI's simulations and by tests. Behaviour mirrors the remote
//! service: carts appear on first view, adds take signed deltas and are
//! checked against stock, and a line decremented to zero stays on the
//! server as a zero row until someone removes it.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eco_commerce::cart::{RemoteCartLine, RemoteCartView};
use eco_commerce::catalog::CatalogEntry;
use eco_commerce::{CartId, OwnerId, ProductId};
use parking_lot::Mutex;

use crate::client::{CartRemoteClient, ProductCatalogClient, RemoteError};

/// A call observed by [`InMemoryCartRemote`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    View(OwnerId),
    Add(OwnerId, ProductId, i64),
    Remove(OwnerId, ProductId),
}

#[derive(Debug, Default)]
struct RemoteState {
    carts: HashMap<OwnerId, RemoteCartView>,
    stock: HashMap<ProductId, i64>,
    calls: Vec<RemoteCall>,
    fail_view: Option<String>,
    fail_remove: Option<String>,
}

/// In-memory cart service.
#[derive(Debug, Default)]
pub struct InMemoryCartRemote {
    state: Mutex<RemoteState>,
    latency: Option<Duration>,
}

impl InMemoryCartRemote {
    /// Create an empty service with unlimited stock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call, to widen interleaving windows in tests.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Cap the quantity of a product any single cart may hold.
    pub fn with_stock(self, product_id: impl Into<ProductId>, available: i64) -> Self {
        self.state.lock().stock.insert(product_id.into(), available);
        self
    }

    /// Seed a cart line as-is, including zero or negative quantities.
    pub fn with_line(self, owner_id: impl Into<OwnerId>, product_id: impl Into<ProductId>, quantity: i64) -> Self {
        {
            let mut state = self.state.lock();
            let cart = cart_for(&mut state.carts, &owner_id.into());
            cart.items.push(RemoteCartLine::new(product_id, quantity));
        }
        self
    }

    /// Make view calls fail until cleared with `None`.
    pub fn set_view_failure(&self, reason: Option<&str>) {
        self.state.lock().fail_view = reason.map(str::to_string);
    }

    /// Make remove calls fail until cleared with `None`.
    pub fn set_remove_failure(&self, reason: Option<&str>) {
        self.state.lock().fail_remove = reason.map(str::to_string);
    }

    /// Change the stock of a product.
    pub fn set_stock(&self, product_id: impl Into<ProductId>, available: i64) {
        self.state.lock().stock.insert(product_id.into(), available);
    }

    /// Raw server-side lines for an owner, zero rows included.
    pub fn lines(&self, owner_id: &OwnerId) -> Vec<RemoteCartLine> {
        self.state
            .lock()
            .carts
            .get(owner_id)
            .map(|c| c.items.clone())
            .unwrap_or_default()
    }

    /// Every call received so far.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    async fn pause(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

fn cart_for<'a>(carts: &'a mut HashMap<OwnerId, RemoteCartView>, owner_id: &OwnerId) -> &'a mut RemoteCartView {
    carts.entry(owner_id.clone()).or_insert_with(|| RemoteCartView {
        id: CartId::generate(),
        items: Vec::new(),
    })
}

#[async_trait]
impl CartRemoteClient for InMemoryCartRemote {
    async fn view(&self, owner_id: &OwnerId) -> Result<RemoteCartView, RemoteError> {
        self.state.lock().calls.push(RemoteCall::View(owner_id.clone()));
        self.pause().await;

        let mut state = self.state.lock();
        if let Some(reason) = &state.fail_view {
            return Err(RemoteError::Unavailable(reason.clone()));
        }
        Ok(cart_for(&mut state.carts, owner_id).clone())
    }

    async fn add(&self, owner_id: &OwnerId, product_id: &ProductId, quantity: i64) -> Result<(), RemoteError> {
        self.state
            .lock()
            .calls
            .push(RemoteCall::Add(owner_id.clone(), product_id.clone(), quantity));
        self.pause().await;

        let mut state = self.state.lock();
        let available = state.stock.get(product_id).copied();
        let cart = cart_for(&mut state.carts, owner_id);
        let current = cart
            .items
            .iter()
            .find(|l| &l.product_id == product_id)
            .map_or(0, |l| l.quantity);
        let requested = current.saturating_add(quantity);

        if let Some(available) = available {
            if quantity > 0 && requested > available {
                return Err(RemoteError::InsufficientStock {
                    product_id: product_id.clone(),
                    requested,
                    available,
                });
            }
        }

        let stored = requested.max(0);
        match cart.items.iter_mut().find(|l| &l.product_id == product_id) {
            Some(line) => line.quantity = stored,
            None if quantity > 0 => cart.items.push(RemoteCartLine::new(product_id.clone(), stored)),
            None => {}
        }
        Ok(())
    }

    async fn remove(&self, owner_id: &OwnerId, product_id: &ProductId) -> Result<(), RemoteError> {
        self.state
            .lock()
            .calls
            .push(RemoteCall::Remove(owner_id.clone(), product_id.clone()));
        self.pause().await;

        let mut state = self.state.lock();
        if let Some(reason) = &state.fail_remove {
            return Err(RemoteError::Unavailable(reason.clone()));
        }
        if let Some(cart) = state.carts.get_mut(owner_id) {
            cart.items.retain(|l| &l.product_id != product_id);
        }
        Ok(())
    }
}

/// In-memory product catalog.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    products: Mutex<HashMap<ProductId, CatalogEntry>>,
    failing: Mutex<HashSet<ProductId>>,
    latency: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fetches: AtomicUsize,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every fetch.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Add or replace a product.
    pub fn with_product(self, product_id: impl Into<ProductId>, entry: CatalogEntry) -> Self {
        self.insert(product_id, entry);
        self
    }

    /// Add or replace a product.
    pub fn insert(&self, product_id: impl Into<ProductId>, entry: CatalogEntry) {
        self.products.lock().insert(product_id.into(), entry);
    }

    /// Make fetches of one product fail (or succeed again).
    pub fn set_failing(&self, product_id: impl Into<ProductId>, failing: bool) {
        let product_id = product_id.into();
        let mut set = self.failing.lock();
        if failing {
            set.insert(product_id);
        } else {
            set.remove(&product_id);
        }
    }

    /// Total fetches served or failed.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Highest number of fetches observed running at once.
    pub fn max_concurrent_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductCatalogClient for InMemoryCatalog {
    async fn fetch(&self, product_id: &ProductId) -> Result<CatalogEntry, RemoteError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing.lock().contains(product_id) {
            return Err(RemoteError::Unavailable(format!("catalog lookup for {} failed", product_id)));
        }
        self.products
            .lock()
            .get(product_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(product_id.to_string()))
    }
}
