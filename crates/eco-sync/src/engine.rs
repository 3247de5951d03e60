//! Cart synchronization engine.
//!
//! Every public operation ends by re-reading the remote cart and replacing
//! the store wholesale; the local cart is never patched in place. Operations
//! on one engine are serialized, so callers that fire several mutations
//! without awaiting each one still observe them applied in call order.

use std::sync::Arc;

use eco_commerce::cart::{CartLineItem, RemoteCartLine};
use eco_commerce::catalog::ProductSnapshot;
use eco_commerce::{Cart, OwnerId, ProductId};
use futures::future::try_join_all;
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::client::{CartRemoteClient, ProductCatalogClient};
use crate::error::{SyncError, SyncWarning};
use crate::store::CartStore;

/// Result of a mutating operation: the refreshed cart plus anything the
/// caller should surface to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartUpdate {
    pub cart: Cart,
    #[serde(serialize_with = "serialize_warnings")]
    pub warnings: Vec<SyncWarning>,
}

impl CartUpdate {
    /// True when the remote accepted every change.
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

fn serialize_warnings<S: serde::Serializer>(warnings: &[SyncWarning], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(warnings.iter().map(ToString::to_string))
}

/// Keeps a [`CartStore`] in step with the remote cart.
pub struct CartSyncEngine<R, C> {
    remote: Arc<R>,
    catalog: Arc<C>,
    store: CartStore,
    /// Held for the whole of each public operation.
    turn: Mutex<()>,
}

impl<R, C> CartSyncEngine<R, C>
where
    R: CartRemoteClient,
    C: ProductCatalogClient,
{
    /// Create an engine writing into `store`.
    pub fn new(remote: Arc<R>, catalog: Arc<C>, store: CartStore) -> Self {
        Self {
            remote,
            catalog,
            store,
            turn: Mutex::new(()),
        }
    }

    /// Read handle to the store this engine writes.
    pub fn store(&self) -> &CartStore {
        &self.store
    }

    /// Rebuild the store from the remote cart.
    ///
    /// Zero and negative rows are removed remotely and left out. All other
    /// rows are enriched from the catalog concurrently. On any error the
    /// store keeps its previous cart.
    #[instrument(skip_all, fields(owner_id = %owner_id))]
    pub async fn refresh(&self, owner_id: &OwnerId) -> Result<Cart, SyncError> {
        let _turn = self.turn.lock().await;
        self.refresh_locked(owner_id).await
    }

    /// Apply a signed quantity delta, or remove the line when `delete` is set.
    ///
    /// A rejected delta is reported as a warning, not an error; the cart is
    /// refreshed either way.
    #[instrument(skip_all, fields(owner_id = %owner_id, product_id = %product_id, quantity_delta = quantity_delta, delete = delete))]
    pub async fn add(
        &self,
        owner_id: &OwnerId,
        product_id: &ProductId,
        quantity_delta: i64,
        delete: bool,
    ) -> Result<CartUpdate, SyncError> {
        let _turn = self.turn.lock().await;
        self.add_locked(owner_id, product_id, quantity_delta, delete).await
    }

    /// Remove a line. Remote failures become warnings; the cart is refreshed
    /// either way.
    #[instrument(skip_all, fields(owner_id = %owner_id, product_id = %product_id))]
    pub async fn remove(&self, owner_id: &OwnerId, product_id: &ProductId) -> Result<CartUpdate, SyncError> {
        let _turn = self.turn.lock().await;
        self.remove_locked(owner_id, product_id).await
    }

    /// Take one unit off a line, removing it when it would reach zero.
    #[instrument(skip_all, fields(owner_id = %owner_id, product_id = %product_id))]
    pub async fn decrement(&self, owner_id: &OwnerId, product_id: &ProductId) -> Result<CartUpdate, SyncError> {
        let _turn = self.turn.lock().await;

        if self.store.owner_id().as_ref() != Some(owner_id) {
            self.refresh_locked(owner_id).await?;
        }
        let current = self.store.get_item(product_id).map_or(0, |item| item.quantity);

        if current <= 1 {
            self.add_locked(owner_id, product_id, 0, true).await
        } else {
            self.add_locked(owner_id, product_id, -1, false).await
        }
    }

    /// Forget the cart, e.g. on logout. The remote cart is untouched.
    pub async fn reset(&self) {
        let _turn = self.turn.lock().await;
        self.store.clear();
        debug!("cart store cleared");
    }

    async fn refresh_locked(&self, owner_id: &OwnerId) -> Result<Cart, SyncError> {
        let view = self
            .remote
            .view(owner_id)
            .await
            .map_err(|source| SyncError::View {
                owner_id: owner_id.clone(),
                source,
            })?;

        let mut live: Vec<RemoteCartLine> = Vec::with_capacity(view.items.len());
        for line in view.items {
            if !line.is_depleted() {
                live.push(line);
                continue;
            }
            debug!(product_id = %line.product_id, quantity = line.quantity, "purging depleted line");
            if let Err(error) = self.remote.remove(owner_id, &line.product_id).await {
                warn!(product_id = %line.product_id, %error, "failed to purge depleted line");
            }
        }

        let snapshots = try_join_all(live.iter().map(|line| self.fetch_snapshot(&line.product_id))).await?;

        let items = live
            .into_iter()
            .zip(snapshots)
            .map(|(line, snapshot)| CartLineItem::new(line.product_id, line.quantity, snapshot))
            .collect();
        let cart = Cart::with_items(view.id, owner_id.clone(), items);

        self.store.replace(cart.clone());
        info!(
            cart_id = %cart.id,
            lines = cart.unique_item_count(),
            items = cart.item_count(),
            "cart refreshed"
        );
        Ok(cart)
    }

    async fn fetch_snapshot(&self, product_id: &ProductId) -> Result<ProductSnapshot, SyncError> {
        let entry = self
            .catalog
            .fetch(product_id)
            .await
            .map_err(|source| SyncError::Catalog {
                product_id: product_id.clone(),
                source,
            })?;
        Ok(ProductSnapshot::from_entry(product_id, entry)?)
    }

    async fn add_locked(
        &self,
        owner_id: &OwnerId,
        product_id: &ProductId,
        quantity_delta: i64,
        delete: bool,
    ) -> Result<CartUpdate, SyncError> {
        if delete {
            return self.remove_locked(owner_id, product_id).await;
        }

        let mut warnings = Vec::new();
        match self.remote.add(owner_id, product_id, quantity_delta).await {
            Ok(()) => debug!("remote add accepted"),
            Err(reason) => {
                warn!(error = %reason, "remote add rejected");
                warnings.push(SyncWarning::AddRejected {
                    product_id: product_id.clone(),
                    quantity: quantity_delta,
                    reason,
                });
            }
        }

        let cart = self.refresh_locked(owner_id).await?;
        Ok(CartUpdate { cart, warnings })
    }

    async fn remove_locked(&self, owner_id: &OwnerId, product_id: &ProductId) -> Result<CartUpdate, SyncError> {
        let mut warnings = Vec::new();
        if let Err(reason) = self.remote.remove(owner_id, product_id).await {
            warn!(error = %reason, "remote remove failed");
            warnings.push(SyncWarning::RemoveFailed {
                product_id: product_id.clone(),
                reason,
            });
        }

        let cart = self.refresh_locked(owner_id).await?;
        Ok(CartUpdate { cart, warnings })
    }
}
