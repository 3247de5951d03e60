//! Seams to the remote cart service and the product catalog.

use async_trait::async_trait;
use eco_commerce::catalog::CatalogEntry;
use eco_commerce::cart::RemoteCartView;
use eco_commerce::{OwnerId, ProductId};

/// Error returned by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        requested: i64,
        available: i64,
    },

    #[error("rejected: {0}")]
    Rejected(String),
}

/// Server-held cart, keyed by owner.
#[async_trait]
pub trait CartRemoteClient: Send + Sync {
    /// Current lines of the owner's cart. Creates the cart if it does not exist.
    async fn view(&self, owner_id: &OwnerId) -> Result<RemoteCartView, RemoteError>;

    /// Apply a signed quantity delta to a product line.
    async fn add(&self, owner_id: &OwnerId, product_id: &ProductId, quantity: i64) -> Result<(), RemoteError>;

    /// Drop a product line.
    async fn remove(&self, owner_id: &OwnerId, product_id: &ProductId) -> Result<(), RemoteError>;
}

/// Product detail lookups.
#[async_trait]
pub trait ProductCatalogClient: Send + Sync {
    /// Fetch the product data and images for one product.
    async fn fetch(&self, product_id: &ProductId) -> Result<CatalogEntry, RemoteError>;
}
