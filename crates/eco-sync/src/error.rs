//! Sync error and warning types.

use eco_commerce::{CommerceError, OwnerId, ProductId};

use crate::client::RemoteError;

/// Failure that aborts a sync operation. The store is left untouched.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SyncError {
    /// The remote cart could not be read.
    #[error("failed to view cart for {owner_id}: {source}")]
    View {
        owner_id: OwnerId,
        #[source]
        source: RemoteError,
    },

    /// A line's product details could not be fetched.
    #[error("failed to fetch product {product_id}: {source}")]
    Catalog {
        product_id: ProductId,
        #[source]
        source: RemoteError,
    },

    /// The catalog returned data that cannot enter a cart.
    #[error(transparent)]
    Commerce(#[from] CommerceError),
}

/// Non-fatal condition reported alongside a refreshed cart.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncWarning {
    /// The remote refused a quantity change (e.g. out of stock).
    #[error("could not add {quantity} x {product_id}: {reason}")]
    AddRejected {
        product_id: ProductId,
        quantity: i64,
        reason: RemoteError,
    },

    /// The remote failed to drop a line.
    #[error("could not remove {product_id}: {reason}")]
    RemoveFailed {
        product_id: ProductId,
        reason: RemoteError,
    },
}

impl SyncWarning {
    pub fn product_id(&self) -> &ProductId {
        match self {
            SyncWarning::AddRejected { product_id, .. } | SyncWarning::RemoveFailed { product_id, .. } => {
                product_id
            }
        }
    }
}
