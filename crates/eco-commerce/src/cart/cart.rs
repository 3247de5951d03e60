//! Cart and line item types.

use crate::catalog::ProductSnapshot;
use crate::ids::{CartId, OwnerId, ProductId};
use crate::money::Currency;
use serde::{Deserialize, Serialize};

/// An enriched shopping cart, rebuilt wholesale from each remote view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    /// Server-assigned cart identifier.
    pub id: CartId,
    /// Owner the remote cart is keyed by.
    pub owner_id: OwnerId,
    /// Items in the cart, in remote order.
    pub items: Vec<CartLineItem>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new(id: CartId, owner_id: OwnerId) -> Self {
        Self {
            id,
            owner_id,
            items: Vec::new(),
        }
    }

    /// Create a cart holding the given line items.
    pub fn with_items(id: CartId, owner_id: OwnerId, items: Vec<CartLineItem>) -> Self {
        Self {
            id,
            owner_id,
            items,
        }
    }

    /// Get total item count (sum of quantities).
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Get number of unique items.
    pub fn unique_item_count(&self) -> usize {
        self.items.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the line for a product.
    pub fn get_item(&self, product_id: &ProductId) -> Option<&CartLineItem> {
        self.items.iter().find(|i| &i.product_id == product_id)
    }

    /// Currency of the cart: that of its first line, USD when empty.
    pub fn currency(&self) -> Currency {
        self.items
            .first()
            .map(|i| i.snapshot.price.currency)
            .unwrap_or_default()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new(CartId::new(""), OwnerId::new("anonymous"))
    }
}

/// A line item in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLineItem {
    /// Product being purchased.
    pub product_id: ProductId,
    /// Quantity (always positive in an enriched cart).
    pub quantity: i64,
    /// Product data as of the last fetch.
    pub snapshot: ProductSnapshot,
}

impl CartLineItem {
    /// Create a new line item.
    pub fn new(product_id: ProductId, quantity: i64, snapshot: ProductSnapshot) -> Self {
        Self {
            product_id,
            quantity,
            snapshot,
        }
    }
}

/// One `{product, quantity}` row of a remote cart view.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl RemoteCartLine {
    pub fn new(product_id: impl Into<ProductId>, quantity: i64) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
        }
    }

    /// A row the sync engine purges instead of enriching.
    pub fn is_depleted(&self) -> bool {
        self.quantity <= 0
    }
}

/// The server-held cart as returned by a view call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteCartView {
    pub id: CartId,
    #[serde(default)]
    pub items: Vec<RemoteCartLine>,
}
