//! Cart, pricing and Eco-Meter domain logic for EcoCart.
//!
//! This crate holds the pure half of the cart engine:
//!
//! - **Catalog**: product snapshots copied into cart lines at fetch time
//! - **Cart**: the enriched cart and the remote view it is rebuilt from
//! - **Checkout**: shipping tiers and the free-shipping threshold
//! - **Eco**: the 0-100 Eco-Meter and the donation bonus ladder
//!
//! Nothing here performs I/O. The `eco-sync` crate keeps a [`Cart`] in step
//! with the remote cart service; everything in this crate recomputes from
//! whatever snapshot it is handed.
//!
//! # Example
//!
//! ```rust,ignore
//! use eco_commerce::prelude::*;
//!
//! let summary = CartSummary::compute(
//!     &cart,
//!     ShippingTier::Standard,
//!     &Money::from_decimal(6.0, cart.currency()),
//!     &PricingPolicy::default(),
//!     &EcoPolicy::default(),
//! )?;
//! println!("Total: {} (Eco-Meter {})", summary.pricing.total, summary.eco.score);
//! ```

pub mod error;
pub mod ids;
pub mod money;

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod eco;
pub mod summary;

pub use cart::Cart;
pub use error::CommerceError;
pub use ids::*;
pub use money::{Currency, Money};
pub use summary::CartSummary;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::CommerceError;
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Catalog
    pub use crate::catalog::{CatalogEntry, ProductDetails, ProductSnapshot};

    // Cart
    pub use crate::cart::{
        final_total, price_cart, subtotal, subtotal_in, Cart, CartLineItem, CartPricing, RemoteCartLine,
        RemoteCartView,
    };

    // Checkout
    pub use crate::checkout::{PricingPolicy, ShippingQuote, ShippingSelection, ShippingTier};

    // Eco
    pub use crate::eco::{
        base_eco_meter, donation_improvement, final_eco_meter, DonationBracket, EcoBand,
        EcoMeter, EcoPolicy,
    };

    pub use crate::summary::CartSummary;
}
