//! Shopping cart module.
//!
//! Contains the enriched cart, the remote view shape it is rebuilt from,
//! and pricing.

mod cart;
mod pricing;

pub use cart::{Cart, CartLineItem, RemoteCartLine, RemoteCartView};
pub use pricing::{final_total, price_cart, subtotal, subtotal_in, CartPricing};
pub(crate) use pricing::ensure_donation;
