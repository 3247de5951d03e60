//! Checkout module.
//!
//! Contains the shipping tiers and price list applied at checkout.

mod shipping;

pub use shipping::{PricingPolicy, ShippingQuote, ShippingSelection, ShippingTier};
