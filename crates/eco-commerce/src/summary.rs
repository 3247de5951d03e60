//! Checkout summary: pricing and Eco-Meter recomputed together.

use crate::cart::{price_cart, Cart, CartPricing};
use crate::checkout::{PricingPolicy, ShippingTier};
use crate::eco::{final_eco_meter, EcoPolicy, EcoMeter};
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Everything a checkout view derives from one cart snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub pricing: CartPricing,
    pub eco: EcoMeter,
    /// Sum of line quantities.
    pub item_count: i64,
}

impl CartSummary {
    /// Recompute pricing and score for a cart snapshot.
    pub fn compute(
        cart: &Cart,
        selected: ShippingTier,
        donation: &Money,
        pricing_policy: &PricingPolicy,
        eco_policy: &EcoPolicy,
    ) -> Result<Self, CommerceError> {
        let pricing = price_cart(cart, selected, donation, pricing_policy)?;
        let eco = final_eco_meter(cart, donation, eco_policy)?;
        Ok(Self {
            pricing,
            eco,
            item_count: cart.item_count(),
        })
    }
}
