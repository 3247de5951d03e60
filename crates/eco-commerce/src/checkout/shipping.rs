//! Shipping tiers and the free-shipping threshold.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shipping tier a customer can pick at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ShippingTier {
    #[default]
    Standard,
    Express,
    /// Only legal at or above the free-shipping threshold.
    Free,
}

impl ShippingTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShippingTier::Standard => "standard",
            ShippingTier::Express => "express",
            ShippingTier::Free => "free",
        }
    }
}

impl fmt::Display for ShippingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingTier {
    type Err = CommerceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "standard" => Ok(ShippingTier::Standard),
            "express" => Ok(ShippingTier::Express),
            "free" => Ok(ShippingTier::Free),
            _ => Err(CommerceError::UnknownShippingTier(s.to_string())),
        }
    }
}

/// Shipping price list, in cents of the cart's currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingPolicy {
    /// Subtotal at or above which shipping is free.
    pub free_shipping_threshold_cents: i64,
    /// Standard shipping price.
    pub standard_cost_cents: i64,
    /// Express shipping price.
    pub express_cost_cents: i64,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            free_shipping_threshold_cents: 50_000,
            standard_cost_cents: 7_399,
            express_cost_cents: 14_999,
        }
    }
}

impl PricingPolicy {
    /// Reject negative thresholds and prices.
    pub fn validate(&self) -> Result<(), CommerceError> {
        let fields = [
            ("free_shipping_threshold_cents", self.free_shipping_threshold_cents),
            ("standard_cost_cents", self.standard_cost_cents),
            ("express_cost_cents", self.express_cost_cents),
        ];
        match fields.iter().find(|(_, cents)| *cents < 0) {
            Some((name, cents)) => Err(CommerceError::InvalidPolicy(format!(
                "{} must not be negative (got {})",
                name, cents
            ))),
            None => Ok(()),
        }
    }

    /// Whether a subtotal qualifies for free shipping (inclusive).
    pub fn qualifies_for_free_shipping(&self, subtotal: &Money) -> bool {
        subtotal.amount_cents >= self.free_shipping_threshold_cents
    }

    /// The tier that actually applies to `selected` at this subtotal.
    ///
    /// At or above the threshold every selection becomes `Free`. Below it a
    /// stale `Free` selection falls back to `Standard`.
    pub fn effective_tier(&self, subtotal: &Money, selected: ShippingTier) -> ShippingTier {
        if self.qualifies_for_free_shipping(subtotal) {
            return ShippingTier::Free;
        }
        match selected {
            ShippingTier::Free => ShippingTier::Standard,
            other => other,
        }
    }

    /// Price the shipping for a subtotal and selection.
    pub fn shipping_cost(&self, subtotal: &Money, selected: ShippingTier) -> ShippingQuote {
        let tier = self.effective_tier(subtotal, selected);
        let cents = match tier {
            ShippingTier::Free => 0,
            ShippingTier::Standard => self.standard_cost_cents,
            ShippingTier::Express => self.express_cost_cents,
        };
        ShippingQuote {
            tier,
            cost: Money::new(cents, subtotal.currency),
        }
    }
}

/// Priced shipping: the tier that applied and what it costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingQuote {
    pub tier: ShippingTier,
    pub cost: Money,
}

/// The shipping choice a checkout view holds across cart changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ShippingSelection {
    tier: ShippingTier,
}

impl ShippingSelection {
    pub fn new(tier: ShippingTier) -> Self {
        Self { tier }
    }

    /// Currently selected tier.
    pub fn tier(&self) -> ShippingTier {
        self.tier
    }

    /// Re-evaluate the selection against a new subtotal.
    ///
    /// Returns `true` if the stored selection changed.
    pub fn reconcile(&mut self, subtotal: &Money, policy: &PricingPolicy) -> bool {
        let effective = policy.effective_tier(subtotal, self.tier);
        let changed = effective != self.tier;
        self.tier = effective;
        changed
    }

    /// Apply a user's choice, then reconcile it against the subtotal.
    pub fn select(&mut self, tier: ShippingTier, subtotal: &Money, policy: &PricingPolicy) -> ShippingTier {
        self.tier = tier;
        self.reconcile(subtotal, policy);
        self.tier
    }
}
