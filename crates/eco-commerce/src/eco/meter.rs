//! Eco-Meter scoring.

use crate::cart::{ensure_donation, subtotal_in, Cart};
use crate::eco::EcoPolicy;
use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest score the meter can show.
pub const MAX_SCORE: u8 = 100;

/// Score breakdown for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EcoMeter {
    /// Rounded mean rating of the cart's lines.
    pub base: u8,
    /// Donation bonus.
    pub improvement: u8,
    /// `min(100, base + improvement)`.
    pub score: u8,
}

impl EcoMeter {
    pub fn new(base: u8, improvement: u8) -> Self {
        Self {
            base,
            improvement,
            score: base.saturating_add(improvement).min(MAX_SCORE),
        }
    }

    pub fn band(&self) -> EcoBand {
        EcoBand::for_score(self.score)
    }
}

/// Display band for a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EcoBand {
    Low,
    Moderate,
    High,
}

impl EcoBand {
    pub fn for_score(score: u8) -> Self {
        match score {
            0..=39 => EcoBand::Low,
            40..=69 => EcoBand::Moderate,
            _ => EcoBand::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EcoBand::Low => "low",
            EcoBand::Moderate => "moderate",
            EcoBand::High => "high",
        }
    }
}

impl fmt::Display for EcoBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rounded mean of the line ratings, unrated lines counting as the default.
///
/// Every line counts once regardless of quantity. An empty cart scores 0.
pub fn base_eco_meter(cart: &Cart, policy: &EcoPolicy) -> u8 {
    if cart.items.is_empty() {
        return 0;
    }
    let sum: f64 = cart
        .items
        .iter()
        .map(|item| {
            item.snapshot
                .sustainability_rating
                .unwrap_or(policy.default_rating)
        })
        .sum();
    let mean = sum / cart.items.len() as f64;
    // Ratings are non-negative, so round() rounds halves up.
    mean.round().clamp(0.0, f64::from(MAX_SCORE)) as u8
}

/// Points a donation adds to the base score, given the cart subtotal.
pub fn donation_improvement(donation: &Money, subtotal: &Money, policy: &EcoPolicy) -> u8 {
    policy.donation_improvement(donation, subtotal)
}

/// Base score plus donation bonus, capped at 100.
pub fn final_eco_meter(cart: &Cart, donation: &Money, policy: &EcoPolicy) -> Result<EcoMeter, CommerceError> {
    ensure_donation(donation)?;
    let subtotal = subtotal_in(cart, donation.currency)?;
    if !donation.is_zero() && donation.currency != subtotal.currency {
        return Err(CommerceError::CurrencyMismatch {
            expected: subtotal.currency.code().to_string(),
            got: donation.currency.code().to_string(),
        });
    }

    let base = base_eco_meter(cart, policy);
    let improvement = donation_improvement(donation, &subtotal, policy);
    Ok(EcoMeter::new(base, improvement))
}
