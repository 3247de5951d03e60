//! Eco-Meter policy: default rating and the donation bonus ladder.

use crate::error::CommerceError;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Rating assumed for a product whose retailer supplied none.
pub const DEFAULT_RATING: f64 = 30.0;

/// Bonus for any positive donation below the lowest ladder rung.
pub const MINIMUM_DONATION_BONUS: u8 = 5;

/// One rung of the donation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationBracket {
    /// Minimum donation/subtotal ratio, in basis points (500 = 5%).
    pub min_ratio_bps: u32,
    /// Points added to the base score.
    pub bonus: u8,
}

impl DonationBracket {
    pub const fn new(min_ratio_bps: u32, bonus: u8) -> Self {
        Self {
            min_ratio_bps,
            bonus,
        }
    }

    /// `donation / denominator >= min_ratio`, compared exactly in cents.
    fn matches(&self, donation_cents: i64, denominator_cents: i64) -> bool {
        i128::from(donation_cents) * 10_000 >= i128::from(denominator_cents) * i128::from(self.min_ratio_bps)
    }
}

/// Donation ladder, scanned top to bottom; the first matching rung wins.
pub const DONATION_LADDER: [DonationBracket; 4] = [
    DonationBracket::new(500, 25),
    DonationBracket::new(300, 20),
    DonationBracket::new(200, 15),
    DonationBracket::new(100, 10),
];

/// Tunables of the Eco-Meter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EcoPolicy {
    /// Rating used for unrated products.
    pub default_rating: f64,
    /// Bonus for a positive donation that matches no rung.
    pub minimum_bonus: u8,
    /// Donation ladder, highest ratio first.
    pub ladder: Vec<DonationBracket>,
}

impl Default for EcoPolicy {
    fn default() -> Self {
        Self {
            default_rating: DEFAULT_RATING,
            minimum_bonus: MINIMUM_DONATION_BONUS,
            ladder: DONATION_LADDER.to_vec(),
        }
    }
}

impl EcoPolicy {
    /// Check that the policy can be applied as written.
    ///
    /// First-match-wins only means what it says when rungs are ordered by
    /// strictly decreasing ratio.
    pub fn validate(&self) -> Result<(), CommerceError> {
        if !(0.0..=100.0).contains(&self.default_rating) {
            return Err(CommerceError::InvalidPolicy(format!(
                "default_rating {} is outside 0..=100",
                self.default_rating
            )));
        }
        if let Some(pair) = self
            .ladder
            .windows(2)
            .find(|w| w[0].min_ratio_bps <= w[1].min_ratio_bps)
        {
            return Err(CommerceError::InvalidPolicy(format!(
                "donation ladder is not in decreasing ratio order ({} bps before {} bps)",
                pair[0].min_ratio_bps, pair[1].min_ratio_bps
            )));
        }
        Ok(())
    }

    /// Bonus points earned by a donation against a subtotal.
    ///
    /// A zero donation earns nothing. The ratio denominator is the subtotal,
    /// floored at one currency unit so an empty cart still ranks donations.
    pub fn donation_improvement(&self, donation: &Money, subtotal: &Money) -> u8 {
        if donation.amount_cents <= 0 {
            return 0;
        }
        let denominator = subtotal.amount_cents.max(100);
        self.ladder
            .iter()
            .find(|rung| rung.matches(donation.amount_cents, denominator))
            .map(|rung| rung.bonus)
            .unwrap_or(self.minimum_bonus)
    }
}
