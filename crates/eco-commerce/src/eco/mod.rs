//! Eco-Meter module.
//!
//! Derives a 0-100 sustainability score from a cart's product ratings and
//! any carbon-offset donation.

mod ladder;
mod meter;

pub use ladder::{DonationBracket, EcoPolicy, DEFAULT_RATING, DONATION_LADDER, MINIMUM_DONATION_BONUS};
pub use meter::{base_eco_meter, donation_improvement, final_eco_meter, EcoBand, EcoMeter, MAX_SCORE};
