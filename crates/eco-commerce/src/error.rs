//! Commerce error types.

use thiserror::Error;

/// Errors that can occur while pricing or scoring a cart.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Currency mismatch.
    #[error("Currency mismatch: expected {expected}, got {got}")]
    CurrencyMismatch { expected: String, got: String },

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// Negative line quantity in an enriched cart.
    #[error("Invalid quantity {quantity} for product {product_id}")]
    InvalidQuantity { product_id: String, quantity: i64 },

    /// Negative product price.
    #[error("Invalid price for product {0}: prices cannot be negative")]
    NegativePrice(String),

    /// Negative donation amount.
    #[error("Invalid donation: {0} (donations cannot be negative)")]
    InvalidDonation(String),

    /// Pricing or scoring policy that cannot be applied.
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// Unknown shipping tier name.
    #[error("Unknown shipping tier: {0}")]
    UnknownShippingTier(String),
}
