//! Cart pricing calculations.
//!
//! Pure functions over a cart snapshot. Nothing here mutates the cart.

use crate::cart::Cart;
use crate::checkout::{PricingPolicy, ShippingQuote, ShippingTier};
use crate::error::CommerceError;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Complete pricing breakdown for a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartPricing {
    /// Sum of price × quantity over all lines.
    pub subtotal: Money,
    /// Shipping tier that applied and its cost.
    pub shipping: ShippingQuote,
    /// Carbon-offset donation.
    pub donation: Money,
    /// Final total (subtotal + shipping + donation).
    pub total: Money,
}

impl CartPricing {
    /// Whether the cart reached free shipping.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.tier == ShippingTier::Free
    }
}

/// Sum of `price × quantity` over every line, in the cart's currency.
pub fn subtotal(cart: &Cart) -> Result<Money, CommerceError> {
    let currency = cart.currency();
    let mut total = Money::zero(currency);
    for item in &cart.items {
        if item.quantity < 0 {
            return Err(CommerceError::InvalidQuantity {
                product_id: item.product_id.to_string(),
                quantity: item.quantity,
            });
        }
        if item.snapshot.price.is_negative() {
            return Err(CommerceError::NegativePrice(item.product_id.to_string()));
        }
        let line_total = item.snapshot.price.try_multiply(item.quantity)?;
        total = total.try_add(&line_total)?;
    }
    Ok(total)
}

/// Like [`subtotal`], but an empty cart totals zero in `currency` rather
/// than in the cart's default currency.
pub fn subtotal_in(cart: &Cart, currency: Currency) -> Result<Money, CommerceError> {
    if cart.is_empty() {
        return Ok(Money::zero(currency));
    }
    subtotal(cart)
}

/// `subtotal + shipping + donation`.
pub fn final_total(subtotal: &Money, shipping: &Money, donation: &Money) -> Result<Money, CommerceError> {
    subtotal.try_add(shipping)?.try_add(donation)
}

/// Reject negative donations.
pub(crate) fn ensure_donation(donation: &Money) -> Result<(), CommerceError> {
    if donation.is_negative() {
        return Err(CommerceError::InvalidDonation(donation.display()));
    }
    Ok(())
}

/// Price a cart for a shipping selection and donation.
pub fn price_cart(
    cart: &Cart,
    selected: ShippingTier,
    donation: &Money,
    policy: &PricingPolicy,
) -> Result<CartPricing, CommerceError> {
    ensure_donation(donation)?;
    let subtotal = subtotal_in(cart, donation.currency)?;
    // A zero donation carries no currency of its own.
    let donation = if donation.is_zero() {
        Money::zero(subtotal.currency)
    } else {
        *donation
    };
    let shipping = policy.shipping_cost(&subtotal, selected);
    let total = final_total(&subtotal, &shipping.cost, &donation)?;

    Ok(CartPricing {
        subtotal,
        shipping,
        donation,
        total,
    })
}
