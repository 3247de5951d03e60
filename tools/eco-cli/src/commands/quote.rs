//! Price and score a cart file.

use anyhow::{Context as _, Result};
use eco_commerce::cart::{CartLineItem, CartPricing};
use eco_commerce::catalog::{CatalogEntry, ProductSnapshot};
use eco_commerce::checkout::ShippingTier;
use eco_commerce::{Cart, CartId, CartSummary, Currency, Money, OwnerId, ProductId};
use serde::{Deserialize, Serialize};

use super::QuoteArgs;
use crate::config::DefaultsConfig;
use crate::context::Context;
use crate::output::eco_badge;

/// A cart file: either a bare list of lines or a table with a currency.
///
/// ```toml
/// currency = "USD"
///
/// [[items]]
/// name = "Organic Tote"
/// price = 10.00
/// quantity = 3
/// rating = 80
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum CartFile {
    Lines(Vec<CartFileLine>),
    Cart {
        #[serde(default)]
        currency: Option<Currency>,
        items: Vec<CartFileLine>,
    },
}

impl CartFile {
    /// Currency the file prices in, falling back to the configured default.
    pub(crate) fn currency(&self, defaults: &DefaultsConfig) -> Currency {
        match self {
            CartFile::Cart {
                currency: Some(currency),
                ..
            } => *currency,
            _ => defaults.currency,
        }
    }
}

/// One line of a cart file. Prices are decimal amounts.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct CartFileLine {
    /// Product id; derived from the name when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[derive(Serialize)]
struct QuoteReport<'a> {
    cart: &'a Cart,
    requested_shipping: ShippingTier,
    summary: CartSummary,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.cart);
    let file: CartFile = super::load_file(&path)?;
    let currency = file.currency(&ctx.config.defaults);
    let cart = build_cart(file, &ctx.config.defaults)?;

    let requested = args.shipping.unwrap_or(ctx.config.defaults.shipping);
    let donation = Money::from_decimal(args.donation, currency);
    let policies = ctx.config.engine();
    let summary = CartSummary::compute(&cart, requested, &donation, &policies.pricing, &policies.eco)
        .context("Failed to price cart")?;

    if ctx.output.is_json() {
        ctx.output.json(&QuoteReport {
            cart: &cart,
            requested_shipping: requested,
            summary,
        });
        return Ok(());
    }

    ctx.output.header(&format!("Quote for {}", args.cart));
    ctx.output.cart_table(&cart);

    print_pricing(ctx, &summary.pricing, requested);

    ctx.output.header("Eco-Meter");
    ctx.output.kv("Base", &summary.eco.base.to_string());
    ctx.output.kv("Donation bonus", &format!("+{}", summary.eco.improvement));
    ctx.output.kv("Score", &eco_badge(&summary.eco));

    Ok(())
}

/// Print the pricing block with shipping hints.
pub(crate) fn print_pricing(ctx: &Context, pricing: &CartPricing, requested: ShippingTier) {
    ctx.output.header("Pricing");
    ctx.output.kv("Subtotal", &pricing.subtotal.display());
    ctx.output.kv(
        "Shipping",
        &format!("{} ({})", pricing.shipping.cost.display(), pricing.shipping.tier),
    );
    ctx.output.kv("Donation", &pricing.donation.display());
    ctx.output.kv("Total", &pricing.total.display());

    if pricing.shipping.tier != requested {
        ctx.output.warn(&format!(
            "{} shipping requested; {} applies at this subtotal",
            requested, pricing.shipping.tier
        ));
    }
    if !pricing.has_free_shipping() {
        let threshold = ctx.config.pricing.free_shipping_threshold_cents;
        let missing = Money::new(threshold - pricing.subtotal.amount_cents, pricing.subtotal.currency);
        ctx.output.info(&format!("Add {} more for free shipping", missing.display()));
    }
}

/// Turn a cart file into an enriched cart, validating every line the way a
/// catalog response is validated.
pub(crate) fn build_cart(file: CartFile, defaults: &DefaultsConfig) -> Result<Cart> {
    let currency = file.currency(defaults);
    let lines = match file {
        CartFile::Lines(lines) => lines,
        CartFile::Cart { items, .. } => items,
    };

    let items = lines
        .into_iter()
        .map(|line| {
            let product_id = ProductId::new(line.id.clone().unwrap_or_else(|| slug(&line.name)));
            let mut entry = CatalogEntry::new(line.name, Money::from_decimal(line.price, currency));
            if let Some(rating) = line.rating {
                entry = entry.with_rating(rating);
            }
            if let Some(image) = line.image {
                entry = entry.with_image(image);
            }
            let snapshot = ProductSnapshot::from_entry(&product_id, entry)
                .with_context(|| format!("Invalid line: {}", product_id))?;
            Ok(CartLineItem::new(product_id, line.quantity, snapshot))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Cart::with_items(
        CartId::new("quote"),
        OwnerId::new(defaults.owner_id.clone()),
        items,
    ))
}

/// `"Organic Tote (L)"` -> `"organic-tote-l"`.
fn slug(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
