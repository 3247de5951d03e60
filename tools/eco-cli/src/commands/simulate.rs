//! Replay a scenario of cart operations through the sync engine.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use eco_commerce::cart::subtotal_in;
use eco_commerce::catalog::CatalogEntry;
use eco_commerce::checkout::{ShippingSelection, ShippingTier};
use eco_commerce::{Cart, CartSummary, Currency, Money, OwnerId, ProductId};
use eco_sync::{
    CartRemoteClient, CartStore, CartSyncEngine, InMemoryCartRemote, InMemoryCatalog, ProductCatalogClient,
    SyncError, SyncWarning,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::SimulateArgs;
use crate::context::Context;
use crate::output::eco_badge;

/// A simulated session: the services' starting state and the operations to
/// run against them, in order.
///
/// ```toml
/// donation = 2.00
///
/// [[products]]
/// id = "tote"
/// name = "Organic Tote"
/// price = 15.00
/// rating = 80
/// stock = 3
///
/// [[lines]]
/// product = "tote"
/// quantity = 0
///
/// [[steps]]
/// action = "refresh"
///
/// [[steps]]
/// action = "add"
/// product = "tote"
/// quantity = 4
/// ```
#[derive(Debug, Deserialize)]
pub(crate) struct Scenario {
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub currency: Option<Currency>,
    #[serde(default)]
    pub shipping: Option<ShippingTier>,
    #[serde(default)]
    pub donation: f64,
    #[serde(default)]
    pub products: Vec<ScenarioProduct>,
    /// Rows already on the remote cart, zero and negative quantities allowed.
    #[serde(default)]
    pub lines: Vec<ScenarioLine>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScenarioProduct {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub rating: Option<f64>,
    /// Per-cart quantity cap; unlimited when absent.
    #[serde(default)]
    pub stock: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScenarioLine {
    pub product: String,
    pub quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub(crate) enum Step {
    Refresh,
    Add {
        product: String,
        #[serde(default = "default_quantity")]
        quantity: i64,
        #[serde(default)]
        delete: bool,
    },
    Remove {
        product: String,
    },
    Decrement {
        product: String,
    },
    Reset,
}

fn default_quantity() -> i64 {
    1
}

impl Step {
    fn describe(&self) -> String {
        match self {
            Step::Refresh => "refresh".to_string(),
            Step::Add {
                product,
                delete: true,
                ..
            } => format!("add {} (delete)", product),
            Step::Add { product, quantity, .. } => format!("add {:+} x {}", quantity, product),
            Step::Remove { product } => format!("remove {}", product),
            Step::Decrement { product } => format!("decrement {}", product),
            Step::Reset => "reset".to_string(),
        }
    }
}

#[derive(Serialize)]
struct StepReport {
    step: usize,
    action: String,
    warnings: Vec<String>,
    error: Option<String>,
    shipping_changed: bool,
    cart: Cart,
    summary: CartSummary,
}

/// Run the simulate command.
pub async fn run(args: SimulateArgs, ctx: &Context) -> Result<()> {
    let path = ctx.resolve_path(&args.scenario);
    let scenario: Scenario = super::load_file(&path)?;

    let owner_id = OwnerId::new(
        scenario
            .owner_id
            .clone()
            .unwrap_or_else(|| ctx.config.defaults.owner_id.clone()),
    );
    let currency = scenario.currency.unwrap_or(ctx.config.defaults.currency);
    let latency = (args.latency_ms > 0).then(|| Duration::from_millis(args.latency_ms));
    let (remote, catalog) = build_services(&scenario, &owner_id, currency, latency);
    debug!(
        owner_id = %owner_id,
        products = scenario.products.len(),
        lines = scenario.lines.len(),
        steps = scenario.steps.len(),
        "scenario loaded"
    );

    let store = CartStore::new();
    let engine = CartSyncEngine::new(Arc::new(remote), Arc::new(catalog), store.clone());

    let policies = ctx.config.engine();
    let donation = Money::from_decimal(scenario.donation, currency);
    let mut selection = ShippingSelection::new(scenario.shipping.unwrap_or(ctx.config.defaults.shipping));

    ctx.output.header(&format!("Simulating {} for {}", args.scenario, owner_id));

    let total = scenario.steps.len();
    let mut reports = Vec::with_capacity(total);
    let mut failures = 0;

    for (index, step) in scenario.steps.iter().enumerate() {
        let action = step.describe();
        ctx.output.step(index + 1, total, &action);

        let spinner = ctx.output.spinner(&action);
        let outcome = apply(&engine, &owner_id, step).await;
        spinner.finish_and_clear();

        let (warnings, error) = match outcome {
            Ok(warnings) => (warnings, None),
            Err(e) => {
                failures += 1;
                (Vec::new(), Some(e))
            }
        };

        let cart = store.snapshot().unwrap_or_default();
        let cart_subtotal = subtotal_in(&cart, currency).context("Failed to price cart")?;
        let shipping_changed = selection.reconcile(&cart_subtotal, &policies.pricing);
        let summary = CartSummary::compute(&cart, selection.tier(), &donation, &policies.pricing, &policies.eco)
            .context("Failed to price cart")?;

        if !ctx.output.is_json() {
            print_step(ctx, &cart, &summary, &warnings, error.as_ref(), shipping_changed, selection.tier());
        }

        reports.push(StepReport {
            step: index + 1,
            action,
            warnings: warnings.iter().map(ToString::to_string).collect(),
            error: error.map(|e| e.to_string()),
            shipping_changed,
            cart,
            summary,
        });
    }

    if ctx.output.is_json() {
        ctx.output.json(&reports);
        return Ok(());
    }

    let warning_count: usize = reports.iter().map(|r| r.warnings.len()).sum();
    ctx.output.info("");
    if failures == 0 && warning_count == 0 {
        ctx.output.success(&format!("{} step(s) completed", total));
    } else {
        ctx.output.warn(&format!(
            "{} step(s) completed, {} warning(s), {} failed",
            total, warning_count, failures
        ));
    }

    Ok(())
}

/// Seed the in-memory services from a scenario.
pub(crate) fn build_services(
    scenario: &Scenario,
    owner_id: &OwnerId,
    currency: Currency,
    latency: Option<Duration>,
) -> (InMemoryCartRemote, InMemoryCatalog) {
    let mut remote = InMemoryCartRemote::new();
    let mut catalog = InMemoryCatalog::new();
    if let Some(latency) = latency {
        remote = remote.with_latency(latency);
        catalog = catalog.with_latency(latency);
    }

    for product in &scenario.products {
        let mut entry = CatalogEntry::new(product.name.clone(), Money::from_decimal(product.price, currency));
        if let Some(rating) = product.rating {
            entry = entry.with_rating(rating);
        }
        for image in &product.images {
            entry = entry.with_image(image.clone());
        }
        catalog.insert(product.id.as_str(), entry);

        if let Some(stock) = product.stock {
            remote.set_stock(product.id.as_str(), stock);
        }
    }

    for line in &scenario.lines {
        remote = remote.with_line(owner_id.clone(), line.product.as_str(), line.quantity);
    }

    (remote, catalog)
}

/// Run one step, returning the warnings it produced.
pub(crate) async fn apply<R, C>(
    engine: &CartSyncEngine<R, C>,
    owner_id: &OwnerId,
    step: &Step,
) -> Result<Vec<SyncWarning>, SyncError>
where
    R: CartRemoteClient,
    C: ProductCatalogClient,
{
    match step {
        Step::Refresh => engine.refresh(owner_id).await.map(|_| Vec::new()),
        Step::Add {
            product,
            quantity,
            delete,
        } => engine
            .add(owner_id, &ProductId::from(product.as_str()), *quantity, *delete)
            .await
            .map(|update| update.warnings),
        Step::Remove { product } => engine
            .remove(owner_id, &ProductId::from(product.as_str()))
            .await
            .map(|update| update.warnings),
        Step::Decrement { product } => engine
            .decrement(owner_id, &ProductId::from(product.as_str()))
            .await
            .map(|update| update.warnings),
        Step::Reset => {
            engine.reset().await;
            Ok(Vec::new())
        }
    }
}

fn print_step(
    ctx: &Context,
    cart: &Cart,
    summary: &CartSummary,
    warnings: &[SyncWarning],
    error: Option<&SyncError>,
    shipping_changed: bool,
    tier: ShippingTier,
) {
    if let Some(error) = error {
        ctx.output.warn(&format!("Step failed, cart unchanged: {}", error));
    }
    for warning in warnings {
        ctx.output.warn(&warning.to_string());
    }

    ctx.output.cart_table(cart);
    if shipping_changed {
        ctx.output.info(&format!("Shipping selection changed to {}", tier));
    }
    ctx.output.kv(
        "Subtotal",
        &format!(
            "{}  shipping {} ({})  total {}",
            summary.pricing.subtotal.display(),
            summary.pricing.shipping.cost.display(),
            summary.pricing.shipping.tier,
            summary.pricing.total.display()
        ),
    );
    ctx.output.kv("Eco-Meter", &eco_badge(&summary.eco));
}
