//! CLI configuration.

use std::path::Path;

use anyhow::{Context, Result};
use eco_commerce::checkout::{PricingPolicy, ShippingTier};
use eco_commerce::eco::EcoPolicy;
use eco_commerce::Currency;
use eco_sync::EngineConfig;
use serde::{Deserialize, Serialize};

/// File names searched for, in order, in each directory.
pub const CONFIG_NAMES: [&str; 3] = ["ecocart.toml", ".ecocart.toml", "ecocart.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Shipping price list.
    #[serde(default)]
    pub pricing: PricingPolicy,

    /// Eco-Meter tunables.
    #[serde(default)]
    pub eco: EcoPolicy,

    /// Values used when a command or input file leaves them out.
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

impl CliConfig {
    /// Load and validate config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))?
        };

        config
            .engine()
            .validate()
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        Ok(config)
    }

    /// The policies the engine's readers apply.
    pub fn engine(&self) -> EngineConfig {
        EngineConfig {
            pricing: self.pricing,
            eco: self.eco.clone(),
        }
    }
}

/// Fallback values for commands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Owner used by scenarios that name none.
    #[serde(default = "default_owner")]
    pub owner_id: String,

    /// Currency of prices in input files.
    #[serde(default)]
    pub currency: Currency,

    /// Shipping tier requested when `--shipping` is not given.
    #[serde(default)]
    pub shipping: ShippingTier,
}

fn default_owner() -> String {
    "guest".to_string()
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            owner_id: default_owner(),
            currency: Currency::default(),
            shipping: ShippingTier::default(),
        }
    }
}

/// Generate a default ecocart.toml config file.
pub fn generate_default_config() -> String {
    r#"# EcoCart configuration

[pricing]
# Subtotals at or above this (in cents) ship free.
free_shipping_threshold_cents = 50000
standard_cost_cents = 7399
express_cost_cents = 14999

[eco]
# Rating assumed for products without one (0-100).
default_rating = 30.0
# Bonus for a positive donation below the lowest rung.
minimum_bonus = 5

# Donation/subtotal ratio in basis points, highest first.
[[eco.ladder]]
min_ratio_bps = 500
bonus = 25

[[eco.ladder]]
min_ratio_bps = 300
bonus = 20

[[eco.ladder]]
min_ratio_bps = 200
bonus = 15

[[eco.ladder]]
min_ratio_bps = 100
bonus = 10

[defaults]
owner_id = "guest"
currency = "USD"
shipping = "standard"
"#
    .to_string()
}
