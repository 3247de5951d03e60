//! CLI command implementations.

pub mod config;
pub mod quote;
pub mod simulate;

use std::path::Path;

use anyhow::{Context as _, Result};
use clap::{Args, Subcommand};
use eco_commerce::checkout::ShippingTier;
use serde::de::DeserializeOwned;

/// Read an input file, as JSON when it ends in `.json` and TOML otherwise.
pub(crate) fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;

    if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&content).with_context(|| format!("Failed to parse JSON: {}", path.display()))
    } else {
        toml::from_str(&content).with_context(|| format!("Failed to parse TOML: {}", path.display()))
    }
}

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Cart file (TOML or JSON).
    pub cart: String,

    /// Requested shipping tier: standard, express or free.
    #[arg(short, long)]
    pub shipping: Option<ShippingTier>,

    /// Donation amount, e.g. 6.00.
    #[arg(short, long, default_value = "0")]
    pub donation: f64,
}

/// Arguments for the simulate command.
#[derive(Args)]
pub struct SimulateArgs {
    /// Scenario file (TOML or JSON).
    pub scenario: String,

    /// Remote latency per call, in milliseconds.
    #[arg(long, default_value = "0")]
    pub latency_ms: u64,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the config file.
    Validate,
}
