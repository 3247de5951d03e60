//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use dialoguer::Confirm;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, CliConfig, CONFIG_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx).await,
        ConfigCommand::Init { force } => init_config(force, ctx).await,
        ConfigCommand::Validate => validate_config(ctx).await,
    }
}

async fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(built-in defaults)"),
    }

    let config = &ctx.config;

    ctx.output.info("");
    ctx.output.info("[pricing]");
    ctx.output.kv(
        "free_shipping_threshold_cents",
        &config.pricing.free_shipping_threshold_cents.to_string(),
    );
    ctx.output.kv("standard_cost_cents", &config.pricing.standard_cost_cents.to_string());
    ctx.output.kv("express_cost_cents", &config.pricing.express_cost_cents.to_string());

    ctx.output.info("");
    ctx.output.info("[eco]");
    ctx.output.kv("default_rating", &config.eco.default_rating.to_string());
    ctx.output.kv("minimum_bonus", &config.eco.minimum_bonus.to_string());
    for rung in &config.eco.ladder {
        ctx.output.list_item(&format!(
            ">= {:.2}% donation: +{}",
            f64::from(rung.min_ratio_bps) / 100.0,
            rung.bonus
        ));
    }

    ctx.output.info("");
    ctx.output.info("[defaults]");
    ctx.output.kv("owner_id", &config.defaults.owner_id);
    ctx.output.kv("currency", config.defaults.currency.code());
    ctx.output.kv("shipping", config.defaults.shipping.as_str());

    Ok(())
}

async fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join(CONFIG_NAMES[0]);

    if config_path.exists() && !force {
        if !console::user_attended() {
            bail!(
                "Config file already exists: {}. Use --force to overwrite.",
                config_path.display()
            );
        }
        let overwrite = Confirm::new()
            .with_prompt(format!("{} exists. Overwrite?", config_path.display()))
            .default(false)
            .interact()?;
        if !overwrite {
            ctx.output.warn("Config init cancelled");
            return Ok(());
        }
    }

    fs::write(&config_path, generate_default_config())?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

async fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");
    if ctx.config_path.is_none() {
        ctx.output.info("No config file found; checking built-in defaults");
    }

    let warnings = lint(&ctx.config);

    // Hard errors were already rejected when the file was loaded.
    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }
    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Settings that load fine but are probably not what was meant.
fn lint(config: &CliConfig) -> Vec<String> {
    let mut warnings = Vec::new();
    let pricing = &config.pricing;

    if pricing.express_cost_cents < pricing.standard_cost_cents {
        warnings.push("pricing.express_cost_cents is below pricing.standard_cost_cents".to_string());
    }
    if pricing.free_shipping_threshold_cents == 0 {
        warnings.push("pricing.free_shipping_threshold_cents is 0, so every cart ships free".to_string());
    }
    if config.eco.ladder.is_empty() {
        warnings.push("eco.ladder is empty, so every donation earns eco.minimum_bonus".to_string());
    }
    if let Some(rung) = config.eco.ladder.iter().find(|r| r.bonus > 100) {
        warnings.push(format!(
            "eco.ladder bonus {} exceeds the 100-point scale",
            rung.bonus
        ));
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_commerce::eco::DonationBracket;

    #[test]
    fn test_default_config_is_clean() {
        assert!(lint(&CliConfig::default()).is_empty());
    }

    #[test]
    fn test_lint_flags_suspicious_settings() {
        let mut config = CliConfig::default();
        config.pricing.express_cost_cents = 100;
        config.pricing.free_shipping_threshold_cents = 0;
        config.eco.ladder = vec![DonationBracket::new(500, 120)];

        assert_eq!(lint(&config).len(), 3);
    }
}
