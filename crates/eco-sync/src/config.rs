//! Engine configuration.

use std::path::Path;

use eco_commerce::checkout::PricingPolicy;
use eco_commerce::eco::EcoPolicy;
use eco_commerce::CommerceError;
use serde::{Deserialize, Serialize};

/// Error loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to render TOML config: {0}")]
    TomlRender(#[from] toml::ser::Error),

    #[error("failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(#[from] CommerceError),
}

/// Pricing and scoring policies the engine's readers apply.
///
/// Every field defaults, so an empty file yields the stock policies:
///
/// ```toml
/// [pricing]
/// free_shipping_threshold_cents = 50000
/// standard_cost_cents = 7399
/// express_cost_cents = 14999
///
/// [eco]
/// default_rating = 30.0
/// minimum_bonus = 5
///
/// [[eco.ladder]]
/// min_ratio_bps = 500
/// bonus = 25
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pricing: PricingPolicy,
    pub eco: EcoPolicy,
}

impl EngineConfig {
    /// Load and validate a config file. `.json` files are read as JSON,
    /// anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Parse and validate TOML.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Render as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check both policies.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()?;
        self.eco.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eco_commerce::eco::DonationBracket;

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_toml_str(
            r#"
            [pricing]
            express_cost_cents = 19999

            [eco]
            default_rating = 40.0
            "#,
        )
        .unwrap();

        assert_eq!(config.pricing.express_cost_cents, 19_999);
        assert_eq!(config.pricing.standard_cost_cents, 7_399);
        assert_eq!(config.eco.default_rating, 40.0);
        assert_eq!(config.eco.ladder.len(), 4);
    }

    #[test]
    fn test_toml_roundtrip_of_ladder() {
        let mut config = EngineConfig::default();
        config.eco.ladder = vec![DonationBracket::new(1_000, 30), DonationBracket::new(100, 5)];

        let rendered = config.to_toml_string().unwrap();
        assert_eq!(EngineConfig::from_toml_str(&rendered).unwrap(), config);
    }

    #[test]
    fn test_json_config() {
        let config =
            EngineConfig::from_json_str(r#"{"pricing": {"free_shipping_threshold_cents": 10000}}"#).unwrap();
        assert_eq!(config.pricing.free_shipping_threshold_cents, 10_000);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = EngineConfig::from_toml_str(
            r#"
            [[eco.ladder]]
            min_ratio_bps = 100
            bonus = 10

            [[eco.ladder]]
            min_ratio_bps = 300
            bonus = 20
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = EngineConfig::from_toml_str("[pricing]\nstandard_cost_cents = -5\n");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = EngineConfig::load("/nonexistent/ecocart.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
