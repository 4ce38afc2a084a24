//! Configuration loading for heimdall.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. Explicit path (e.g. from a CLI flag)
//! 2. `~/.heimdall/config.toml` (user)
//! 3. `/etc/heimdall/config.toml` (system)
//!
//! The file carries the provider/model tree consumed by
//! [`ProviderRegistry::refresh`](crate::registry::ProviderRegistry::refresh):
//!
//! ```toml
//! [[providers]]
//! id = "openai"
//! display_name = "OpenAI"
//! enabled = true
//!
//! [[providers.models]]
//! id = "gpt-4o-mini"
//! type = "chat"
//! capabilities = ["chat"]
//! fallback_priority = ["gemini-1.5-flash"]
//!
//! [providers.models.pricing]
//! input_cost = 0.00000015
//! output_cost = 0.0000006
//! currency = "USD"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{ModelDescriptor, ProviderDescriptor};
use crate::{GatewayError, Result};

/// Root gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// Configured upstream providers, in routing-scan order.
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

/// A single upstream provider (e.g. OpenAI, Gemini).
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Unique provider identifier used for routing hints.
    pub id: String,
    /// Human-readable provider name for observability and docs.
    pub display_name: String,
    /// Whether the provider should receive hint-less traffic (default: true).
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Models exposed by the provider, in configuration order.
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

fn default_enabled() -> bool {
    true
}

/// An individual model exposed by a provider.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model identifier used by the invocation pipeline.
    pub id: String,
    /// High-level model type (chat, embedding, ...).
    #[serde(rename = "type")]
    pub model_type: String,
    /// Declared capabilities so routing can match features without
    /// hard-coded model names.
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Pricing metadata used for spend tracking.
    #[serde(default)]
    pub pricing: PricingConfig,
    /// Ordered fallback model ids. The registry preserves order when
    /// resolving candidates.
    #[serde(default)]
    pub fallback_priority: Vec<String>,
}

/// Per-token pricing for a model.
#[derive(Debug, Clone, Deserialize)]
pub struct PricingConfig {
    /// Cost per input token.
    #[serde(default)]
    pub input_cost: f64,
    /// Cost per output token.
    #[serde(default)]
    pub output_cost: f64,
    /// Currency code for the cost values (default: USD).
    #[serde(default = "default_currency")]
    pub currency: String,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            input_cost: 0.0,
            output_cost: 0.0,
            currency: default_currency(),
        }
    }
}

fn default_currency() -> String {
    "USD".to_string()
}

impl GatewayConfig {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided)
    /// 2. `~/.heimdall/config.toml`
    /// 3. `/etc/heimdall/config.toml`
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let path = Self::resolve_config_path(explicit_path)?;
        let content = fs::read_to_string(&path).map_err(|e| {
            GatewayError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GatewayError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| GatewayError::Configuration(format!("Failed to parse config: {e}")))
    }

    fn resolve_config_path(explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(path.to_path_buf());
            }
            return Err(GatewayError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".heimdall").join("config.toml");
            if user_config.exists() {
                return Ok(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/heimdall/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }

        Err(GatewayError::Configuration(
            "No config file found. Create ~/.heimdall/config.toml or /etc/heimdall/config.toml"
                .to_string(),
        ))
    }

    /// Validate the provider tree.
    ///
    /// Rejects configurations that would boot the gateway without any
    /// routable models: no providers, a provider without models, or a
    /// blank id.
    pub fn validate(&self) -> Result<()> {
        if self.providers.is_empty() {
            return Err(GatewayError::Configuration(
                "At least one provider must be configured".to_string(),
            ));
        }
        for provider in &self.providers {
            if provider.id.trim().is_empty() {
                return Err(GatewayError::Configuration(
                    "Provider id must not be blank".to_string(),
                ));
            }
            if provider.models.is_empty() {
                return Err(GatewayError::Configuration(format!(
                    "Provider '{}' must declare at least one model",
                    provider.id
                )));
            }
        }
        Ok(())
    }
}

impl ProviderConfig {
    /// Build the immutable descriptor for this provider.
    pub fn to_descriptor(&self) -> ProviderDescriptor {
        let models = self
            .models
            .iter()
            .map(|model| {
                ModelDescriptor::new(&self.id, &model.id, &model.model_type)
                    .capabilities(model.capabilities.clone())
                    .pricing(
                        model.pricing.input_cost,
                        model.pricing.output_cost,
                        &model.pricing.currency,
                    )
                    .fallback_priority(model.fallback_priority.clone())
            })
            .collect();
        ProviderDescriptor::new(&self.id, &self.display_name)
            .enabled(self.enabled)
            .models(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_provider_tree() {
        let toml = r#"
            [[providers]]
            id = "openai"
            display_name = "OpenAI"

            [[providers.models]]
            id = "gpt-4o-mini"
            type = "chat"
            capabilities = ["chat"]
            fallback_priority = ["gemini-1.5-flash"]

            [providers.models.pricing]
            input_cost = 0.00000015
            output_cost = 0.0000006
        "#;
        let config = GatewayConfig::from_toml(toml).unwrap();
        assert_eq!(config.providers.len(), 1);
        let provider = &config.providers[0];
        // Defaults preserved
        assert!(provider.enabled);
        assert_eq!(provider.models[0].pricing.currency, "USD");
        assert_eq!(
            provider.models[0].fallback_priority,
            vec!["gemini-1.5-flash"]
        );
    }

    #[test]
    fn descriptor_conversion() {
        let toml = r#"
            [[providers]]
            id = "gemini"
            display_name = "Google Gemini"
            enabled = false

            [[providers.models]]
            id = "gemini-1.5-flash"
            type = "chat"
        "#;
        let config = GatewayConfig::from_toml(toml).unwrap();
        let descriptor = config.providers[0].to_descriptor();
        assert_eq!(descriptor.id, "gemini");
        assert!(!descriptor.enabled);
        assert_eq!(descriptor.models[0].provider_id, "gemini");
        assert_eq!(descriptor.models[0].model_type, "chat");
    }

    #[test]
    fn validate_rejects_empty_configuration() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_provider_without_models() {
        let toml = r#"
            [[providers]]
            id = "openai"
            display_name = "OpenAI"
        "#;
        let config = GatewayConfig::from_toml(toml).unwrap();
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("at least one model"));
    }

    #[test]
    fn config_not_found_returns_error() {
        let result = GatewayConfig::load(Some(Path::new("/nonexistent/config.toml")));
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }
}
