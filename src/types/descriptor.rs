//! Provider and model descriptors.
//!
//! Descriptors are immutable value types built from configuration and
//! shared between pipeline stages to describe cost, capabilities, and
//! fallback rules. They are cheap to clone and safe to hand out of the
//! registry by value.

use serde::{Deserialize, Serialize};

/// Immutable description of a model that can be invoked through the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Identifier of the provider that owns the model.
    pub provider_id: String,
    /// Identifier exposed to clients for routing purposes.
    pub model_id: String,
    /// Model type describing the shape of the invocation (chat, embedding, ...).
    pub model_type: String,
    /// Capabilities advertised by the model (e.g. "chat", "reasoning").
    #[serde(default)]
    pub capabilities: Vec<String>,
    /// Cost per input token.
    pub input_cost: f64,
    /// Cost per output token.
    pub output_cost: f64,
    /// Currency code for the cost values.
    pub currency: String,
    /// Ordered fallback model identifiers. May reference models owned by
    /// other providers.
    #[serde(default)]
    pub fallback_priority: Vec<String>,
}

impl ModelDescriptor {
    /// Create a descriptor with zero cost in USD and no capabilities.
    ///
    /// Intended for tests and programmatic registry construction; the
    /// usual path is [`crate::config::GatewayConfig`].
    pub fn new(
        provider_id: impl Into<String>,
        model_id: impl Into<String>,
        model_type: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into(),
            model_id: model_id.into(),
            model_type: model_type.into(),
            capabilities: Vec::new(),
            input_cost: 0.0,
            output_cost: 0.0,
            currency: "USD".to_string(),
            fallback_priority: Vec::new(),
        }
    }

    /// Set the advertised capabilities.
    pub fn capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Set per-token pricing.
    pub fn pricing(mut self, input_cost: f64, output_cost: f64, currency: impl Into<String>) -> Self {
        self.input_cost = input_cost;
        self.output_cost = output_cost;
        self.currency = currency.into();
        self
    }

    /// Set the ordered fallback model ids.
    pub fn fallback_priority(mut self, fallback_priority: Vec<String>) -> Self {
        self.fallback_priority = fallback_priority;
        self
    }
}

/// Immutable representation of a provider in the registry.
///
/// Providers aggregate their exposed models and carry naming metadata used
/// for user-facing responses and observability tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    /// Unique provider identifier.
    pub id: String,
    /// Human-readable provider name.
    pub display_name: String,
    /// Whether the provider should receive hint-less traffic.
    pub enabled: bool,
    /// Models owned by the provider, in configuration order.
    #[serde(default)]
    pub models: Vec<ModelDescriptor>,
}

impl ProviderDescriptor {
    /// Create an enabled provider with no models.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            enabled: true,
            models: Vec::new(),
        }
    }

    /// Set the enabled flag.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Set the owned models.
    pub fn models(mut self, models: Vec<ModelDescriptor>) -> Self {
        self.models = models;
        self
    }

    /// Find an owned model by id. Linear scan; provider model lists are
    /// expected to stay small.
    pub fn find_model(&self, model_id: &str) -> Option<&ModelDescriptor> {
        self.models.iter().find(|m| m.model_id == model_id)
    }
}
