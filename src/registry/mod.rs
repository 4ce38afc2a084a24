//! Provider registry — runtime-refreshable provider and model metadata.
//!
//! The registry exposes the configured provider/model tree to the routing
//! filter and anything else that needs descriptor lookups. Lookups never
//! fail: absence is an empty or `None` result, because routing treats
//! "not found" as ordinary control flow.
//!
//! # Refresh semantics
//!
//! The provider set lives in an immutable snapshot behind an `RwLock`.
//! [`ProviderRegistry::refresh`] builds a complete new snapshot off to the
//! side and publishes it with a single swap, so concurrent readers either
//! see the old registry or the new one — never a half-built mix of both.
//! Readers clone the snapshot `Arc` and iterate without holding the lock.

use std::sync::{Arc, RwLock};

use crate::config::GatewayConfig;
use crate::types::{ModelDescriptor, ProviderDescriptor};

/// Immutable view of the provider set at one point in time.
///
/// Providers keep their configuration order, which defines the scan order
/// for hint-less routing and for fallback-candidate resolution.
pub type RegistrySnapshot = Arc<Vec<ProviderDescriptor>>;

/// Runtime-refreshable registry of providers and their models.
pub struct ProviderRegistry {
    snapshot: RwLock<RegistrySnapshot>,
}

impl ProviderRegistry {
    /// Create a registry from the supplied configuration.
    pub fn new(config: &GatewayConfig) -> Self {
        let registry = Self::empty();
        registry.refresh(config);
        registry
    }

    /// Create a registry with no providers.
    pub fn empty() -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(Vec::new())),
        }
    }

    /// Current snapshot of all configured providers, in configuration order.
    ///
    /// Safe to iterate while a concurrent [`refresh`](Self::refresh) runs;
    /// the returned snapshot is immutable.
    pub fn list_providers(&self) -> RegistrySnapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Resolve a provider descriptor by id.
    pub fn find_provider(&self, provider_id: &str) -> Option<ProviderDescriptor> {
        self.list_providers()
            .iter()
            .find(|p| p.id == provider_id)
            .cloned()
    }

    /// Find a model descriptor for the given provider/model combination.
    pub fn find_model(&self, provider_id: &str, model_id: &str) -> Option<ModelDescriptor> {
        self.list_providers()
            .iter()
            .find(|p| p.id == provider_id)
            .and_then(|p| p.find_model(model_id))
            .cloned()
    }

    /// All models that advertise a given capability, across all providers.
    ///
    /// Order follows provider configuration order and is stable across
    /// repeated calls on the same snapshot.
    pub fn find_models_by_capability(&self, capability: &str) -> Vec<ModelDescriptor> {
        self.list_providers()
            .iter()
            .flat_map(|p| p.models.iter())
            .filter(|m| m.capabilities.iter().any(|c| c == capability))
            .cloned()
            .collect()
    }

    /// Resolve fallback candidates for a model, respecting configured priority.
    ///
    /// Each id in the model's `fallback_priority` list is resolved
    /// independently to the first matching model across all providers, so
    /// the configured order is preserved exactly. Ids with no match are
    /// skipped; duplicate ids produce duplicate entries. Callers that
    /// attempt failover must try candidates strictly in this order.
    pub fn find_fallback_candidates(&self, model: &ModelDescriptor) -> Vec<ModelDescriptor> {
        let snapshot = self.list_providers();
        let mut candidates = Vec::new();
        for candidate_id in &model.fallback_priority {
            if let Some(found) = snapshot
                .iter()
                .flat_map(|p| p.models.iter())
                .find(|m| &m.model_id == candidate_id)
            {
                candidates.push(found.clone());
            }
        }
        candidates
    }

    /// Rebuild the provider set from the supplied configuration.
    ///
    /// The whole snapshot is replaced in one swap; a reader never observes
    /// a state mixing providers from the old and new configuration.
    pub fn refresh(&self, config: &GatewayConfig) {
        let rebuilt: Vec<ProviderDescriptor> = config
            .providers
            .iter()
            .map(|provider| provider.to_descriptor())
            .collect();
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(rebuilt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ModelDescriptor;

    fn registry_from_toml(toml: &str) -> ProviderRegistry {
        ProviderRegistry::new(&GatewayConfig::from_toml(toml).unwrap())
    }

    const TWO_PROVIDERS: &str = r#"
        [[providers]]
        id = "openai"
        display_name = "OpenAI"

        [[providers.models]]
        id = "gpt-4o-mini"
        type = "chat"
        capabilities = ["chat"]

        [[providers.models]]
        id = "gpt-4o"
        type = "chat"
        capabilities = ["chat", "reasoning"]

        [[providers]]
        id = "gemini"
        display_name = "Google Gemini"

        [[providers.models]]
        id = "gemini-1.5-flash"
        type = "chat"
        capabilities = ["chat"]
    "#;

    #[test]
    fn list_providers_keeps_configuration_order() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        let providers = registry.list_providers();
        assert_eq!(providers[0].id, "openai");
        assert_eq!(providers[1].id, "gemini");
    }

    #[test]
    fn find_model_scopes_to_provider() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        assert!(registry.find_model("openai", "gpt-4o").is_some());
        assert!(registry.find_model("gemini", "gpt-4o").is_none());
        assert!(registry.find_model("missing", "gpt-4o").is_none());
    }

    #[test]
    fn capability_lookup_is_stable() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        let first: Vec<String> = registry
            .find_models_by_capability("chat")
            .into_iter()
            .map(|m| m.model_id)
            .collect();
        let second: Vec<String> = registry
            .find_models_by_capability("chat")
            .into_iter()
            .map(|m| m.model_id)
            .collect();
        assert_eq!(first, second);
        assert_eq!(first, vec!["gpt-4o-mini", "gpt-4o", "gemini-1.5-flash"]);
    }

    #[test]
    fn fallback_candidates_preserve_priority_order() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        // "b" doesn't exist anywhere; the remaining ids resolve in
        // configured order, not registry order.
        let model = ModelDescriptor::new("openai", "gpt-4o-mini", "chat").fallback_priority(vec![
            "gemini-1.5-flash".into(),
            "b".into(),
            "gpt-4o".into(),
        ]);
        let candidates: Vec<String> = registry
            .find_fallback_candidates(&model)
            .into_iter()
            .map(|m| m.model_id)
            .collect();
        assert_eq!(candidates, vec!["gemini-1.5-flash", "gpt-4o"]);
    }

    #[test]
    fn fallback_candidates_keep_duplicates() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        let model = ModelDescriptor::new("openai", "gpt-4o-mini", "chat")
            .fallback_priority(vec!["gpt-4o".into(), "gpt-4o".into()]);
        assert_eq!(registry.find_fallback_candidates(&model).len(), 2);
    }

    #[test]
    fn refresh_replaces_snapshot_wholesale() {
        let registry = registry_from_toml(TWO_PROVIDERS);
        let before = registry.list_providers();

        let replacement = r#"
            [[providers]]
            id = "anthropic"
            display_name = "Anthropic"

            [[providers.models]]
            id = "claude-sonnet-4"
            type = "chat"
        "#;
        registry.refresh(&GatewayConfig::from_toml(replacement).unwrap());

        // Old snapshot still fully intact for readers that grabbed it.
        assert_eq!(before.len(), 2);
        let after = registry.list_providers();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].id, "anthropic");
    }
}
