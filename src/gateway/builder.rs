//! Builder for configuring gateway instances.

use std::sync::Arc;

use super::Gateway;
use crate::cache::{CacheConfig, CacheService, MemoryCacheService};
use crate::client::{
    ClientInvocationHandler, GeminiChatClient, GeminiClientConfig, ModelClient,
    ModelClientRegistry, OpenAiChatClient, OpenAiClientConfig,
};
use crate::config::GatewayConfig;
use crate::pipeline::{
    CachingFilter, InvocationFilter, InvocationPipeline, RoutingFilter, TelemetryFilter,
    UsageTrackingFilter,
};
use crate::registry::ProviderRegistry;
use crate::usage::{LoggingUsageRecorder, UsageRecorder};
use crate::{GatewayError, Result};

/// Main entry point for creating gateway instances.
pub struct Heimdall;

impl Heimdall {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }
}

/// Builder for configuring gateway instances.
pub struct GatewayBuilder {
    config: Option<GatewayConfig>,
    cache_config: Option<CacheConfig>,
    cache_service: Option<Arc<dyn CacheService>>,
    clients: Vec<Arc<dyn ModelClient>>,
    recorder: Option<Arc<dyn UsageRecorder>>,
    extra_filters: Vec<Arc<dyn InvocationFilter>>,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            cache_config: None,
            cache_service: None,
            clients: Vec::new(),
            recorder: None,
            extra_filters: Vec::new(),
        }
    }

    /// Supply the provider/model configuration.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Register the OpenAI chat client.
    pub fn openai(mut self, api_key: impl Into<String>) -> Self {
        self.clients
            .push(Arc::new(OpenAiChatClient::new(OpenAiClientConfig::new(
                api_key,
            ))));
        self
    }

    /// Register the OpenAI chat client with explicit configuration.
    pub fn openai_config(mut self, config: OpenAiClientConfig) -> Self {
        self.clients.push(Arc::new(OpenAiChatClient::new(config)));
        self
    }

    /// Register the Gemini chat client.
    pub fn gemini(mut self, api_key: impl Into<String>) -> Self {
        self.clients
            .push(Arc::new(GeminiChatClient::new(GeminiClientConfig::new(
                api_key,
            ))));
        self
    }

    /// Register the Gemini chat client with explicit configuration.
    pub fn gemini_config(mut self, config: GeminiClientConfig) -> Self {
        self.clients.push(Arc::new(GeminiChatClient::new(config)));
        self
    }

    /// Register a custom backend client. Registration order is resolution
    /// order when several clients support the same model.
    pub fn client(mut self, client: Arc<dyn ModelClient>) -> Self {
        self.clients.push(client);
        self
    }

    /// Enable the in-memory response cache.
    pub fn cache(mut self, config: CacheConfig) -> Self {
        self.cache_config = Some(config);
        self
    }

    /// Enable response caching backed by a custom store.
    pub fn cache_service(mut self, cache: Arc<dyn CacheService>) -> Self {
        self.cache_service = Some(cache);
        self
    }

    /// Replace the default logging usage recorder.
    pub fn usage_recorder(mut self, recorder: Arc<dyn UsageRecorder>) -> Self {
        self.recorder = Some(recorder);
        self
    }

    /// Add an extra filter to the pipeline. Its [`InvocationFilter::order`]
    /// decides where it nests relative to the stock filters.
    pub fn filter(mut self, filter: Arc<dyn InvocationFilter>) -> Self {
        self.extra_filters.push(filter);
        self
    }

    /// Build the gateway.
    ///
    /// Requires a validated configuration and at least one backend client.
    pub fn build(self) -> Result<Gateway> {
        let config = self.config.ok_or_else(|| {
            GatewayError::Configuration("gateway configuration is required".to_string())
        })?;
        config.validate()?;
        if self.clients.is_empty() {
            return Err(GatewayError::Configuration(
                "at least one backend client is required".to_string(),
            ));
        }

        let registry = Arc::new(ProviderRegistry::new(&config));

        let recorder = self
            .recorder
            .unwrap_or_else(|| Arc::new(LoggingUsageRecorder));

        let mut filters: Vec<Arc<dyn InvocationFilter>> = vec![
            Arc::new(TelemetryFilter),
            Arc::new(UsageTrackingFilter::new(recorder)),
            Arc::new(RoutingFilter::new(registry.clone())),
        ];
        let cache = self.cache_service.or_else(|| {
            self.cache_config
                .map(|config| Arc::new(MemoryCacheService::new(&config)) as Arc<dyn CacheService>)
        });
        if let Some(cache) = cache {
            filters.push(Arc::new(CachingFilter::new(cache)));
        }
        filters.extend(self.extra_filters);

        let handler = Arc::new(ClientInvocationHandler::new(ModelClientRegistry::new(
            self.clients,
        )));

        Ok(Gateway::new(
            InvocationPipeline::new(filters, handler),
            registry,
        ))
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
