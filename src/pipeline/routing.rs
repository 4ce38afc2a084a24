//! Routing — resolves the provider/model pair that should handle a request.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{Chain, InvocationFilter, ROUTING_ORDER};
use crate::registry::ProviderRegistry;
use crate::types::{InvocationContext, InvocationResponse};
use crate::{GatewayError, Result};

/// Filter that binds `context.provider`/`context.model` from the request
/// hints before the terminal handler runs.
///
/// Resolution rules:
/// 1. A missing model hint fails immediately with `ModelNotFound`.
/// 2. An explicit provider hint is a hard constraint: the model must exist
///    under that provider, and no other provider is considered. The hint
///    bypasses the enabled flag, so operators can still reach a disabled
///    provider by naming it.
/// 3. Without a provider hint, enabled providers are scanned in registry
///    order and the first model whose id matches the hint wins. Disabled
///    providers are invisible on this path.
pub struct RoutingFilter {
    registry: Arc<ProviderRegistry>,
}

impl RoutingFilter {
    pub fn new(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl InvocationFilter for RoutingFilter {
    fn order(&self) -> i32 {
        ROUTING_ORDER
    }

    async fn filter(
        &self,
        context: &mut InvocationContext,
        chain: Chain<'_>,
    ) -> Result<InvocationResponse> {
        let request = context.request();
        let provider_hint = request.provider_hint().map(str::to_owned);
        let Some(model_hint) = request.model_hint().map(str::to_owned) else {
            return Err(GatewayError::ModelNotFound(
                "model hint is required to route the request".to_string(),
            ));
        };

        if let Some(provider_hint) = provider_hint {
            let provider = self.registry.find_provider(&provider_hint);
            let model = self.registry.find_model(&provider_hint, &model_hint);
            return match (provider, model) {
                (Some(provider), Some(model)) => {
                    debug!(provider = %provider.id, model = %model.model_id, "routed via explicit hint");
                    context.set_provider(provider);
                    context.set_model(model);
                    chain.next(context).await
                }
                _ => Err(GatewayError::ModelNotFound(format!(
                    "model {model_hint} not available for provider {provider_hint}"
                ))),
            };
        }

        let snapshot = self.registry.list_providers();
        let resolved = snapshot
            .iter()
            .filter(|provider| provider.enabled)
            .find_map(|provider| {
                provider
                    .find_model(&model_hint)
                    .map(|model| (provider.clone(), model.clone()))
            });
        match resolved {
            Some((provider, model)) => {
                debug!(provider = %provider.id, model = %model.model_id, "routed via registry scan");
                context.set_provider(provider);
                context.set_model(model);
                chain.next(context).await
            }
            None => Err(GatewayError::ModelNotFound(format!(
                "model {model_hint} not configured"
            ))),
        }
    }
}
