//! Gateway assembly: the builder and the assembled [`Gateway`].

mod builder;

pub use builder::{GatewayBuilder, Heimdall};

use std::sync::Arc;

use crate::Result;
use crate::config::GatewayConfig;
use crate::pipeline::InvocationPipeline;
use crate::registry::ProviderRegistry;
use crate::types::{InvocationRequest, InvocationResponse};

/// An assembled invocation gateway.
///
/// Holds the filter pipeline and the provider registry. Construct one with
/// [`Heimdall::builder`]; the instance is `Send + Sync` and meant to be
/// shared (for example in an `Arc`) across whatever serving layer sits on
/// top.
pub struct Gateway {
    pipeline: InvocationPipeline,
    registry: Arc<ProviderRegistry>,
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

impl Gateway {
    pub(crate) fn new(pipeline: InvocationPipeline, registry: Arc<ProviderRegistry>) -> Self {
        Self { pipeline, registry }
    }

    /// Invoke a model through the full filter pipeline.
    pub async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        self.pipeline.invoke(request).await
    }

    /// The provider registry backing this gateway.
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Replace the registry contents from updated configuration. In-flight
    /// invocations keep the snapshot they started with.
    pub fn refresh(&self, config: &GatewayConfig) {
        self.registry.refresh(config);
    }
}
