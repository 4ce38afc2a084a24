//! Backend model clients and their registry.
//!
//! A [`ModelClient`] translates a prepared invocation context into an
//! upstream wire call. The [`ModelClientRegistry`] locates the client for a
//! resolved descriptor with first-match-wins semantics over the
//! registration order; no match is a deployment misconfiguration surfaced
//! as [`GatewayError::NoSupportingClient`].

pub mod gemini;
pub mod openai;

pub use gemini::{GeminiChatClient, GeminiClientConfig};
pub use openai::{OpenAiChatClient, OpenAiClientConfig};

use std::sync::Arc;

use async_trait::async_trait;

use crate::pipeline::InvocationHandler;
use crate::types::{InvocationContext, InvocationResponse, ModelDescriptor};
use crate::{GatewayError, Result};

/// Contract for provider-specific client implementations.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Whether this client can handle the supplied descriptor.
    fn supports(&self, descriptor: &ModelDescriptor) -> bool;

    /// Perform the model invocation. The context carries the resolved
    /// provider and model along with the original request payload.
    async fn invoke(&self, context: &InvocationContext) -> Result<InvocationResponse>;
}

impl std::fmt::Debug for dyn ModelClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ModelClient")
    }
}

/// Locates the correct [`ModelClient`] for a resolved descriptor.
pub struct ModelClientRegistry {
    delegates: Vec<Arc<dyn ModelClient>>,
}

impl ModelClientRegistry {
    /// Create a registry over the supplied clients. Registration order is
    /// resolution order.
    pub fn new(delegates: Vec<Arc<dyn ModelClient>>) -> Self {
        Self { delegates }
    }

    /// Return the first client that reports support for the descriptor.
    pub fn resolve(&self, descriptor: &ModelDescriptor) -> Result<Arc<dyn ModelClient>> {
        self.delegates
            .iter()
            .find(|delegate| delegate.supports(descriptor))
            .cloned()
            .ok_or_else(|| GatewayError::NoSupportingClient(descriptor.model_id.clone()))
    }
}

/// Terminal handler that dispatches to the resolved backend client.
pub struct ClientInvocationHandler {
    registry: ModelClientRegistry,
}

impl ClientInvocationHandler {
    pub fn new(registry: ModelClientRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl InvocationHandler for ClientInvocationHandler {
    async fn invoke(&self, context: &mut InvocationContext) -> Result<InvocationResponse> {
        // Routing binds the model before the handler runs; a bare context
        // here means the pipeline was assembled without a routing filter.
        let model = context.model().ok_or_else(|| {
            GatewayError::ModelNotFound("no model resolved for invocation".to_string())
        })?;
        let client = self.registry.resolve(model)?;
        client.invoke(context).await
    }
}
