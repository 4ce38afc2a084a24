//! Request, context, and response types for the invocation pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::descriptor::{ModelDescriptor, ProviderDescriptor};

/// Well-known keys in [`InvocationResponse`] metadata.
///
/// Backend clients populate these; the usage-tracking filter reads them
/// back out. Missing numeric entries default to zero rather than failing
/// the request.
pub mod metadata {
    /// Resolved provider id.
    pub const PROVIDER: &str = "provider";
    /// Resolved model id.
    pub const MODEL: &str = "model";
    /// Tokens consumed by the prompt.
    pub const INPUT_TOKENS: &str = "input_tokens";
    /// Tokens produced by the completion.
    pub const OUTPUT_TOKENS: &str = "output_tokens";
    /// Total invocation cost in the model's currency.
    pub const COST: &str = "cost";
    /// Currency code for the cost value.
    pub const CURRENCY: &str = "currency";
}

/// Immutable inbound invocation request.
///
/// Carries optional provider/model hints, a provider-agnostic payload that
/// is forwarded to the backend client, and ancillary attributes consumed by
/// pipeline stages (e.g. a tenant id). Hints may be absent; a missing model
/// hint is a legal input that fails deterministically in the routing stage.
#[derive(Debug, Clone, PartialEq)]
pub struct InvocationRequest {
    provider_hint: Option<String>,
    model_hint: Option<String>,
    payload: Map<String, Value>,
    attributes: Map<String, Value>,
}

impl InvocationRequest {
    /// Create a new builder instance.
    pub fn builder() -> InvocationRequestBuilder {
        InvocationRequestBuilder::default()
    }

    /// Optional provider hint supplied by clients.
    pub fn provider_hint(&self) -> Option<&str> {
        self.provider_hint.as_deref()
    }

    /// Optional model hint supplied by clients.
    pub fn model_hint(&self) -> Option<&str> {
        self.model_hint.as_deref()
    }

    /// Provider-agnostic payload forwarded to the backend client.
    pub fn payload(&self) -> &Map<String, Value> {
        &self.payload
    }

    /// Attributes that travel with the request through the pipeline.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }
}

/// Builder for [`InvocationRequest`].
#[derive(Debug, Default)]
pub struct InvocationRequestBuilder {
    provider_hint: Option<String>,
    model_hint: Option<String>,
    payload: Map<String, Value>,
    attributes: Map<String, Value>,
}

impl InvocationRequestBuilder {
    /// Set the provider hint.
    pub fn provider_hint(mut self, hint: impl Into<String>) -> Self {
        self.provider_hint = Some(hint.into());
        self
    }

    /// Set the model hint.
    pub fn model_hint(mut self, hint: impl Into<String>) -> Self {
        self.model_hint = Some(hint.into());
        self
    }

    /// Supply the request payload map.
    pub fn payload(mut self, payload: Map<String, Value>) -> Self {
        self.payload = payload;
        self
    }

    /// Insert a single payload entry.
    pub fn payload_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Supply attributes that will be copied into the invocation context.
    pub fn attributes(mut self, attributes: Map<String, Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Insert a single attribute entry.
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Build the immutable request instance.
    pub fn build(self) -> InvocationRequest {
        InvocationRequest {
            provider_hint: self.provider_hint,
            model_hint: self.model_hint,
            payload: self.payload,
            attributes: self.attributes,
        }
    }
}

/// Mutable context shared between invocation filters.
///
/// The context lets filters attach additional metadata without mutating the
/// original [`InvocationRequest`]. It is created by the pipeline entry point
/// and owned by a single request flow: filters nest, they never touch the
/// context concurrently.
#[derive(Debug)]
pub struct InvocationContext {
    request: InvocationRequest,
    provider: Option<ProviderDescriptor>,
    model: Option<ModelDescriptor>,
    attributes: Map<String, Value>,
}

impl InvocationContext {
    /// Create a new context derived from the incoming request. The request's
    /// attributes seed the context's mutable attribute map.
    pub fn new(request: InvocationRequest) -> Self {
        let attributes = request.attributes().clone();
        Self {
            request,
            provider: None,
            model: None,
            attributes,
        }
    }

    /// The original request.
    pub fn request(&self) -> &InvocationRequest {
        &self.request
    }

    /// The resolved provider descriptor, if routing has run.
    pub fn provider(&self) -> Option<&ProviderDescriptor> {
        self.provider.as_ref()
    }

    /// Bind the resolved provider descriptor.
    pub fn set_provider(&mut self, provider: ProviderDescriptor) {
        self.provider = Some(provider);
    }

    /// The resolved model descriptor, if routing has run.
    pub fn model(&self) -> Option<&ModelDescriptor> {
        self.model.as_ref()
    }

    /// Bind the resolved model descriptor.
    pub fn set_model(&mut self, model: ModelDescriptor) {
        self.model = Some(model);
    }

    /// Attribute map available to downstream filters.
    pub fn attributes(&self) -> &Map<String, Value> {
        &self.attributes
    }

    /// Mutable attribute map for filters that want to attach data.
    pub fn attributes_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.attributes
    }
}

/// Immutable response produced by the invocation pipeline.
///
/// The response is serialisable so it can be stored in the response cache;
/// payload, metadata, and latency all survive the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationResponse {
    /// Raw response payload returned to clients.
    #[serde(default)]
    pub payload: Map<String, Value>,
    /// Metadata such as provider, model, token usage, or cost.
    /// See [`metadata`] for well-known keys.
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Time spent processing the invocation end-to-end. Stamped by the
    /// telemetry filter on the way out, so cached responses report the
    /// latency of the invocation that served them.
    #[serde(default)]
    pub latency: Duration,
}

impl InvocationResponse {
    /// Create a response from payload and metadata with zero latency.
    pub fn new(payload: Map<String, Value>, metadata: Map<String, Value>) -> Self {
        Self {
            payload,
            metadata,
            latency: Duration::ZERO,
        }
    }

    /// Return a copy of this response with the latency field replaced.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_seeds_attributes_from_request() {
        let request = InvocationRequest::builder()
            .model_hint("gpt-4o-mini")
            .attribute("tenant", "acme")
            .build();
        let mut context = InvocationContext::new(request);
        assert_eq!(context.attributes()["tenant"], "acme");

        // Filters can attach data without touching the original request.
        context
            .attributes_mut()
            .insert("trace_id".into(), "abc".into());
        assert_eq!(context.request().attributes().len(), 1);
        assert_eq!(context.attributes().len(), 2);
    }

    #[test]
    fn response_round_trips_through_json() {
        let mut payload = Map::new();
        payload.insert("content".into(), "hello".into());
        let mut meta = Map::new();
        meta.insert(metadata::MODEL.into(), "gpt-4o-mini".into());
        meta.insert(metadata::INPUT_TOKENS.into(), 12u64.into());

        let response = InvocationResponse::new(payload, meta)
            .with_latency(Duration::from_millis(250));
        let serialized = serde_json::to_string(&response).unwrap();
        let restored: InvocationResponse = serde_json::from_str(&serialized).unwrap();
        assert_eq!(restored, response);
    }
}
