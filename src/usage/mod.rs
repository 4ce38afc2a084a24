//! Usage records and spend tracking sinks.

use std::time::SystemTime;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::Result;
use crate::types::{InvocationContext, InvocationResponse, metadata};

/// A single invocation's cost and token usage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    pub provider_id: String,
    pub model_id: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub cost: f64,
    pub timestamp: SystemTime,
}

impl UsageRecord {
    /// Derive a usage record from a completed invocation.
    ///
    /// Token and cost figures come from response metadata; absent entries
    /// default to zero rather than failing the request. Provider/model are
    /// taken from the resolved context when routing ran, falling back to
    /// the response metadata for cache hits (where routing was skipped).
    pub fn from_invocation(context: &InvocationContext, response: &InvocationResponse) -> Self {
        let meta = &response.metadata;
        let provider_id = context
            .provider()
            .map(|p| p.id.clone())
            .or_else(|| meta.get(metadata::PROVIDER).and_then(|v| v.as_str()).map(str::to_owned))
            .unwrap_or_else(|| "unknown".to_string());
        let model_id = context
            .model()
            .map(|m| m.model_id.clone())
            .or_else(|| meta.get(metadata::MODEL).and_then(|v| v.as_str()).map(str::to_owned))
            .unwrap_or_else(|| "unknown".to_string());
        Self {
            provider_id,
            model_id,
            input_tokens: meta
                .get(metadata::INPUT_TOKENS)
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            output_tokens: meta
                .get(metadata::OUTPUT_TOKENS)
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            cost: meta
                .get(metadata::COST)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0),
            timestamp: SystemTime::now(),
        }
    }
}

/// Sink for usage records.
///
/// Recording is best-effort from the pipeline's point of view: failures
/// are logged by the usage-tracking filter and never fail the request.
#[async_trait]
pub trait UsageRecorder: Send + Sync {
    /// Persist a usage record to the underlying store.
    async fn record(&self, record: &UsageRecord) -> Result<()>;
}

/// Baseline recorder that logs usage events through `tracing`.
///
/// Replace with a persistent implementation when backing storage is
/// introduced.
#[derive(Debug, Default)]
pub struct LoggingUsageRecorder;

#[async_trait]
impl UsageRecorder for LoggingUsageRecorder {
    async fn record(&self, record: &UsageRecord) -> Result<()> {
        info!(
            provider = %record.provider_id,
            model = %record.model_id,
            input_tokens = record.input_tokens,
            output_tokens = record.output_tokens,
            cost = record.cost,
            "usage"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InvocationRequest, ModelDescriptor, ProviderDescriptor};
    use serde_json::Map;

    #[test]
    fn record_defaults_missing_metadata_to_zero() {
        let context = InvocationContext::new(InvocationRequest::builder().build());
        let response = InvocationResponse::new(Map::new(), Map::new());
        let record = UsageRecord::from_invocation(&context, &response);
        assert_eq!(record.provider_id, "unknown");
        assert_eq!(record.model_id, "unknown");
        assert_eq!(record.input_tokens, 0);
        assert_eq!(record.output_tokens, 0);
        assert_eq!(record.cost, 0.0);
    }

    #[test]
    fn record_prefers_resolved_context() {
        let mut context = InvocationContext::new(InvocationRequest::builder().build());
        context.set_provider(ProviderDescriptor::new("openai", "OpenAI"));
        context.set_model(ModelDescriptor::new("openai", "gpt-4o-mini", "chat"));

        let mut meta = Map::new();
        meta.insert(metadata::INPUT_TOKENS.into(), 120u64.into());
        meta.insert(metadata::OUTPUT_TOKENS.into(), 30u64.into());
        meta.insert(metadata::COST.into(), 0.0042.into());
        let response = InvocationResponse::new(Map::new(), meta);

        let record = UsageRecord::from_invocation(&context, &response);
        assert_eq!(record.provider_id, "openai");
        assert_eq!(record.model_id, "gpt-4o-mini");
        assert_eq!(record.input_tokens, 120);
        assert_eq!(record.output_tokens, 30);
        assert_eq!(record.cost, 0.0042);
    }

    #[test]
    fn record_falls_back_to_metadata_on_cache_hit() {
        // Routing never ran, but the cached response remembers its origin.
        let context = InvocationContext::new(InvocationRequest::builder().build());
        let mut meta = Map::new();
        meta.insert(metadata::PROVIDER.into(), "gemini".into());
        meta.insert(metadata::MODEL.into(), "gemini-1.5-flash".into());
        let response = InvocationResponse::new(Map::new(), meta);

        let record = UsageRecord::from_invocation(&context, &response);
        assert_eq!(record.provider_id, "gemini");
        assert_eq!(record.model_id, "gemini-1.5-flash");
    }
}
