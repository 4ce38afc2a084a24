//! Spend tracking — records token usage and cost after each invocation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{Chain, InvocationFilter, USAGE_TRACKING_ORDER};
use crate::telemetry;
use crate::types::{InvocationContext, InvocationResponse};
use crate::usage::{UsageRecord, UsageRecorder};
use crate::Result;

/// Filter that derives a [`UsageRecord`] from the final response and hands
/// it to the configured [`UsageRecorder`].
///
/// Sits outside the caching filter, so it observes the response whether it
/// came from cache or from a live backend call. Recording is fire-and-forget
/// with respect to the response path: a recorder failure is logged, never
/// surfaced. Failures from inner filters pass through unchanged — nothing
/// is recorded for them since no tokens were consumed.
pub struct UsageTrackingFilter {
    recorder: Arc<dyn UsageRecorder>,
}

impl UsageTrackingFilter {
    pub fn new(recorder: Arc<dyn UsageRecorder>) -> Self {
        Self { recorder }
    }
}

#[async_trait]
impl InvocationFilter for UsageTrackingFilter {
    fn order(&self) -> i32 {
        USAGE_TRACKING_ORDER
    }

    async fn filter(
        &self,
        context: &mut InvocationContext,
        chain: Chain<'_>,
    ) -> Result<InvocationResponse> {
        let response = chain.next(context).await?;

        let record = UsageRecord::from_invocation(context, &response);
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "provider" => record.provider_id.clone(),
            "model" => record.model_id.clone(),
            "direction" => "input",
        )
        .increment(record.input_tokens);
        metrics::counter!(telemetry::TOKENS_TOTAL,
            "provider" => record.provider_id.clone(),
            "model" => record.model_id.clone(),
            "direction" => "output",
        )
        .increment(record.output_tokens);

        if let Err(error) = self.recorder.record(&record).await {
            warn!(%error, "usage recording failed");
        }
        Ok(response)
    }
}
