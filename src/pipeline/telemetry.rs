//! Telemetry — times every invocation and counts outcomes.

use std::time::Instant;

use async_trait::async_trait;

use super::{Chain, InvocationFilter, TELEMETRY_ORDER};
use crate::telemetry;
use crate::types::{InvocationContext, InvocationResponse};
use crate::Result;

/// Outermost filter: measures wall-clock latency across the entire
/// remaining chain and records exactly one outcome per request, whether
/// the response came from cache or a live call and whether it succeeded
/// or failed. Failures are re-raised unchanged after recording.
///
/// Successful responses are re-stamped with the measured latency, so a
/// cached response reports the latency of the invocation that served it
/// rather than the one that produced it.
#[derive(Debug, Default)]
pub struct TelemetryFilter;

#[async_trait]
impl InvocationFilter for TelemetryFilter {
    fn order(&self) -> i32 {
        TELEMETRY_ORDER
    }

    async fn filter(
        &self,
        context: &mut InvocationContext,
        chain: Chain<'_>,
    ) -> Result<InvocationResponse> {
        let provider = context
            .request()
            .provider_hint()
            .unwrap_or("auto")
            .to_owned();
        let model = context
            .request()
            .model_hint()
            .unwrap_or("unknown")
            .to_owned();
        let start = Instant::now();

        let result = chain.next(context).await;

        let elapsed = start.elapsed();
        let outcome = if result.is_ok() { "success" } else { "error" };
        metrics::counter!(telemetry::INVOCATIONS_TOTAL,
            "provider" => provider.clone(),
            "model" => model.clone(),
            "outcome" => outcome,
        )
        .increment(1);
        metrics::histogram!(telemetry::INVOCATION_DURATION_SECONDS,
            "provider" => provider,
            "model" => model,
            "outcome" => outcome,
        )
        .record(elapsed.as_secs_f64());

        result.map(|response| response.with_latency(elapsed))
    }
}
