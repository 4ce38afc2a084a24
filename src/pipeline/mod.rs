//! The invocation pipeline — an ordered filter chain around a terminal handler.
//!
//! Each [`InvocationFilter`] receives the shared [`InvocationContext`] and a
//! [`Chain`] continuation. A filter may delegate and return the result
//! unchanged, post-process the result, short-circuit with its own response,
//! or fail. Failures propagate outward through every filter that already
//! called its continuation, so an outer filter always observes exactly one
//! terminal outcome per request.
//!
//! Filter order is fixed at construction by [`InvocationFilter::order`]
//! (lower runs earlier, i.e. closer to the pipeline entry); it is not
//! re-evaluated per request. The gateway's stock chain nests, outermost
//! first: telemetry → usage tracking → caching → routing → terminal
//! handler. Telemetry therefore times every request including cache hits,
//! and a cache hit returns before routing or the backend ever run.

pub mod caching;
pub mod routing;
pub mod telemetry;
pub mod usage;

pub use caching::CachingFilter;
pub use routing::RoutingFilter;
pub use telemetry::TelemetryFilter;
pub use usage::UsageTrackingFilter;

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::BoxFuture;
use tracing::instrument;

use crate::Result;
use crate::types::{InvocationContext, InvocationRequest, InvocationResponse};

/// Order of the telemetry filter: outermost, wraps everything.
pub const TELEMETRY_ORDER: i32 = 0;
/// Order of the usage-tracking filter: observes the final response
/// whether it came from cache or a live call.
pub const USAGE_TRACKING_ORDER: i32 = 100;
/// Order of the caching filter: a hit short-circuits routing and dispatch.
pub const CACHING_ORDER: i32 = 200;
/// Order of the routing filter: innermost, runs right before dispatch so
/// the terminal handler always sees a resolved model.
pub const ROUTING_ORDER: i32 = 300;

/// A composable pipeline stage.
#[async_trait]
pub trait InvocationFilter: Send + Sync {
    /// Numeric priority; lower runs earlier (closer to the pipeline entry).
    /// Ties keep registration order.
    fn order(&self) -> i32;

    /// Apply the filter logic. Call `chain.next(context)` to delegate to
    /// the remaining filters and the terminal handler, or return without
    /// calling it to short-circuit.
    async fn filter(
        &self,
        context: &mut InvocationContext,
        chain: Chain<'_>,
    ) -> Result<InvocationResponse>;
}

/// Terminal component of the pipeline. Implementations execute the
/// backend-specific dispatch once all filters have delegated.
#[async_trait]
pub trait InvocationHandler: Send + Sync {
    /// Execute the backend call using the fully prepared context.
    async fn invoke(&self, context: &mut InvocationContext) -> Result<InvocationResponse>;
}

/// Continuation that advances the filter chain.
///
/// Cheap to copy; holds the remaining filter slice and the terminal handler.
#[derive(Clone, Copy)]
pub struct Chain<'a> {
    filters: &'a [Arc<dyn InvocationFilter>],
    handler: &'a dyn InvocationHandler,
}

impl<'a> Chain<'a> {
    /// Proceed to the next filter, or to the terminal handler when no
    /// filters remain.
    pub fn next<'c>(self, context: &'c mut InvocationContext) -> BoxFuture<'c, Result<InvocationResponse>>
    where
        'a: 'c,
    {
        Box::pin(async move {
            match self.filters.split_first() {
                Some((filter, rest)) => {
                    let chain = Chain {
                        filters: rest,
                        handler: self.handler,
                    };
                    filter.filter(context, chain).await
                }
                None => self.handler.invoke(context).await,
            }
        })
    }
}

/// Orchestrates invocation filters and the terminal handler.
pub struct InvocationPipeline {
    filters: Vec<Arc<dyn InvocationFilter>>,
    handler: Arc<dyn InvocationHandler>,
}

impl InvocationPipeline {
    /// Create a pipeline. Filters are sorted by [`InvocationFilter::order`]
    /// once, here; the sort is stable so equal orders keep their
    /// registration order.
    pub fn new(
        mut filters: Vec<Arc<dyn InvocationFilter>>,
        handler: Arc<dyn InvocationHandler>,
    ) -> Self {
        filters.sort_by_key(|filter| filter.order());
        Self { filters, handler }
    }

    /// Execute the pipeline for the supplied request.
    ///
    /// This is the single externally callable operation of the core: one
    /// context is created per request and threaded through the nested
    /// continuation chain.
    #[instrument(skip_all, fields(
        provider = request.provider_hint().unwrap_or("auto"),
        model = request.model_hint().unwrap_or("unknown"),
    ))]
    pub async fn invoke(&self, request: InvocationRequest) -> Result<InvocationResponse> {
        let mut context = InvocationContext::new(request);
        let chain = Chain {
            filters: &self.filters,
            handler: self.handler.as_ref(),
        };
        chain.next(&mut context).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GatewayError;
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct EchoHandler {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl InvocationHandler for EchoHandler {
        async fn invoke(&self, _context: &mut InvocationContext) -> Result<InvocationResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(InvocationResponse::new(Map::new(), Map::new()))
        }
    }

    /// Filter that records its order into the context attribute list.
    struct TracingProbe {
        order: i32,
    }

    #[async_trait]
    impl InvocationFilter for TracingProbe {
        fn order(&self) -> i32 {
            self.order
        }

        async fn filter(
            &self,
            context: &mut InvocationContext,
            chain: Chain<'_>,
        ) -> Result<InvocationResponse> {
            let seen = context
                .attributes()
                .get("seen")
                .and_then(|v| v.as_array().cloned())
                .unwrap_or_default();
            let mut seen = seen;
            seen.push(self.order.into());
            context.attributes_mut().insert("seen".into(), seen.into());
            chain.next(context).await
        }
    }

    struct ShortCircuit;

    #[async_trait]
    impl InvocationFilter for ShortCircuit {
        fn order(&self) -> i32 {
            0
        }

        async fn filter(
            &self,
            _context: &mut InvocationContext,
            _chain: Chain<'_>,
        ) -> Result<InvocationResponse> {
            let mut payload = Map::new();
            payload.insert("short_circuit".into(), true.into());
            Ok(InvocationResponse::new(payload, Map::new()))
        }
    }

    struct Failing;

    #[async_trait]
    impl InvocationFilter for Failing {
        fn order(&self) -> i32 {
            10
        }

        async fn filter(
            &self,
            _context: &mut InvocationContext,
            _chain: Chain<'_>,
        ) -> Result<InvocationResponse> {
            Err(GatewayError::InvalidRequest("boom".into()))
        }
    }

    /// Outer filter that counts terminal outcomes it observes.
    struct OutcomeCounter {
        outcomes: AtomicUsize,
    }

    #[async_trait]
    impl InvocationFilter for OutcomeCounter {
        fn order(&self) -> i32 {
            -100
        }

        async fn filter(
            &self,
            context: &mut InvocationContext,
            chain: Chain<'_>,
        ) -> Result<InvocationResponse> {
            let result = chain.next(context).await;
            self.outcomes.fetch_add(1, Ordering::SeqCst);
            result
        }
    }

    fn request() -> InvocationRequest {
        InvocationRequest::builder().model_hint("m").build()
    }

    #[tokio::test]
    async fn filters_run_in_priority_order_regardless_of_registration() {
        let handler = Arc::new(EchoHandler {
            calls: AtomicUsize::new(0),
        });
        // Registered out of order on purpose.
        let pipeline = InvocationPipeline::new(
            vec![
                Arc::new(TracingProbe { order: 30 }),
                Arc::new(TracingProbe { order: 10 }),
                Arc::new(TracingProbe { order: 20 }),
            ],
            handler.clone(),
        );

        // The innermost probe writes last, so the recorded sequence is the
        // execution order from the outside in.
        let mut context = InvocationContext::new(request());
        let chain = Chain {
            filters: &pipeline.filters,
            handler: pipeline.handler.as_ref(),
        };
        chain.next(&mut context).await.unwrap();
        let seen: Vec<i64> = context.attributes()["seen"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_i64().unwrap())
            .collect();
        assert_eq!(seen, vec![10, 20, 30]);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn short_circuit_skips_handler() {
        let handler = Arc::new(EchoHandler {
            calls: AtomicUsize::new(0),
        });
        let pipeline = InvocationPipeline::new(vec![Arc::new(ShortCircuit)], handler.clone());
        let response = pipeline.invoke(request()).await.unwrap();
        assert_eq!(response.payload["short_circuit"], true);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failure_propagates_through_outer_filters_once() {
        let counter = Arc::new(OutcomeCounter {
            outcomes: AtomicUsize::new(0),
        });
        let handler = Arc::new(EchoHandler {
            calls: AtomicUsize::new(0),
        });
        let pipeline =
            InvocationPipeline::new(vec![counter.clone(), Arc::new(Failing)], handler.clone());
        let result = pipeline.invoke(request()).await;
        assert!(matches!(result, Err(GatewayError::InvalidRequest(_))));
        assert_eq!(counter.outcomes.load(Ordering::SeqCst), 1);
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_pipeline_reaches_handler() {
        let handler = Arc::new(EchoHandler {
            calls: AtomicUsize::new(0),
        });
        let pipeline = InvocationPipeline::new(Vec::new(), handler.clone());
        pipeline.invoke(request()).await.unwrap();
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }
}
