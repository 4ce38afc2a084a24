//! Caching — serves repeat requests from the response cache.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use super::{CACHING_ORDER, Chain, InvocationFilter};
use crate::cache::CacheService;
use crate::fingerprint;
use crate::telemetry;
use crate::types::{InvocationContext, InvocationResponse};
use crate::Result;

/// Filter that short-circuits the chain on a fingerprint match and
/// populates the cache after a miss completes.
///
/// The fingerprint is computed from the original request, not the mutated
/// context: cache identity depends on hints and payload only, independent
/// of what routing later resolves. On a hit the continuation is never
/// invoked, so routing and the backend are skipped entirely.
///
/// Cache failures never fail the request. A broken `get` degrades to a
/// miss; a broken `put` is logged and the already-computed response is
/// returned anyway. Concurrent identical requests are not collapsed —
/// both proceed and both write the same key, which is harmless because
/// writes are idempotent.
pub struct CachingFilter {
    cache: Arc<dyn CacheService>,
}

impl CachingFilter {
    pub fn new(cache: Arc<dyn CacheService>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl InvocationFilter for CachingFilter {
    fn order(&self) -> i32 {
        CACHING_ORDER
    }

    async fn filter(
        &self,
        context: &mut InvocationContext,
        chain: Chain<'_>,
    ) -> Result<InvocationResponse> {
        let key = fingerprint::fingerprint(context.request());

        match self.cache.get(&key).await {
            Ok(Some(cached)) => {
                metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                return Ok(cached);
            }
            Ok(None) => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
            }
            Err(error) => {
                // Degrade to pass-through; the caller never sees cache errors.
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                warn!(%error, "cache read failed, continuing without cache");
            }
        }

        let response = chain.next(context).await?;
        if let Err(error) = self.cache.put(&key, &response).await {
            warn!(%error, "cache write failed, returning uncached response");
        }
        Ok(response)
    }
}
