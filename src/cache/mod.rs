//! Response caching for the invocation pipeline.
//!
//! [`CacheService`] is the contract the caching filter talks to; backing
//! stores (in-memory, redis, ...) implement it. Values are stored in their
//! JSON-serialized form so a cached response is portable across processes
//! and the storage format round-trips payload, metadata, and latency.
//!
//! The bundled [`MemoryCacheService`] uses moka's async LRU + TTL cache.
//! Eviction is the backing store's concern; the pipeline only relies on
//! get-before/put-after semantics.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;

use crate::Result;
use crate::types::InvocationResponse;

/// Abstraction over the cache backing store.
///
/// Implementations may fail; the caching filter swallows every error and
/// degrades to pass-through, so a broken cache slows the gateway down but
/// never breaks a request.
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieve a cached response if present.
    async fn get(&self, key: &str) -> Result<Option<InvocationResponse>>;

    /// Store a response under the supplied key.
    async fn put(&self, key: &str, response: &InvocationResponse) -> Result<()>;
}

/// Configuration for the in-memory response cache.
///
/// ```rust
/// # use heimdall::cache::CacheConfig;
/// # use std::time::Duration;
/// let config = CacheConfig::new()
///     .max_entries(10_000)
///     .ttl(Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of cached entries. Default: 10,000.
    pub max_entries: u64,
    /// Time-to-live for cached entries. Default: 1 hour.
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            ttl: Duration::from_secs(3600),
        }
    }
}

impl CacheConfig {
    /// Create a new config with sensible defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of cached entries.
    pub fn max_entries(mut self, n: u64) -> Self {
        self.max_entries = n;
        self
    }

    /// Set the time-to-live for cached entries.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// In-memory [`CacheService`] backed by moka.
///
/// Entries are stored as serialized JSON, the same form a shared backend
/// would hold, so swapping in a distributed store changes no semantics.
pub struct MemoryCacheService {
    entries: Cache<String, String>,
}

impl MemoryCacheService {
    /// Create a cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = Cache::builder()
            .max_capacity(config.max_entries)
            .time_to_live(config.ttl)
            .build();
        Self { entries }
    }
}

impl Default for MemoryCacheService {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[async_trait]
impl CacheService for MemoryCacheService {
    async fn get(&self, key: &str) -> Result<Option<InvocationResponse>> {
        match self.entries.get(key).await {
            Some(serialized) => Ok(Some(serde_json::from_str(&serialized)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, response: &InvocationResponse) -> Result<()> {
        let serialized = serde_json::to_string(response)?;
        self.entries.insert(key.to_string(), serialized).await;
        Ok(())
    }
}
