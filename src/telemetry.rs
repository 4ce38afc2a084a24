//! Telemetry metric name constants.
//!
//! Centralised metric names for heimdall operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `heimdall_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `provider` — provider hint or resolved provider id ("auto" when absent)
//! - `model` — model hint ("unknown" when absent)
//! - `outcome` — "success" or "error"
//! - `direction` — token direction: "input" or "output"

/// Total invocations dispatched through the pipeline.
///
/// Labels: `provider`, `model`, `outcome` ("success" | "error").
pub const INVOCATIONS_TOTAL: &str = "heimdall_invocations_total";

/// End-to-end invocation duration in seconds, cache hits included.
///
/// Labels: `provider`, `model`, `outcome`.
pub const INVOCATION_DURATION_SECONDS: &str = "heimdall_invocation_duration_seconds";

/// Total response cache hits.
pub const CACHE_HITS_TOTAL: &str = "heimdall_cache_hits_total";

/// Total response cache misses.
pub const CACHE_MISSES_TOTAL: &str = "heimdall_cache_misses_total";

/// Total tokens consumed.
///
/// Labels: `provider`, `model`, `direction` ("input" | "output").
pub const TOKENS_TOTAL: &str = "heimdall_tokens_total";
