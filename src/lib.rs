//! Heimdall - Provider-agnostic model invocation gateway
//!
//! This crate routes a single `invoke a model` operation through an ordered
//! filter pipeline (telemetry, spend tracking, response caching, routing)
//! to the backend client for whichever provider hosts the resolved model.
//! Providers and their models are declarative configuration; callers only
//! name the model they want.
//!
//! # Example
//!
//! ```rust,no_run
//! use heimdall::{CacheConfig, GatewayConfig, Heimdall, InvocationRequest};
//!
//! #[tokio::main]
//! async fn main() -> heimdall::Result<()> {
//!     let gateway = Heimdall::builder()
//!         .config(GatewayConfig::load(None)?)
//!         .openai("sk-your-key")
//!         .cache(CacheConfig::new())
//!         .build()?;
//!
//!     let response = gateway
//!         .invoke(
//!             InvocationRequest::builder()
//!                 .model_hint("gpt-4o-mini")
//!                 .payload_entry("prompt", "What is the capital of France?")
//!                 .build(),
//!         )
//!         .await?;
//!
//!     println!("{}", response.payload["content"]);
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod gateway;
pub mod pipeline;
pub mod registry;
pub mod telemetry;
pub mod types;
pub mod usage;

// Re-export main types at crate root
pub use cache::{CacheConfig, CacheService, MemoryCacheService};
pub use client::{ModelClient, ModelClientRegistry};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayBuilder, Heimdall};
pub use pipeline::{InvocationFilter, InvocationHandler, InvocationPipeline};
pub use registry::ProviderRegistry;
pub use usage::{LoggingUsageRecorder, UsageRecord, UsageRecorder};

// Re-export the invocation types
pub use types::{
    InvocationContext, InvocationRequest, InvocationResponse, ModelDescriptor, ProviderDescriptor,
};
