//! Core data model shared across the gateway.

pub mod descriptor;
pub mod invocation;

pub use descriptor::{ModelDescriptor, ProviderDescriptor};
pub use invocation::{InvocationContext, InvocationRequest, InvocationResponse, metadata};
