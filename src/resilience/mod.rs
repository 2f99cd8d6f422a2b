//! Resilience layer: strategies that decide how often an operation runs.
//!
//! This module provides:
//! - Pipeline abstractions ([`ResiliencePipeline`], [`UntypedPipeline`])
//! - Retry strategies ([`RetryPipeline`], [`ErrorRetryPipeline`])
//! - Retry timing ([`RetryPolicy`]) and outcome predicates ([`ShouldHandle`])
//! - Translation of the deprecated [`Policy`] abstraction ([`from_policy`])

mod legacy;
mod pipeline;
mod policy;
mod predicate;


#[allow(deprecated)]
pub use legacy::{Policy, PolicyPipeline, from_policy};
pub use pipeline::{ErrorRetryPipeline, ResiliencePipeline, RetryPipeline, UntypedPipeline};
pub use policy::RetryPolicy;
pub use predicate::ShouldHandle;
