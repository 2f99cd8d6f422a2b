//! Resilient requests: attach retry pipelines to fluent HTTP requests.
//!
//! A [`PipelineRequest`](decorator::PipelineRequest) implements the same
//! [`Request`](request::Request) interface as the request it wraps. Reading and
//! writing attributes is unchanged; only `send` runs through a
//! [`ResiliencePipeline`](resilience::ResiliencePipeline), which re-issues
//! the inner request until its strategy settles on a final outcome.
//!
//! ```no_run
//! use resilient_request::prelude::*;
//!
//! # async fn example() -> Result<(), HttpError> {
//! // Retry connection failures and 408/500/502/503/504 with the shared default pipeline.
//! let response = "https://api.example.com/items"
//!     .retry_transient_errors()?
//!     .get()
//!     .await?;
//! println!("{}", response.status_code());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod decorator;
pub mod extensions;
pub mod request;
pub mod resilience;
pub mod time;
pub mod transient;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod transient_tests;

/// Commonly used traits and types.
pub mod prelude {
    pub use crate::decorator::{HighLevel, PipelineRequest, Raw, Unconstrained};
    pub use crate::extensions::{IntoRequest, PipelineExt, UrlPipelineExt};
    pub use crate::request::{FluentRequest, HttpError, HttpResponse, Request, Response};
    pub use crate::resilience::{
        ErrorRetryPipeline, ResiliencePipeline, RetryPipeline, RetryPolicy, ShouldHandle,
        UntypedPipeline,
    };
    pub use crate::transient::{IsRetryable, default_retry_pipeline};
}
