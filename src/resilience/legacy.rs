//! Adapter for the older policy abstraction.
//!
//! Policies predate pipelines: their operation takes no cancellation token.
//! Instead of a parallel family of request wrappers, a policy is translated
//! into a [`ResiliencePipeline`] once, at the boundary, and then attached
//! like any other pipeline.

#![allow(deprecated)]

use std::future::Future;

use tokio_util::sync::CancellationToken;

use super::ResiliencePipeline;
use crate::request::HttpError;

/// The older execution strategy, whose operation receives no token.
#[deprecated(note = "implement `ResiliencePipeline` instead; policies are kept for migration only")]
pub trait Policy<T: Send>: Send + Sync {
    /// Executes `op` under this policy.
    ///
    /// # Errors
    ///
    /// Returns the final error produced by `op`.
    fn execute<F, Fut>(&self, op: F) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        F: FnMut() -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send;
}

/// A [`Policy`] exposed as a [`ResiliencePipeline`].
///
/// The token given to `execute` is cloned into every attempt, so requests
/// stay cancellable even though the policy itself never sees the token.
#[derive(Debug, Clone)]
#[deprecated(note = "implement `ResiliencePipeline` instead; policies are kept for migration only")]
pub struct PolicyPipeline<P> {
    policy: P,
}

impl<P> PolicyPipeline<P> {
    /// Returns the wrapped policy.
    #[must_use]
    pub const fn policy(&self) -> &P {
        &self.policy
    }
}

/// Translates a legacy policy into a pipeline.
#[deprecated(note = "implement `ResiliencePipeline` instead; policies are kept for migration only")]
#[must_use]
pub const fn from_policy<P>(policy: P) -> PolicyPipeline<P> {
    PolicyPipeline { policy }
}

impl<T: Send, P: Policy<T>> ResiliencePipeline<T> for PolicyPipeline<P> {
    async fn execute<F, Fut>(&self, cancel: CancellationToken, mut op: F) -> Result<T, HttpError>
    where
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        if cancel.is_cancelled() {
            return Err(HttpError::Cancelled);
        }
        self.policy.execute(move || op(cancel.clone())).await
    }
}
