//! Pipeline abstractions and the retry strategies implementing them.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use super::{RetryPolicy, ShouldHandle};
use crate::request::HttpError;
use crate::time::{Sleeper, TokioSleeper};

/// A reusable execution strategy producing results of type `T`.
///
/// `execute` runs `op` one or more times until the strategy reaches a final
/// outcome, which is returned as is. The operation receives a clone of
/// `cancel` on every attempt. Implementations are immutable after
/// construction and may be shared across any number of concurrent calls.
pub trait ResiliencePipeline<T: Send>: Send + Sync {
    /// Executes `op` under this strategy.
    ///
    /// # Errors
    ///
    /// Returns the final error produced by `op`, or [`HttpError::Cancelled`]
    /// if `cancel` fires between attempts.
    fn execute<F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send;
}

/// A strategy whose result type is chosen per call.
///
/// Such a pipeline never looks at successful values; it can only react to
/// errors.
pub trait UntypedPipeline: Send + Sync {
    /// Executes `op` under this strategy.
    ///
    /// # Errors
    ///
    /// Returns the final error produced by `op`, or [`HttpError::Cancelled`]
    /// if `cancel` fires between attempts.
    fn execute<T, F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        T: Send,
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send;
}

impl<T: Send, P: ResiliencePipeline<T>> ResiliencePipeline<T> for &P {
    fn execute<F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        (**self).execute(cancel, op)
    }
}

impl<T: Send, P: ResiliencePipeline<T>> ResiliencePipeline<T> for Arc<P> {
    fn execute<F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        (**self).execute(cancel, op)
    }
}

impl<P: UntypedPipeline> UntypedPipeline for &P {
    fn execute<T, F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        T: Send,
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        (**self).execute(cancel, op)
    }
}

impl<P: UntypedPipeline> UntypedPipeline for Arc<P> {
    fn execute<T, F, Fut>(
        &self,
        cancel: CancellationToken,
        op: F,
    ) -> impl Future<Output = Result<T, HttpError>> + Send
    where
        T: Send,
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        (**self).execute(cancel, op)
    }
}

/// Runs `op` until `should_handle` rejects the outcome or attempts run out.
///
/// Attempts are strictly sequential. A `Cancelled` outcome is never retried.
async fn run_attempts<T, F, Fut, S, H>(
    policy: &RetryPolicy,
    sleeper: &S,
    cancel: CancellationToken,
    mut op: F,
    should_handle: H,
) -> Result<T, HttpError>
where
    F: FnMut(CancellationToken) -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
    S: Sleeper,
    H: Fn(Result<&T, &HttpError>) -> bool,
{
    let mut attempt = 1;
    loop {
        if cancel.is_cancelled() {
            return Err(HttpError::Cancelled);
        }

        tracing::trace!(attempt, "Executing attempt");
        let outcome = op(cancel.clone()).await;

        let cancelled = matches!(outcome, Err(HttpError::Cancelled));
        if cancelled || !should_handle(outcome.as_ref()) {
            return outcome;
        }
        if !policy.should_retry(attempt) {
            tracing::debug!(attempts = attempt, "Retry attempts exhausted");
            return outcome;
        }

        let delay = policy.jittered_delay_for_retry(attempt - 1);
        match &outcome {
            Ok(_) => tracing::debug!(attempt, ?delay, "Attempt returned a handled result, retrying"),
            Err(e) => tracing::debug!(attempt, ?delay, error = %e, "Attempt failed, retrying"),
        }

        tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HttpError::Cancelled),
            () = sleeper.sleep(delay) => {}
        }
        attempt += 1;
    }
}

/// Retry strategy whose predicate can inspect results of type `T`.
///
/// # Example
///
/// ```
/// use resilient_request::request::HttpResponse;
/// use resilient_request::resilience::{RetryPipeline, RetryPolicy, ShouldHandle};
///
/// let pipeline = RetryPipeline::new(
///     RetryPolicy::new().with_max_attempts(3),
///     ShouldHandle::<HttpResponse>::new().handle_result(|r| r.body_text() == Some("Bad Request")),
/// );
/// assert_eq!(pipeline.policy().max_attempts, 3);
/// ```
pub struct RetryPipeline<T, S = TokioSleeper> {
    policy: RetryPolicy,
    should_handle: ShouldHandle<T>,
    sleeper: S,
}

impl<T> RetryPipeline<T, TokioSleeper> {
    /// Creates a retry pipeline that waits with the Tokio timer.
    #[must_use]
    pub const fn new(policy: RetryPolicy, should_handle: ShouldHandle<T>) -> Self {
        Self {
            policy,
            should_handle,
            sleeper: TokioSleeper,
        }
    }
}

impl<T, S> RetryPipeline<T, S> {
    /// Sets a custom sleeper for retry delays.
    ///
    /// This is primarily useful for testing to avoid actual delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> RetryPipeline<T, S2> {
        RetryPipeline {
            policy: self.policy,
            should_handle: self.should_handle,
            sleeper,
        }
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Returns the outcome predicate.
    #[must_use]
    pub const fn should_handle(&self) -> &ShouldHandle<T> {
        &self.should_handle
    }
}

impl<T, S: fmt::Debug> fmt::Debug for RetryPipeline<T, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPipeline")
            .field("policy", &self.policy)
            .field("should_handle", &self.should_handle)
            .field("sleeper", &self.sleeper)
            .finish()
    }
}

impl<T: Send, S: Sleeper> ResiliencePipeline<T> for RetryPipeline<T, S> {
    async fn execute<F, Fut>(&self, cancel: CancellationToken, op: F) -> Result<T, HttpError>
    where
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        run_attempts(&self.policy, &self.sleeper, cancel, op, |outcome| {
            self.should_handle.matches(outcome)
        })
        .await
    }
}

/// Retry strategy that only reacts to errors.
///
/// Implements [`UntypedPipeline`], so one instance serves operations of any
/// result type.
///
/// # Example
///
/// ```
/// use resilient_request::request::HttpError;
/// use resilient_request::resilience::{ErrorRetryPipeline, RetryPolicy};
///
/// let pipeline = ErrorRetryPipeline::new(RetryPolicy::default(), |e| {
///     matches!(e, HttpError::Timeout | HttpError::Connection(_))
/// });
/// assert_eq!(pipeline.policy().max_attempts, RetryPolicy::DEFAULT_MAX_ATTEMPTS);
/// ```
pub struct ErrorRetryPipeline<S = TokioSleeper> {
    policy: RetryPolicy,
    should_handle: ShouldHandle<()>,
    sleeper: S,
}

impl ErrorRetryPipeline<TokioSleeper> {
    /// Creates a pipeline retrying errors for which `predicate` returns true.
    #[must_use]
    pub fn new<F>(policy: RetryPolicy, predicate: F) -> Self
    where
        F: Fn(&HttpError) -> bool + Send + Sync + 'static,
    {
        Self {
            policy,
            should_handle: ShouldHandle::new().handle_error(predicate),
            sleeper: TokioSleeper,
        }
    }
}

impl<S> ErrorRetryPipeline<S> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> ErrorRetryPipeline<S2> {
        ErrorRetryPipeline {
            policy: self.policy,
            should_handle: self.should_handle,
            sleeper,
        }
    }

    /// Returns the retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<S: fmt::Debug> fmt::Debug for ErrorRetryPipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRetryPipeline")
            .field("policy", &self.policy)
            .field("sleeper", &self.sleeper)
            .finish_non_exhaustive()
    }
}

impl<S: Sleeper> UntypedPipeline for ErrorRetryPipeline<S> {
    async fn execute<T, F, Fut>(&self, cancel: CancellationToken, op: F) -> Result<T, HttpError>
    where
        T: Send,
        F: FnMut(CancellationToken) -> Fut + Send,
        Fut: Future<Output = Result<T, HttpError>> + Send,
    {
        run_attempts(&self.policy, &self.sleeper, cancel, op, |outcome| {
            self.should_handle.matches(outcome.map(|_| &()))
        })
        .await
    }
}
