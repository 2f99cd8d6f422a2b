//! Transient failure classification and the shared default retry pipeline.

use std::sync::{Arc, LazyLock};

use http::StatusCode;

use crate::request::{HttpError, HttpResponse, Response};
use crate::resilience::{RetryPipeline, RetryPolicy, ShouldHandle};

/// Status codes conventionally treated as temporary.
pub const TRANSIENT_STATUS_CODES: [StatusCode; 5] = [
    StatusCode::REQUEST_TIMEOUT,       // 408
    StatusCode::INTERNAL_SERVER_ERROR, // 500
    StatusCode::BAD_GATEWAY,           // 502
    StatusCode::SERVICE_UNAVAILABLE,   // 503
    StatusCode::GATEWAY_TIMEOUT,       // 504
];

/// Returns true if `status` is one of [`TRANSIENT_STATUS_CODES`].
#[must_use]
pub fn is_transient_status(status: StatusCode) -> bool {
    TRANSIENT_STATUS_CODES.contains(&status)
}

/// Extension trait for checking if an outcome is worth another attempt.
///
/// Determines whether an error or response represents a transient failure
/// under the default classification.
pub trait IsRetryable {
    /// Returns true if the outcome is potentially transient and should be retried.
    fn is_retryable(&self) -> bool;
}

/// Classifies `error` with `statuses` as the set of retryable status codes.
fn is_retryable_error(error: &HttpError, statuses: &[StatusCode]) -> bool {
    match error {
        // Network errors are typically transient
        HttpError::Connection(_) | HttpError::Timeout => true,
        HttpError::Status { status, .. } => statuses.contains(status),
        // Configuration issues and explicit cancellation are final
        HttpError::InvalidUrl(_) | HttpError::InvalidHeader(_) | HttpError::Cancelled => false,
    }
}

impl IsRetryable for HttpError {
    fn is_retryable(&self) -> bool {
        is_retryable_error(self, &TRANSIENT_STATUS_CODES)
    }
}

impl IsRetryable for HttpResponse {
    fn is_retryable(&self) -> bool {
        is_transient_status(self.status)
    }
}

impl IsRetryable for Response {
    fn is_retryable(&self) -> bool {
        is_transient_status(self.status())
    }
}

/// Builds a retry pipeline over transport messages.
///
/// Retries connection failures, timeouts, and any response (or status error)
/// whose status is listed in `statuses`.
#[must_use]
pub fn transient_retry_pipeline(
    policy: RetryPolicy,
    statuses: Vec<StatusCode>,
) -> RetryPipeline<HttpResponse> {
    let statuses: Arc<[StatusCode]> = statuses.into();
    let error_statuses = Arc::clone(&statuses);

    let should_handle = ShouldHandle::new()
        .handle_error(move |e| is_retryable_error(e, &error_statuses))
        .handle_result(move |r: &HttpResponse| statuses.contains(&r.status));

    RetryPipeline::new(policy, should_handle)
}

#[cfg(test)]
pub(crate) static DEFAULT_PIPELINE_BUILDS: std::sync::atomic::AtomicUsize =
    std::sync::atomic::AtomicUsize::new(0);

static DEFAULT_RETRY_PIPELINE: LazyLock<RetryPipeline<HttpResponse>> = LazyLock::new(|| {
    #[cfg(test)]
    DEFAULT_PIPELINE_BUILDS.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

    let policy = RetryPolicy::default();
    tracing::debug!(?policy, "Building default transient retry pipeline");
    transient_retry_pipeline(policy, TRANSIENT_STATUS_CODES.to_vec())
});

/// Returns the process-wide default retry pipeline.
///
/// Built on first access with [`RetryPolicy::default`] and
/// [`TRANSIENT_STATUS_CODES`]; every caller shares the same instance.
#[must_use]
pub fn default_retry_pipeline() -> &'static RetryPipeline<HttpResponse> {
    &DEFAULT_RETRY_PIPELINE
}
