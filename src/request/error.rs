//! Error types for HTTP operations.

use thiserror::Error;

use super::HttpResponse;

/// Error type for HTTP operations.
///
/// Describes what went wrong without dictating recovery strategy.
/// Whether a variant is retried is decided by the pipeline's predicate,
/// see [`IsRetryable`](crate::transient::IsRetryable) for the transient default.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// and other network-level errors. No response was received.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Request timed out.
    ///
    /// The server did not respond within the configured timeout period.
    #[error("Request timed out")]
    Timeout,

    /// The provided URL is invalid.
    ///
    /// This typically indicates a configuration error rather than
    /// a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header (or cookie) could not be encoded.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The server answered with a status the request does not accept.
    ///
    /// Carries the full transport message so callers and pipeline
    /// predicates can inspect the body that caused the failure.
    #[error("Call failed with status {status}")]
    Status {
        /// Status code of the rejected response
        status: http::StatusCode,
        /// The rejected response
        response: Box<HttpResponse>,
    },

    /// The cancellation token fired before a final outcome was reached.
    #[error("Request cancelled")]
    Cancelled,
}

impl HttpError {
    /// Creates a `Status` error from a rejected response.
    #[must_use]
    pub fn status(response: HttpResponse) -> Self {
        Self::Status {
            status: response.status,
            response: Box::new(response),
        }
    }

    /// Returns the response embedded in this error, if any.
    #[must_use]
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            Self::Status { response, .. } => Some(response),
            _ => None,
        }
    }

    /// Takes the embedded response out of this error.
    ///
    /// # Errors
    ///
    /// Returns the error unchanged when it carries no response.
    pub fn into_response(self) -> Result<HttpResponse, Self> {
        match self {
            Self::Status { response, .. } => Ok(*response),
            other => Err(other),
        }
    }

    /// Returns true if this is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
