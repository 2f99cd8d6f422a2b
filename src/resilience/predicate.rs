//! Outcome predicates deciding whether an attempt is retried.

use std::fmt;
use std::sync::Arc;

use crate::request::HttpError;

type ErrorPredicate = Arc<dyn Fn(&HttpError) -> bool + Send + Sync>;
type ResultPredicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Decides whether the outcome of an attempt counts as a handled failure.
///
/// Error predicates and result predicates are evaluated independently;
/// the outcome is handled if any predicate of the matching kind returns
/// `true`. An empty predicate handles nothing.
///
/// # Example
///
/// ```
/// use resilient_request::request::{HttpError, HttpResponse};
/// use resilient_request::resilience::ShouldHandle;
///
/// let should_handle = ShouldHandle::<HttpResponse>::new()
///     .handle_error(|e| matches!(e, HttpError::Timeout))
///     .handle_result(|r| r.status.is_server_error());
///
/// let ok = HttpResponse::with_status(http::StatusCode::OK, "");
/// assert!(!should_handle.matches(Ok(&ok)));
/// assert!(should_handle.matches(Err(&HttpError::Timeout)));
/// ```
pub struct ShouldHandle<T> {
    errors: Vec<ErrorPredicate>,
    results: Vec<ResultPredicate<T>>,
}

impl<T> ShouldHandle<T> {
    /// Creates a predicate that handles nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Also handles errors for which `predicate` returns true.
    #[must_use]
    pub fn handle_error<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&HttpError) -> bool + Send + Sync + 'static,
    {
        self.errors.push(Arc::new(predicate));
        self
    }

    /// Also handles successful results for which `predicate` returns true.
    #[must_use]
    pub fn handle_result<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        self.results.push(Arc::new(predicate));
        self
    }

    /// Evaluates an outcome.
    #[must_use]
    pub fn matches(&self, outcome: Result<&T, &HttpError>) -> bool {
        match outcome {
            Ok(value) => self.results.iter().any(|p| p(value)),
            Err(error) => self.errors.iter().any(|p| p(error)),
        }
    }
}

impl<T> Default for ShouldHandle<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for ShouldHandle<T> {
    fn clone(&self) -> Self {
        Self {
            errors: self.errors.clone(),
            results: self.results.clone(),
        }
    }
}

impl<T> fmt::Debug for ShouldHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShouldHandle")
            .field("error_predicates", &self.errors.len())
            .field("result_predicates", &self.results.len())
            .finish()
    }
}
