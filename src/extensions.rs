//! Attachment surface: turn any request, URL, or address into a resilient request.
//!
//! ```no_run
//! use resilient_request::prelude::*;
//!
//! # async fn example() -> Result<(), HttpError> {
//! let response = "https://api.example.com/items"
//!     .retry_transient_errors()?
//!     .get()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use crate::decorator::{HighLevel, PipelineRequest, Raw, Unconstrained};
use crate::request::{FluentRequest, HttpError, HttpResponse, Request, Response};
use crate::resilience::{ResiliencePipeline, RetryPipeline, UntypedPipeline};
use crate::transient::default_retry_pipeline;

/// A request wrapped with the default transient retry pipeline.
pub type TransientRetry<R> = PipelineRequest<R, &'static RetryPipeline<HttpResponse>, Raw>;

/// Attaches pipelines to an already constructed request.
pub trait PipelineExt: Request + Sized {
    /// Wraps the request with a pipeline over [`Response`].
    #[must_use]
    fn with_pipeline<P>(self, pipeline: P) -> PipelineRequest<Self, P, HighLevel>
    where
        P: ResiliencePipeline<Response>,
    {
        PipelineRequest::new(self, pipeline)
    }

    /// Wraps the request with a pipeline over [`HttpResponse`].
    #[must_use]
    fn with_message_pipeline<P>(self, pipeline: P) -> PipelineRequest<Self, P, Raw>
    where
        P: ResiliencePipeline<HttpResponse>,
    {
        PipelineRequest::new(self, pipeline)
    }

    /// Wraps the request with a pipeline that only reacts to errors.
    #[must_use]
    fn with_untyped_pipeline<P>(self, pipeline: P) -> PipelineRequest<Self, P, Unconstrained>
    where
        P: UntypedPipeline,
    {
        PipelineRequest::new(self, pipeline)
    }

    /// Wraps the request with the shared default retry pipeline.
    #[must_use]
    fn retry_transient_errors(self) -> TransientRetry<Self> {
        self.with_message_pipeline(default_retry_pipeline())
    }
}

impl<R: Request> PipelineExt for R {}

/// Targets that normalize into a [`FluentRequest`].
pub trait IntoRequest {
    /// Builds a GET request for this target.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the target is not a valid URL.
    fn into_request(self) -> Result<FluentRequest, HttpError>;
}

impl IntoRequest for &str {
    fn into_request(self) -> Result<FluentRequest, HttpError> {
        FluentRequest::parse(self)
    }
}

impl IntoRequest for String {
    fn into_request(self) -> Result<FluentRequest, HttpError> {
        FluentRequest::parse(&self)
    }
}

impl IntoRequest for url::Url {
    fn into_request(self) -> Result<FluentRequest, HttpError> {
        Ok(FluentRequest::new(self))
    }
}

/// Attaches pipelines to a URL or address.
///
/// Each method builds the request first and then behaves like its
/// [`PipelineExt`] counterpart.
pub trait UrlPipelineExt: IntoRequest + Sized {
    /// See [`PipelineExt::with_pipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the target is not a valid URL.
    fn with_pipeline<P>(self, pipeline: P) -> Result<PipelineRequest<FluentRequest, P>, HttpError>
    where
        P: ResiliencePipeline<Response>,
    {
        Ok(self.into_request()?.with_pipeline(pipeline))
    }

    /// See [`PipelineExt::with_message_pipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the target is not a valid URL.
    fn with_message_pipeline<P>(
        self,
        pipeline: P,
    ) -> Result<PipelineRequest<FluentRequest, P, Raw>, HttpError>
    where
        P: ResiliencePipeline<HttpResponse>,
    {
        Ok(self.into_request()?.with_message_pipeline(pipeline))
    }

    /// See [`PipelineExt::with_untyped_pipeline`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the target is not a valid URL.
    fn with_untyped_pipeline<P>(
        self,
        pipeline: P,
    ) -> Result<PipelineRequest<FluentRequest, P, Unconstrained>, HttpError>
    where
        P: UntypedPipeline,
    {
        Ok(self.into_request()?.with_untyped_pipeline(pipeline))
    }

    /// See [`PipelineExt::retry_transient_errors`].
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if the target is not a valid URL.
    fn retry_transient_errors(self) -> Result<TransientRetry<FluentRequest>, HttpError> {
        Ok(self.into_request()?.retry_transient_errors())
    }
}

impl<T: IntoRequest> UrlPipelineExt for T {}
