//! Request wrapper that routes `send` through a resilience pipeline.
//!
//! [`PipelineRequest`] forwards every attribute of the wrapped request
//! unchanged and overrides only [`Request::send`]. How the pipeline's result
//! type relates to the caller's [`Response`] is selected by a shape tag:
//!
//! | Tag               | Pipeline bound                      | Conversion around each attempt          |
//! |-------------------|-------------------------------------|-----------------------------------------|
//! | [`HighLevel`]     | `ResiliencePipeline<Response>`      | none                                    |
//! | [`Raw`]           | `ResiliencePipeline<HttpResponse>`  | unwrap message, status error to message |
//! | [`Unconstrained`] | `UntypedPipeline`                   | none, pipeline only sees errors         |

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::request::{Completion, CookieJar, HttpError, HttpResponse, Request, Response, Settings};
use crate::resilience::{ResiliencePipeline, UntypedPipeline};

/// Pipeline over the high-level [`Response`].
#[derive(Debug, Clone, Copy, Default)]
pub struct HighLevel;

/// Pipeline over the transport [`HttpResponse`].
///
/// Status errors raised by the inner request are turned into values before
/// the pipeline sees them, so a result predicate can inspect rejected
/// responses. Errors without a response (connection failures, timeouts,
/// cancellation) reach the pipeline as errors.
#[derive(Debug, Clone, Copy, Default)]
pub struct Raw;

/// Pipeline that is generic over its result type.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconstrained;

/// Binds a pipeline type to the conversion applied around each attempt.
pub trait PipelineShape<P>: Send + Sync + 'static {
    /// Executes `inner.send(..)` under `pipeline` and returns the final response.
    ///
    /// # Errors
    ///
    /// Returns the final error the pipeline surfaced.
    fn send_through<R: Request>(
        pipeline: &P,
        inner: &R,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Response, HttpError>> + Send;
}

impl<P: ResiliencePipeline<Response>> PipelineShape<P> for HighLevel {
    async fn send_through<R: Request>(
        pipeline: &P,
        inner: &R,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> Result<Response, HttpError> {
        pipeline
            .execute(cancel, |cancel| {
                inner.send(verb.clone(), body.clone(), completion, cancel)
            })
            .await
    }
}

impl<P: ResiliencePipeline<HttpResponse>> PipelineShape<P> for Raw {
    async fn send_through<R: Request>(
        pipeline: &P,
        inner: &R,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> Result<Response, HttpError> {
        let message = pipeline
            .execute(cancel, |cancel| {
                let attempt = inner.send(verb.clone(), body.clone(), completion, cancel);
                async move {
                    attempt
                        .await
                        .map(Response::into_message)
                        .or_else(HttpError::into_response)
                }
            })
            .await?;

        Ok(Response::from(message))
    }
}

impl<P: UntypedPipeline> PipelineShape<P> for Unconstrained {
    async fn send_through<R: Request>(
        pipeline: &P,
        inner: &R,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> Result<Response, HttpError> {
        pipeline
            .execute(cancel, |cancel| {
                inner.send(verb.clone(), body.clone(), completion, cancel)
            })
            .await
    }
}

/// A request whose `send` runs through a resilience pipeline.
///
/// Reading or writing any attribute behaves exactly as on the wrapped
/// request. Only the number of underlying attempts differs.
///
/// # Example
///
/// ```no_run
/// use resilient_request::decorator::{PipelineRequest, Raw};
/// use resilient_request::request::{FluentRequest, Request};
/// use resilient_request::transient::default_retry_pipeline;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let request = FluentRequest::parse("https://api.example.com/items")?;
/// let resilient = PipelineRequest::<_, _, Raw>::new(request, default_retry_pipeline());
/// let response = resilient.get().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PipelineRequest<R, P, S = HighLevel> {
    inner: R,
    pipeline: P,
    shape: PhantomData<fn() -> S>,
}

impl<R, P, S> PipelineRequest<R, P, S> {
    /// Wraps `inner` so that every send runs through `pipeline`.
    #[must_use]
    pub const fn new(inner: R, pipeline: P) -> Self {
        Self {
            inner,
            pipeline,
            shape: PhantomData,
        }
    }

    /// Returns the wrapped request.
    #[must_use]
    pub const fn inner(&self) -> &R {
        &self.inner
    }

    /// Returns the pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &P {
        &self.pipeline
    }

    /// Removes the pipeline and returns the wrapped request.
    #[must_use]
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R, P, S> Request for PipelineRequest<R, P, S>
where
    R: Request,
    P: Send + Sync,
    S: PipelineShape<P>,
{
    type Client = R::Client;

    fn client(&self) -> &Arc<Self::Client> {
        self.inner.client()
    }

    fn set_client(&mut self, client: Arc<Self::Client>) {
        self.inner.set_client(client);
    }

    fn verb(&self) -> &http::Method {
        self.inner.verb()
    }

    fn set_verb(&mut self, verb: http::Method) {
        self.inner.set_verb(verb);
    }

    fn url(&self) -> &url::Url {
        self.inner.url()
    }

    fn set_url(&mut self, url: url::Url) {
        self.inner.set_url(url);
    }

    fn headers(&self) -> &http::HeaderMap {
        self.inner.headers()
    }

    fn headers_mut(&mut self) -> &mut http::HeaderMap {
        self.inner.headers_mut()
    }

    fn cookies(&self) -> &CookieJar {
        self.inner.cookies()
    }

    fn cookies_mut(&mut self) -> &mut CookieJar {
        self.inner.cookies_mut()
    }

    fn settings(&self) -> &Settings {
        self.inner.settings()
    }

    fn settings_mut(&mut self) -> &mut Settings {
        self.inner.settings_mut()
    }

    fn send(
        &self,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Response, HttpError>> + Send {
        tracing::trace!(%verb, url = %self.inner.url(), "Sending through pipeline");
        S::send_through(&self.pipeline, &self.inner, verb, body, completion, cancel)
    }
}
