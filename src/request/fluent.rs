//! The request interface and its concrete fluent implementation.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use super::{Completion, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestClient, Response};

/// Per-request behavior settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Accept every status code instead of raising [`HttpError::Status`].
    pub allow_any_status: bool,
    /// Non-2xx statuses that are accepted anyway.
    pub allowed_statuses: Vec<http::StatusCode>,
    /// Upper bound for a single send, if any.
    pub timeout: Option<Duration>,
}

impl Settings {
    /// Returns true if a response with `status` is returned rather than raised.
    #[must_use]
    pub fn accepts(&self, status: http::StatusCode) -> bool {
        self.allow_any_status || status.is_success() || self.allowed_statuses.contains(&status)
    }
}

/// Cookies attached to a request, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<(String, String)>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            cookies: Vec::new(),
        }
    }

    /// Sets a cookie, replacing any existing value with the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.cookies.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.cookies.push((name, value)),
        }
    }

    /// Returns the value of the named cookie.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Returns the number of cookies.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar holds no cookies.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    fn header_value(&self) -> Result<Option<http::HeaderValue>, HttpError> {
        if self.cookies.is_empty() {
            return Ok(None);
        }
        let joined = self
            .cookies
            .iter()
            .map(|(n, v)| format!("{n}={v}"))
            .collect::<Vec<_>>()
            .join("; ");
        http::HeaderValue::from_str(&joined)
            .map(Some)
            .map_err(|e| HttpError::InvalidHeader(format!("cookie: {e}")))
    }
}

/// A not-yet-issued HTTP call.
///
/// Every attribute is plain state with a getter and a setter. The only
/// operation with behavior is [`send`](Request::send); the verb helpers and
/// fluent builders are provided on top of it, so wrapping a request only
/// requires overriding `send` and forwarding the accessors.
///
/// The verb helpers (`get`, `head`, `delete`, `post`, `put`, `patch`) pass a
/// fresh token and cannot be cancelled. Cancellable calls go through `send`
/// or [`send_current`](Request::send_current).
pub trait Request: Send + Sync {
    /// The client that performs the transport exchange.
    type Client: HttpClient;

    /// Returns the client.
    fn client(&self) -> &Arc<Self::Client>;
    /// Replaces the client.
    fn set_client(&mut self, client: Arc<Self::Client>);

    /// Returns the verb used by [`send_current`](Request::send_current).
    fn verb(&self) -> &http::Method;
    /// Replaces the verb.
    fn set_verb(&mut self, verb: http::Method);

    /// Returns the target URL.
    fn url(&self) -> &url::Url;
    /// Replaces the target URL.
    fn set_url(&mut self, url: url::Url);

    /// Returns the request headers.
    fn headers(&self) -> &http::HeaderMap;
    /// Returns the request headers for modification.
    fn headers_mut(&mut self) -> &mut http::HeaderMap;

    /// Returns the cookies sent with the request.
    fn cookies(&self) -> &CookieJar;
    /// Returns the cookies for modification.
    fn cookies_mut(&mut self) -> &mut CookieJar;

    /// Returns the request settings.
    fn settings(&self) -> &Settings;
    /// Returns the request settings for modification.
    fn settings_mut(&mut self) -> &mut Settings;

    /// Issues the request.
    ///
    /// `cancel` must be honored for the whole call; implementations that
    /// make several attempts pass clones of the same token to each one.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::Status`] when the response status is not accepted
    /// by [`Settings`], or the transport error that prevented a response.
    fn send(
        &self,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Response, HttpError>> + Send;

    /// Issues the request with the configured verb and no body.
    ///
    /// Use this (or [`send`](Request::send)) when the call must be cancellable.
    fn send_current(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(self.verb().clone(), None, Completion::default(), cancel)
    }

    /// Sends a GET request.
    fn get(&self) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::GET,
            None,
            Completion::default(),
            CancellationToken::new(),
        )
    }

    /// Sends a HEAD request; only status and headers are read.
    fn head(&self) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::HEAD,
            None,
            Completion::HeadersRead,
            CancellationToken::new(),
        )
    }

    /// Sends a DELETE request.
    fn delete(&self) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::DELETE,
            None,
            Completion::default(),
            CancellationToken::new(),
        )
    }

    /// Sends a POST request with `body`.
    fn post(&self, body: Vec<u8>) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::POST,
            Some(body),
            Completion::default(),
            CancellationToken::new(),
        )
    }

    /// Sends a PUT request with `body`.
    fn put(&self, body: Vec<u8>) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::PUT,
            Some(body),
            Completion::default(),
            CancellationToken::new(),
        )
    }

    /// Sends a PATCH request with `body`.
    fn patch(&self, body: Vec<u8>) -> impl Future<Output = Result<Response, HttpError>> + Send {
        self.send(
            http::Method::PATCH,
            Some(body),
            Completion::default(),
            CancellationToken::new(),
        )
    }

    /// Sets a header, replacing existing values with the same name.
    #[must_use]
    fn with_header(mut self, name: http::HeaderName, value: http::HeaderValue) -> Self
    where
        Self: Sized,
    {
        self.headers_mut().insert(name, value);
        self
    }

    /// Sets a cookie.
    #[must_use]
    fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self
    where
        Self: Sized,
    {
        self.cookies_mut().set(name, value);
        self
    }

    /// Bounds every send by `timeout`.
    #[must_use]
    fn with_timeout(mut self, timeout: Duration) -> Self
    where
        Self: Sized,
    {
        self.settings_mut().timeout = Some(timeout);
        self
    }

    /// Returns every response instead of raising on non-2xx statuses.
    #[must_use]
    fn allow_any_status(mut self) -> Self
    where
        Self: Sized,
    {
        self.settings_mut().allow_any_status = true;
        self
    }

    /// Accepts `status` in addition to 2xx.
    #[must_use]
    fn allow_status(mut self, status: http::StatusCode) -> Self
    where
        Self: Sized,
    {
        self.settings_mut().allowed_statuses.push(status);
        self
    }
}

/// The concrete request issued through an [`HttpClient`].
///
/// # Example
///
/// ```no_run
/// use resilient_request::request::{FluentRequest, Request};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let response = FluentRequest::parse("https://api.example.com/items")?
///     .allow_any_status()
///     .get()
///     .await?;
/// println!("{}", response.status_code());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FluentRequest<C = ReqwestClient> {
    client: Arc<C>,
    verb: http::Method,
    url: url::Url,
    headers: http::HeaderMap,
    cookies: CookieJar,
    settings: Settings,
}

impl FluentRequest<ReqwestClient> {
    /// Creates a GET request to `url` issued through the process-wide [`ReqwestClient`].
    ///
    /// Every request created this way shares one connection pool.
    #[must_use]
    pub fn new(url: url::Url) -> Self {
        Self::from_client(super::client::shared_client(), url)
    }

    /// Parses `url` and creates a request for it.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` cannot be parsed.
    pub fn parse(url: &str) -> Result<Self, HttpError> {
        url::Url::parse(url)
            .map(Self::new)
            .map_err(|e| HttpError::InvalidUrl(format!("{url}: {e}")))
    }
}

impl<C> FluentRequest<C> {
    /// Creates a GET request to `url` issued through `client`.
    #[must_use]
    pub fn from_client(client: Arc<C>, url: url::Url) -> Self {
        Self {
            client,
            verb: http::Method::GET,
            url,
            headers: http::HeaderMap::new(),
            cookies: CookieJar::new(),
            settings: Settings::default(),
        }
    }

    fn build_request(
        &self,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
    ) -> Result<HttpRequest, HttpError> {
        let mut request = HttpRequest::new(verb, self.url.clone()).with_completion(completion);
        request.headers.clone_from(&self.headers);
        if let Some(cookie) = self.cookies.header_value()? {
            request.headers.insert(http::header::COOKIE, cookie);
        }
        request.body = body;
        Ok(request)
    }
}

async fn bounded<F>(timeout: Option<Duration>, call: F) -> Result<HttpResponse, HttpError>
where
    F: Future<Output = Result<HttpResponse, HttpError>>,
{
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .map_err(|_| HttpError::Timeout)?,
        None => call.await,
    }
}

impl<C: HttpClient> Request for FluentRequest<C> {
    type Client = C;

    fn client(&self) -> &Arc<C> {
        &self.client
    }

    fn set_client(&mut self, client: Arc<C>) {
        self.client = client;
    }

    fn verb(&self) -> &http::Method {
        &self.verb
    }

    fn set_verb(&mut self, verb: http::Method) {
        self.verb = verb;
    }

    fn url(&self) -> &url::Url {
        &self.url
    }

    fn set_url(&mut self, url: url::Url) {
        self.url = url;
    }

    fn headers(&self) -> &http::HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut http::HeaderMap {
        &mut self.headers
    }

    fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    fn settings(&self) -> &Settings {
        &self.settings
    }

    fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    async fn send(
        &self,
        verb: http::Method,
        body: Option<Vec<u8>>,
        completion: Completion,
        cancel: CancellationToken,
    ) -> Result<Response, HttpError> {
        if cancel.is_cancelled() {
            return Err(HttpError::Cancelled);
        }

        let request = self.build_request(verb, body, completion)?;
        tracing::trace!(method = %request.method, url = %request.url, "Sending request");

        let call = bounded(self.settings.timeout, self.client.request(request));
        let message = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(HttpError::Cancelled),
            result = call => result?,
        };

        if self.settings.accepts(message.status) {
            Ok(Response::from(message))
        } else {
            Err(HttpError::status(message))
        }
    }
}
