//! HTTP client trait and the production implementation using reqwest.

use std::sync::{Arc, LazyLock};

use super::{Completion, HttpError, HttpRequest, HttpResponse};

/// Trait for making HTTP requests.
///
/// # Design
///
/// This trait abstracts the HTTP client implementation, enabling:
/// - Dependency injection for testing with scripted clients
/// - Swapping HTTP libraries without changing calling code
///
/// Implementations return non-2xx responses as `Ok`; deciding whether a
/// status is acceptable is up to the [`Request`](super::Request) layer.
///
/// # Example
///
/// ```ignore
/// use resilient_request::request::{HttpClient, HttpRequest, HttpResponse, HttpError};
///
/// struct MockClient {
///     response: HttpResponse,
/// }
///
/// impl HttpClient for MockClient {
///     async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
///         Ok(self.response.clone())
///     }
/// }
/// ```
pub trait HttpClient: Send + Sync {
    /// Sends an HTTP request and returns the response.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] when:
    /// - Network connection fails ([`HttpError::Connection`])
    /// - Request times out ([`HttpError::Timeout`])
    /// - URL is invalid ([`HttpError::InvalidUrl`])
    fn request(
        &self,
        req: HttpRequest,
    ) -> impl std::future::Future<Output = Result<HttpResponse, HttpError>> + Send;
}

/// Production HTTP client using reqwest.
///
/// This is a thin wrapper around `reqwest::Client` that implements
/// the [`HttpClient`] trait. It inherits reqwest's default configuration
/// including connection pooling and redirect handling.
///
/// # Example
///
/// ```no_run
/// use resilient_request::request::{HttpClient, HttpRequest, ReqwestClient};
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ReqwestClient::new();
/// let url = Url::parse("https://api.example.com/health")?;
/// let response = client.request(HttpRequest::get(url)).await?;
/// println!("Status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    inner: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new HTTP client with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: reqwest::Client::new(),
        }
    }

    /// Creates an HTTP client from an existing reqwest client.
    ///
    /// Useful when you need custom configuration (proxies, TLS, etc.).
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { inner: client }
    }
}

impl Default for ReqwestClient {
    fn default() -> Self {
        Self::new()
    }
}

static DEFAULT_CLIENT: LazyLock<Arc<ReqwestClient>> = LazyLock::new(|| {
    tracing::debug!("Building shared HTTP client");
    Arc::new(ReqwestClient::new())
});

/// Returns the process-wide client used by requests built from a URL.
pub(crate) fn shared_client() -> Arc<ReqwestClient> {
    Arc::clone(&DEFAULT_CLIENT)
}

fn map_transport_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_builder() {
        HttpError::InvalidUrl(e.to_string())
    } else {
        HttpError::Connection(Box::new(e))
    }
}

impl HttpClient for ReqwestClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut builder = self.inner.request(req.method, req.url.as_str());

        for (name, value) in &req.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = req.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(map_transport_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = match req.completion {
            Completion::ContentRead => response
                .bytes()
                .await
                .map_err(map_transport_error)?
                .to_vec(),
            Completion::HeadersRead => Vec::new(),
        };

        Ok(HttpResponse::new(status, headers, body))
    }
}
