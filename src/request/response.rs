//! High-level response abstraction.

use std::borrow::Cow;

use serde::de::DeserializeOwned;

use super::HttpResponse;

/// A received response with convenience accessors.
///
/// Wraps exactly one [`HttpResponse`]. Converting in either direction
/// ([`Response::from`], [`Response::into_message`]) keeps every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    message: HttpResponse,
}

impl Response {
    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> http::StatusCode {
        self.message.status
    }

    /// Returns the status code as a number.
    #[must_use]
    pub fn status_code(&self) -> u16 {
        self.message.status.as_u16()
    }

    /// Returns true for 2xx responses.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.message.is_success()
    }

    /// Returns the response headers.
    #[must_use]
    pub const fn headers(&self) -> &http::HeaderMap {
        &self.message.headers
    }

    /// Returns the first value of `name` if it is present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.message.headers.get(name)?.to_str().ok()
    }

    /// Returns the raw body.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.message.body
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.message.body)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.message.body)
    }

    /// Returns the underlying transport message.
    #[must_use]
    pub const fn message(&self) -> &HttpResponse {
        &self.message
    }

    /// Unwraps the underlying transport message.
    #[must_use]
    pub fn into_message(self) -> HttpResponse {
        self.message
    }
}

impl From<HttpResponse> for Response {
    fn from(message: HttpResponse) -> Self {
        Self { message }
    }
}

impl From<Response> for HttpResponse {
    fn from(response: Response) -> Self {
        response.message
    }
}
