//! Scripted HTTP client shared by unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::request::{FluentRequest, HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::resilience::RetryPolicy;

/// Client that replays a fixed sequence of outcomes and records every request.
///
/// Once the script is exhausted every further call fails with a connection error.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    outcomes: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
    latency: Option<Duration>,
}

impl ScriptedClient {
    pub fn new(outcomes: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            ..Self::default()
        })
    }

    /// Responds with the given statuses and empty bodies.
    pub fn statuses(statuses: &[u16]) -> Arc<Self> {
        Self::responses(&statuses.iter().map(|&s| (s, "")).collect::<Vec<_>>())
    }

    /// Responds with the given `(status, body)` pairs.
    pub fn responses(responses: &[(u16, &str)]) -> Arc<Self> {
        Self::new(
            responses
                .iter()
                .map(|&(status, body)| Ok(response(status, body)))
                .collect(),
        )
    }

    /// Waits `latency` before answering each request.
    pub fn slow(latency: Duration, outcomes: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
        Arc::new(Self {
            outcomes: Mutex::new(outcomes.into()),
            latency: Some(latency),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.requests.lock().unwrap().push(req);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let next = self.outcomes.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(connection_error("script exhausted")))
    }
}

pub fn response(status: u16, body: &str) -> HttpResponse {
    HttpResponse::with_status(http::StatusCode::from_u16(status).unwrap(), body)
}

pub fn connection_error(message: &str) -> HttpError {
    HttpError::Connection(Box::new(std::io::Error::other(message.to_string())))
}

pub fn test_url() -> url::Url {
    url::Url::parse("https://example.com/api").unwrap()
}

pub fn request_for(client: &Arc<ScriptedClient>) -> FluentRequest<ScriptedClient> {
    FluentRequest::from_client(Arc::clone(client), test_url())
}

/// Policy without delays or jitter.
pub fn immediate_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new()
        .with_max_attempts(max_attempts)
        .with_initial_delay(Duration::ZERO)
        .with_jitter(0.0)
}
