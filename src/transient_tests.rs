//! Tests for transient classification and the default pipeline.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Barrier};

use http::StatusCode;

use crate::request::{HttpError, HttpResponse, Response};
use crate::resilience::ResiliencePipeline;
use crate::test_support::{connection_error, immediate_policy, response};
use crate::time::InstantSleeper;
use crate::transient::{
    DEFAULT_PIPELINE_BUILDS, IsRetryable, TRANSIENT_STATUS_CODES, default_retry_pipeline,
    is_transient_status, transient_retry_pipeline,
};

mod classification {
    use super::*;

    #[test]
    fn transient_status_codes() {
        for code in [408, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(is_transient_status(status), "{code} should be transient");
        }
        assert_eq!(TRANSIENT_STATUS_CODES.len(), 5);
    }

    #[test]
    fn permanent_status_codes() {
        for code in [200, 201, 301, 400, 401, 403, 404, 429, 501, 505] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!is_transient_status(status), "{code} should not be transient");
        }
    }

    #[test]
    fn connection_and_timeout_are_retryable() {
        assert!(connection_error("refused").is_retryable());
        assert!(HttpError::Timeout.is_retryable());
    }

    #[test]
    fn status_error_follows_status() {
        assert!(HttpError::status(response(503, "")).is_retryable());
        assert!(!HttpError::status(response(404, "")).is_retryable());
    }

    #[test]
    fn configuration_errors_and_cancellation_are_final() {
        assert!(!HttpError::InvalidUrl("x".to_string()).is_retryable());
        assert!(!HttpError::InvalidHeader("x".to_string()).is_retryable());
        assert!(!HttpError::Cancelled.is_retryable());
    }

    #[test]
    fn responses_follow_status() {
        assert!(response(502, "").is_retryable());
        assert!(!response(200, "").is_retryable());
        assert!(Response::from(response(504, "")).is_retryable());
        assert!(!Response::from(response(400, "")).is_retryable());
    }
}

mod custom_status_list {
    use super::*;

    fn pipeline(statuses: &[u16]) -> crate::resilience::RetryPipeline<HttpResponse, InstantSleeper> {
        transient_retry_pipeline(
            immediate_policy(3),
            statuses
                .iter()
                .map(|&s| StatusCode::from_u16(s).unwrap())
                .collect(),
        )
        .with_sleeper(InstantSleeper)
    }

    #[test]
    fn listed_statuses_are_handled() {
        let pipeline = pipeline(&[429]);
        let handles = pipeline.should_handle();

        assert!(handles.matches(Ok(&response(429, ""))));
        assert!(!handles.matches(Ok(&response(503, ""))));
        assert!(handles.matches(Err(&HttpError::status(response(429, "")))));
        assert!(!handles.matches(Err(&HttpError::status(response(503, "")))));
    }

    #[test]
    fn transport_failures_are_always_handled() {
        let pipeline = pipeline(&[]);
        let handles = pipeline.should_handle();

        assert!(handles.matches(Err(&HttpError::Timeout)));
        assert!(handles.matches(Err(&connection_error("reset"))));
        assert!(!handles.matches(Err(&HttpError::Cancelled)));
    }

    #[tokio::test]
    async fn retries_listed_status_until_success() {
        let pipeline = pipeline(&[429]);
        let mut outcomes = vec![response(429, ""), response(200, "done")].into_iter();

        let result = pipeline
            .execute(tokio_util::sync::CancellationToken::new(), |_| {
                let next = outcomes.next();
                async move { next.ok_or(HttpError::Timeout) }
            })
            .await
            .unwrap();

        assert_eq!(result.body_text(), Some("done"));
    }
}

mod default_pipeline {
    use super::*;

    #[test]
    fn uses_default_policy_and_transient_statuses() {
        let pipeline = default_retry_pipeline();
        let handles = pipeline.should_handle();

        assert_eq!(pipeline.policy(), &crate::resilience::RetryPolicy::default());
        for status in TRANSIENT_STATUS_CODES {
            assert!(handles.matches(Ok(&HttpResponse::with_status(status, ""))));
        }
        assert!(!handles.matches(Ok(&response(404, ""))));
    }

    #[test]
    fn error_predicate_agrees_with_is_retryable() {
        let handles = default_retry_pipeline().should_handle();
        let errors = [
            connection_error("refused"),
            HttpError::Timeout,
            HttpError::InvalidUrl("x".to_string()),
            HttpError::InvalidHeader("x".to_string()),
            HttpError::Cancelled,
            HttpError::status(response(503, "")),
            HttpError::status(response(404, "")),
        ];

        for error in &errors {
            assert_eq!(handles.matches(Err(error)), error.is_retryable(), "{error}");
        }
    }

    #[test]
    fn concurrent_first_access_builds_once() {
        const THREADS: usize = 8;
        let barrier = Arc::new(Barrier::new(THREADS));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    barrier.wait();
                    std::ptr::from_ref(default_retry_pipeline()) as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        assert!(addresses.windows(2).all(|w| w[0] == w[1]));
        assert!(std::ptr::eq(
            default_retry_pipeline(),
            default_retry_pipeline()
        ));
        assert_eq!(DEFAULT_PIPELINE_BUILDS.load(Ordering::SeqCst), 1);
    }
}
