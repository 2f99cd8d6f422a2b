//! Tests for transport messages, `Response`, and `HttpError`.

use super::*;

use std::error::Error as _;

fn test_url() -> url::Url {
    url::Url::parse("https://api.example.com/items").unwrap()
}

mod http_request {
    use super::*;

    #[test]
    fn new_starts_empty() {
        let req = HttpRequest::new(http::Method::PUT, test_url());

        assert_eq!(req.method, http::Method::PUT);
        assert_eq!(req.url, test_url());
        assert!(req.headers.is_empty());
        assert!(req.body.is_none());
        assert_eq!(req.completion, Completion::ContentRead);
    }

    #[test]
    fn with_header_appends() {
        let req = HttpRequest::get(test_url())
            .with_header(http::header::ACCEPT, http::HeaderValue::from_static("text/plain"))
            .with_header(
                http::header::ACCEPT,
                http::HeaderValue::from_static("application/json"),
            );

        let values: Vec<_> = req.headers.get_all(http::header::ACCEPT).iter().collect();
        assert_eq!(values, ["text/plain", "application/json"]);
    }

    #[test]
    fn builders_set_body_and_completion() {
        let req = HttpRequest::get(test_url())
            .with_body(b"data".to_vec())
            .with_completion(Completion::HeadersRead);

        assert_eq!(req.body.as_deref(), Some(&b"data"[..]));
        assert_eq!(req.completion, Completion::HeadersRead);
    }
}

mod http_response {
    use super::*;

    #[test]
    fn with_status_has_no_headers() {
        let res = HttpResponse::with_status(http::StatusCode::ACCEPTED, "queued");

        assert_eq!(res.status, http::StatusCode::ACCEPTED);
        assert!(res.headers.is_empty());
        assert_eq!(res.body_text(), Some("queued"));
        assert!(res.is_success());
    }

    #[test]
    fn body_text_rejects_invalid_utf8() {
        let res = HttpResponse::with_status(http::StatusCode::OK, vec![0xff, 0xfe]);

        assert_eq!(res.body_text(), None);
    }

    #[test]
    fn error_statuses_are_not_success() {
        assert!(!HttpResponse::with_status(http::StatusCode::NOT_FOUND, "").is_success());
        assert!(!HttpResponse::with_status(http::StatusCode::BAD_GATEWAY, "").is_success());
    }
}

mod response {
    use super::*;

    fn sample() -> HttpResponse {
        let mut headers = http::HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            http::HeaderValue::from_static("application/json"),
        );
        HttpResponse::new(http::StatusCode::OK, headers, br#"{"id":7}"#.to_vec())
    }

    #[test]
    fn accessors_read_the_message() {
        let response = Response::from(sample());

        assert_eq!(response.status(), http::StatusCode::OK);
        assert_eq!(response.status_code(), 200);
        assert!(response.is_success());
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
        assert_eq!(response.bytes(), br#"{"id":7}"#);
        assert_eq!(response.text(), r#"{"id":7}"#);
    }

    #[test]
    fn json_deserializes_body() {
        #[derive(serde::Deserialize)]
        struct Item {
            id: u32,
        }

        let item: Item = Response::from(sample()).json().unwrap();

        assert_eq!(item.id, 7);
    }

    #[test]
    fn json_reports_malformed_body() {
        let response = Response::from(HttpResponse::with_status(http::StatusCode::OK, "nope"));

        assert!(response.json::<serde_json::Value>().is_err());
    }

    #[test]
    fn text_is_lossy() {
        let response = Response::from(HttpResponse::with_status(http::StatusCode::OK, vec![b'a', 0xff]));

        assert_eq!(response.text(), "a\u{fffd}");
    }

    #[test]
    fn conversion_keeps_every_field() {
        let message = sample();
        let response = Response::from(message.clone());

        assert_eq!(response.message(), &message);
        assert_eq!(HttpResponse::from(response.clone()), message);
        assert_eq!(response.into_message(), message);
    }
}

mod http_error {
    use super::*;

    #[test]
    fn status_error_carries_response() {
        let rejected = HttpResponse::with_status(http::StatusCode::INTERNAL_SERVER_ERROR, "Bad Request");
        let err = HttpError::status(rejected.clone());

        assert!(matches!(
            err,
            HttpError::Status { status, .. } if status == http::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert_eq!(err.response(), Some(&rejected));
        assert_eq!(err.into_response().unwrap(), rejected);
    }

    #[test]
    fn errors_without_response_stay_errors() {
        assert!(HttpError::Timeout.response().is_none());
        assert!(matches!(
            HttpError::Cancelled.into_response(),
            Err(HttpError::Cancelled)
        ));
    }

    #[test]
    fn display_messages() {
        let status = HttpError::status(HttpResponse::with_status(http::StatusCode::SERVICE_UNAVAILABLE, ""));

        assert_eq!(status.to_string(), "Call failed with status 503 Service Unavailable");
        assert_eq!(HttpError::Timeout.to_string(), "Request timed out");
        assert_eq!(HttpError::Cancelled.to_string(), "Request cancelled");
        assert_eq!(
            HttpError::InvalidUrl("nope".to_string()).to_string(),
            "Invalid URL: nope"
        );
    }

    #[test]
    fn connection_error_exposes_source() {
        let err = HttpError::Connection(Box::new(std::io::Error::other("refused")));

        assert_eq!(err.source().unwrap().to_string(), "refused");
        assert_eq!(err.to_string(), "Connection error: refused");
    }

    #[test]
    fn is_cancelled_only_for_cancellation() {
        assert!(HttpError::Cancelled.is_cancelled());
        assert!(!HttpError::Timeout.is_cancelled());
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HttpError>();
    }
}
