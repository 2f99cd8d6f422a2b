//! Request layer: the request interface and the values it produces.
//!
//! This module provides types and traits for:
//! - Transport messages ([`HttpRequest`], [`HttpResponse`])
//! - The high-level response abstraction ([`Response`])
//! - Abstracting HTTP clients ([`HttpClient`])
//! - Production HTTP client implementation ([`ReqwestClient`])
//! - The request interface ([`Request`]) and its concrete form ([`FluentRequest`])

mod client;
mod error;
mod fluent;
mod message;
mod response;

#[cfg(test)]
mod message_tests;

pub use client::{HttpClient, ReqwestClient};
pub use error::HttpError;
pub use fluent::{CookieJar, FluentRequest, Request, Settings};
pub use message::{Completion, HttpRequest, HttpResponse};
pub use response::Response;
