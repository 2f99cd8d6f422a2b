//! Configuration layer for retry pipelines.
//!
//! This module provides:
//! - TOML configuration file parsing ([`TomlConfig`])
//! - Validated configuration ([`ResilienceConfig`])
//! - A commented configuration template ([`default_config_template`])
//!
//! Every value is optional. Missing values fall back to the
//! [`RetryPolicy`](crate::resilience::RetryPolicy) defaults and the
//! [`TRANSIENT_STATUS_CODES`](crate::transient::TRANSIENT_STATUS_CODES).
//!
//! # Example
//!
//! ```
//! use resilient_request::config::ResilienceConfig;
//!
//! let config = ResilienceConfig::parse("[retry]\nmax_attempts = 2\nstatuses = [503]").unwrap();
//! let pipeline = config.pipeline();
//! assert_eq!(pipeline.policy().max_attempts, 2);
//! ```

mod error;
mod toml;
mod validated;


pub use error::ConfigError;
pub use toml::{RetrySection, TomlConfig, default_config_template};
pub use validated::ResilienceConfig;
