//! Validated pipeline configuration.
//!
//! All validation is performed during construction; a [`ResilienceConfig`]
//! always describes a pipeline that can be built.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use http::StatusCode;

use crate::request::HttpResponse;
use crate::resilience::{RetryPipeline, RetryPolicy};
use crate::transient::{TRANSIENT_STATUS_CODES, transient_retry_pipeline};

use super::error::ConfigError;
use super::toml::{RetrySection, TomlConfig};

/// Fully validated retry configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ResilienceConfig {
    /// Retry timing
    pub retry_policy: RetryPolicy,

    /// Statuses retried in addition to transport failures
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            retry_policy: RetryPolicy::default(),
            retry_statuses: TRANSIENT_STATUS_CODES.to_vec(),
        }
    }
}

impl fmt::Display for ResilienceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let statuses = self
            .retry_statuses
            .iter()
            .map(|s| s.as_u16().to_string())
            .collect::<Vec<_>>()
            .join(",");
        write!(
            f,
            "ResilienceConfig {{ attempts: {}, delay: {}ms..{}ms x{}, jitter: {}, statuses: [{}] }}",
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_millis(),
            self.retry_policy.max_delay.as_millis(),
            self.retry_policy.multiplier,
            self.retry_policy.jitter,
            statuses,
        )
    }
}

impl ResilienceConfig {
    /// Loads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&TomlConfig::load(path)?)
    }

    /// Parses and validates configuration text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text cannot be parsed or validated.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Self::from_toml(&TomlConfig::parse(content)?)
    }

    /// Validates a parsed configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRetry`] or [`ConfigError::InvalidStatus`]
    /// for values a pipeline cannot use.
    pub fn from_toml(toml: &TomlConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            retry_policy: Self::build_retry_policy(&toml.retry)?,
            retry_statuses: Self::build_statuses(&toml.retry)?,
        })
    }

    /// Builds the retry pipeline this configuration describes.
    #[must_use]
    pub fn pipeline(&self) -> RetryPipeline<HttpResponse> {
        transient_retry_pipeline(self.retry_policy.clone(), self.retry_statuses.clone())
    }

    fn build_retry_policy(retry: &RetrySection) -> Result<RetryPolicy, ConfigError> {
        let max_attempts = retry
            .max_attempts
            .unwrap_or(RetryPolicy::DEFAULT_MAX_ATTEMPTS);

        let initial_delay = retry
            .initial_delay_ms
            .map_or(RetryPolicy::DEFAULT_INITIAL_DELAY, Duration::from_millis);

        let max_delay = retry
            .max_delay_ms
            .map_or(RetryPolicy::DEFAULT_MAX_DELAY, Duration::from_millis);

        let multiplier = retry.multiplier.unwrap_or(RetryPolicy::DEFAULT_MULTIPLIER);
        let jitter = retry.jitter.unwrap_or(RetryPolicy::DEFAULT_JITTER);

        if max_attempts < RetryPolicy::MIN_MAX_ATTEMPTS {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&jitter) {
            return Err(ConfigError::InvalidRetry(
                "jitter must be between 0 and 1".to_string(),
            ));
        }

        if max_delay < initial_delay {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({}ms) must be >= initial_delay ({}ms)",
                max_delay.as_millis(),
                initial_delay.as_millis()
            )));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(initial_delay)
            .with_max_delay(max_delay)
            .with_multiplier(multiplier)
            .with_jitter(jitter))
    }

    fn build_statuses(retry: &RetrySection) -> Result<Vec<StatusCode>, ConfigError> {
        let Some(codes) = &retry.statuses else {
            return Ok(TRANSIENT_STATUS_CODES.to_vec());
        };

        codes
            .iter()
            .map(|&code| StatusCode::from_u16(code).map_err(|_| ConfigError::InvalidStatus(code)))
            .collect()
    }
}
