//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional; missing values fall back to the
/// [`RetryPolicy`](crate::resilience::RetryPolicy) defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Retry pipeline configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Retry pipeline configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts, including the first one
    pub max_attempts: Option<u32>,

    /// Initial retry delay in milliseconds
    pub initial_delay_ms: Option<u64>,

    /// Maximum retry delay in milliseconds
    pub max_delay_ms: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,

    /// Jitter fraction between 0 and 1
    pub jitter: Option<f64>,

    /// Status codes worth retrying
    pub statuses: Option<Vec<u16>>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r"# Resilient request configuration

[retry]
# Maximum number of attempts, including the first one (default: 4)
# max_attempts = 4

# Delay before the first retry in milliseconds (default: 500)
# initial_delay_ms = 500

# Maximum delay between retries in milliseconds (default: 10000)
# max_delay_ms = 10000

# Backoff multiplier (default: 2.0)
# multiplier = 2.0

# Fraction of each delay that is randomized, 0 to 1 (default: 0.25)
# jitter = 0.25

# Status codes worth retrying (default: 408, 500, 502, 503, 504)
# statuses = [408, 500, 502, 503, 504]
"
    .to_string()
}
