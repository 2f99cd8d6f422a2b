//! Retry timing configuration.

use std::time::Duration;

use rand::Rng;

/// Configuration for exponential backoff retry behavior.
///
/// Controls how many times an operation is attempted and how long to wait
/// between attempts. Uses exponential backoff with a configurable
/// multiplier, a maximum delay cap, and proportional random jitter.
///
/// # Defaults
///
/// - `max_attempts`: 4 (the initial attempt plus 3 retries)
/// - `initial_delay`: 500 milliseconds
/// - `max_delay`: 10 seconds
/// - `multiplier`: 2.0
/// - `jitter`: 0.25
///
/// # Example
///
/// ```
/// use resilient_request::resilience::RetryPolicy;
/// use std::time::Duration;
///
/// // Create with defaults
/// let policy = RetryPolicy::default();
///
/// // Or customize via builder
/// let custom = RetryPolicy::new()
///     .with_max_attempts(5)
///     .with_initial_delay(Duration::from_millis(100))
///     .with_max_delay(Duration::from_secs(2))
///     .with_multiplier(1.5)
///     .with_jitter(0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the initial attempt).
    ///
    /// A value of 1 means no retries; only the initial attempt is made.
    pub max_attempts: u32,

    /// Delay before the first retry.
    ///
    /// Subsequent delays are computed by multiplying by `multiplier`.
    pub initial_delay: Duration,

    /// Maximum delay between retries, before jitter.
    pub max_delay: Duration,

    /// Multiplier applied to the delay after each retry.
    pub multiplier: f64,

    /// Fraction of the computed delay that is randomized, in `[0, 1]`.
    ///
    /// A value of 0.25 spreads each delay uniformly over ±25 %.
    pub jitter: f64,
}

impl RetryPolicy {
    /// Default maximum attempts.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

    /// Default initial delay (500 milliseconds).
    pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(500);

    /// Default maximum delay (10 seconds).
    pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

    /// Default multiplier (2.0).
    pub const DEFAULT_MULTIPLIER: f64 = 2.0;

    /// Default jitter fraction (0.25).
    pub const DEFAULT_JITTER: f64 = 0.25;

    /// Minimum value for `max_attempts`.
    pub const MIN_MAX_ATTEMPTS: u32 = 1;

    /// Creates a new retry policy with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            initial_delay: Self::DEFAULT_INITIAL_DELAY,
            max_delay: Self::DEFAULT_MAX_DELAY,
            multiplier: Self::DEFAULT_MULTIPLIER,
            jitter: Self::DEFAULT_JITTER,
        }
    }

    /// Sets the maximum number of attempts.
    ///
    /// # Panics
    ///
    /// Panics if `max_attempts` is less than 1.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        assert!(
            max_attempts >= Self::MIN_MAX_ATTEMPTS,
            "max_attempts must be at least 1"
        );
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the initial delay between retries.
    ///
    /// Zero delay is supported (useful for testing) but creates a tight
    /// retry loop in production.
    #[must_use]
    pub const fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Sets the maximum delay between retries.
    #[must_use]
    pub const fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the delay multiplier.
    ///
    /// # Panics
    ///
    /// Panics if `multiplier` is not positive (must be > 0.0).
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        assert!(multiplier > 0.0, "multiplier must be positive");
        self.multiplier = multiplier;
        self
    }

    /// Sets the jitter fraction.
    ///
    /// # Panics
    ///
    /// Panics if `jitter` is outside `[0, 1]`.
    #[must_use]
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&jitter),
            "jitter must be between 0 and 1"
        );
        self.jitter = jitter;
        self
    }

    /// Computes the delay for a given retry number (0-indexed), without jitter.
    ///
    /// # Arguments
    ///
    /// * `retry` - The retry number (0 = delay before first retry, 1 = delay before second retry, etc.)
    ///
    /// # Returns
    ///
    /// The delay to wait before this retry, capped at `max_delay`.
    #[must_use]
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if self.initial_delay.is_zero() {
            return Duration::ZERO;
        }
        // Safe cast: retry values are small (typically < 20) and i32::MAX is ~2 billion
        #[allow(clippy::cast_possible_wrap)]
        let multiplier = self.multiplier.powi(retry as i32);
        let delay_secs = self.initial_delay.as_secs_f64() * multiplier;
        let capped = delay_secs.min(self.max_delay.as_secs_f64());
        // Float seconds near the top of the Duration range do not round-trip.
        Duration::try_from_secs_f64(capped).map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Computes the delay for a given retry number with jitter applied.
    ///
    /// The result lies in `delay * (1 - jitter) ..= delay * (1 + jitter)`.
    #[must_use]
    pub fn jittered_delay_for_retry(&self, retry: u32) -> Duration {
        let delay = self.delay_for_retry(retry);
        let base = delay.as_secs_f64();
        if self.jitter <= 0.0 || base <= 0.0 {
            return delay;
        }
        let spread = rand::thread_rng().gen_range(-self.jitter..=self.jitter);
        Duration::try_from_secs_f64((base * (1.0 + spread)).max(0.0)).unwrap_or(Duration::MAX)
    }

    /// Returns true if the given attempt number should be retried.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number (1 = first attempt, 2 = first retry, etc.)
    #[must_use]
    pub const fn should_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new()
    }
}
