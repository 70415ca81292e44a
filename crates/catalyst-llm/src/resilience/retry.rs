//! Retry logic with exponential backoff
//!
//! Used by the router for repeated calls against the same provider before it
//! falls back to the next candidate.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per provider (1 = no retry)
    pub max_attempts: u32,
    /// Initial delay between retries
    #[serde(with = "duration_millis")]
    pub initial_delay: Duration,
    /// Maximum delay between retries
    #[serde(with = "duration_millis")]
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Add random jitter to delays
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum attempts
    #[must_use]
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set initial delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Set maximum delay
    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Set backoff multiplier
    #[must_use]
    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Enable or disable jitter
    #[must_use]
    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Calculate delay for a given attempt number
    pub(crate) fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_delay = self.initial_delay.as_millis() as f64
            * self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);

        let delay_ms = base_delay.min(self.max_delay.as_millis() as f64) as u64;

        let final_delay = if self.jitter {
            // Add up to 25% jitter
            let jitter_range = delay_ms / 4;
            let jitter = rand_jitter(jitter_range);
            delay_ms + jitter
        } else {
            delay_ms
        };

        Duration::from_millis(final_delay)
    }
}

/// Pseudo-random jitter from the clock
fn rand_jitter(max: u64) -> u64 {
    if max == 0 {
        return 0;
    }
    // Use current time nanoseconds as simple randomness source
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos() as u64)
        .unwrap_or(0);
    nanos % max
}

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry after the computed backoff delay
    Retry,
    /// Retry after the given delay (e.g. a provider `retry-after`)
    RetryAfter(Duration),
    /// Stop retrying
    GiveUp,
}

/// Successful value plus the number of attempts it took
#[derive(Debug, Clone, PartialEq)]
pub struct Retried<T> {
    /// Value returned by the final attempt
    pub value: T,
    /// Attempts made, including the successful one
    pub attempts: u32,
}

/// Error type for retry operations
#[derive(Debug)]
pub struct RetryError<E> {
    /// The last error encountered
    pub last_error: E,
    /// Total number of attempts made
    pub attempts: u32,
}

impl<E: std::fmt::Display> std::fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Operation failed after {} attempts: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: std::fmt::Debug + std::fmt::Display> std::error::Error for RetryError<E> {}

/// Execute an async operation with retry logic
///
/// `classify` decides per error whether to retry. A requested
/// `RetryAfter` longer than `max_delay` is treated as `GiveUp` so the
/// caller can move on instead of stalling.
///
/// # Example
/// ```
/// use catalyst_llm::resilience::{retry_with_backoff, RetryConfig, RetryDecision};
///
/// # tokio_test::block_on(async {
/// let config = RetryConfig::new().with_max_attempts(2);
/// let result = retry_with_backoff(
///     &config,
///     || async { Ok::<_, String>(7) },
///     |_: &String| RetryDecision::Retry,
/// )
/// .await
/// .unwrap();
/// assert_eq!(result.value, 7);
/// assert_eq!(result.attempts, 1);
/// # });
/// ```
pub async fn retry_with_backoff<T, E, F, Fut, C>(
    config: &RetryConfig,
    mut operation: F,
    classify: C,
) -> Result<Retried<T>, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> RetryDecision,
    E: std::fmt::Debug,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation().await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Operation succeeded after retry");
                }
                return Ok(Retried {
                    value,
                    attempts: attempt,
                });
            }
            Err(e) => e,
        };

        let delay = match classify(&error) {
            _ if attempt >= max_attempts => None,
            RetryDecision::Retry => Some(config.calculate_delay(attempt)),
            RetryDecision::RetryAfter(d) if d <= config.max_delay => Some(d),
            RetryDecision::RetryAfter(_) | RetryDecision::GiveUp => None,
        };

        let Some(delay) = delay else {
            debug!(attempt, error = ?error, "Operation failed, no more retries");
            return Err(RetryError {
                last_error: error,
                attempts: attempt,
            });
        };

        warn!(
            attempt,
            max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = ?error,
            "Operation failed, retrying"
        );
        sleep(delay).await;
        attempt += 1;
    }
}

/// Durations written as milliseconds in configuration files
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config(max_attempts: u32) -> RetryConfig {
        RetryConfig::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_millis(1))
            .with_max_delay(Duration::from_millis(50))
            .with_jitter(false)
    }

    #[test]
    fn test_retry_config_builder() {
        let config = RetryConfig::new()
            .with_max_attempts(5)
            .with_initial_delay(Duration::from_millis(200))
            .with_max_delay(Duration::from_secs(30))
            .with_backoff_multiplier(3.0)
            .with_jitter(false);

        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.initial_delay, Duration::from_millis(200));
        assert_eq!(config.max_delay, Duration::from_secs(30));
        assert_eq!(config.backoff_multiplier, 3.0);
        assert!(!config.jitter);
    }

    #[test]
    fn test_calculate_delay() {
        let config = RetryConfig::new()
            .with_initial_delay(Duration::from_millis(100))
            .with_backoff_multiplier(2.0)
            .with_jitter(false);

        assert_eq!(config.calculate_delay(1), Duration::from_millis(100));
        assert_eq!(config.calculate_delay(2), Duration::from_millis(200));
        assert_eq!(config.calculate_delay(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_respects_max() {
        let config = RetryConfig::new()
            .with_initial_delay(Duration::from_secs(1))
            .with_max_delay(Duration::from_secs(5))
            .with_backoff_multiplier(10.0)
            .with_jitter(false);

        assert_eq!(config.calculate_delay(3), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_stays_within_quarter() {
        let config = RetryConfig::new()
            .with_initial_delay(Duration::from_millis(400))
            .with_jitter(true);

        let delay = config.calculate_delay(1);
        assert!(delay >= Duration::from_millis(400));
        assert!(delay < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_retry_success_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(
            &fast_config(3),
            || {
                let c = counter_clone.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err("transient error")
                    } else {
                        Ok(42)
                    }
                }
            },
            |_| RetryDecision::Retry,
        )
        .await
        .unwrap();

        assert_eq!(result.value, 42);
        assert_eq!(result.attempts, 3);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_all_attempts_fail() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let err = retry_with_backoff(
            &fast_config(3),
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, &str>("persistent error")
                }
            },
            |_| RetryDecision::Retry,
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error, "persistent error");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_give_up_stops_immediately() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let err = retry_with_backoff(
            &fast_config(3),
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err::<i32, &str>("bad credentials")
                }
            },
            |_| RetryDecision::GiveUp,
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_after_within_cap_is_honoured() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result = retry_with_backoff(
            &fast_config(2),
            || {
                let c = counter_clone.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err("slow down")
                    } else {
                        Ok("done")
                    }
                }
            },
            |_| RetryDecision::RetryAfter(Duration::from_millis(5)),
        )
        .await
        .unwrap();

        assert_eq!(result.attempts, 2);
    }

    #[tokio::test]
    async fn test_retry_after_beyond_cap_gives_up() {
        let err = retry_with_backoff(
            &fast_config(3),
            || async { Err::<(), &str>("slow down") },
            |_| RetryDecision::RetryAfter(Duration::from_secs(60)),
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
    }

    #[test]
    fn test_config_deserializes_millis() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"max_attempts": 4, "initial_delay": 50}"#).unwrap();
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.initial_delay, Duration::from_millis(50));
        assert_eq!(config.max_delay, Duration::from_secs(5));
    }
}
