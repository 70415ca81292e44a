//! Per-provider circuit breaker
//!
//! A provider that keeps failing is taken out of the routing plan until
//! `reset_timeout` has elapsed, after which a limited amount of traffic
//! probes it again:
//! - Closed: requests pass through
//! - Open: failures exceeded the threshold inside the window, provider skipped
//! - HalfOpen: probing; any failure reopens, `success_threshold` successes close

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Circuit breaker state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitState {
    /// Normal operation - requests pass through
    Closed,
    /// Failures exceeded threshold - requests are rejected
    Open,
    /// Testing recovery - limited requests pass through
    HalfOpen,
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Closed => write!(f, "Closed"),
            Self::Open => write!(f, "Open"),
            Self::HalfOpen => write!(f, "HalfOpen"),
        }
    }
}

/// Configuration for circuit breaker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Number of failures before opening the circuit
    pub failure_threshold: u32,
    /// Number of successes in half-open state to close the circuit
    pub success_threshold: u32,
    /// Duration to wait before transitioning from open to half-open
    #[serde(with = "duration_secs")]
    pub reset_timeout: Duration,
    /// Window size for counting failures (rolling window)
    #[serde(with = "duration_secs")]
    pub failure_window: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            success_threshold: 2,
            reset_timeout: Duration::from_secs(30),
            failure_window: Duration::from_secs(60),
        }
    }
}

impl CircuitBreakerConfig {
    /// Create a new configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set failure threshold
    #[must_use]
    pub fn with_failure_threshold(mut self, threshold: u32) -> Self {
        self.failure_threshold = threshold;
        self
    }

    /// Set success threshold for half-open state
    #[must_use]
    pub fn with_success_threshold(mut self, threshold: u32) -> Self {
        self.success_threshold = threshold;
        self
    }

    /// Set reset timeout
    #[must_use]
    pub fn with_reset_timeout(mut self, timeout: Duration) -> Self {
        self.reset_timeout = timeout;
        self
    }

    /// Set failure window
    #[must_use]
    pub fn with_failure_window(mut self, window: Duration) -> Self {
        self.failure_window = window;
        self
    }
}

/// Circuit breaker for one provider
#[derive(Debug)]
pub struct CircuitBreaker {
    name: String,
    config: CircuitBreakerConfig,
    state: RwLock<CircuitState>,
    failure_count: AtomicU32,
    success_count: AtomicU32,
    last_failure_time: AtomicU64,
    opened_at: AtomicU64,
}

impl CircuitBreaker {
    /// Create a new circuit breaker
    #[must_use]
    pub fn new(name: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            state: RwLock::new(CircuitState::Closed),
            failure_count: AtomicU32::new(0),
            success_count: AtomicU32::new(0),
            last_failure_time: AtomicU64::new(0),
            opened_at: AtomicU64::new(0),
        }
    }

    /// Create with default configuration
    #[must_use]
    pub fn with_defaults(name: impl Into<String>) -> Self {
        Self::new(name, CircuitBreakerConfig::default())
    }

    /// Get the circuit breaker name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the current state
    #[must_use]
    pub fn state(&self) -> CircuitState {
        *self.read_state()
    }

    /// Current state after applying any due open → half-open transition
    #[must_use]
    pub fn current_state(&self) -> CircuitState {
        self.check_state_transition();
        self.state()
    }

    /// Time left before an open circuit starts probing again
    #[must_use]
    pub fn remaining_open(&self) -> Option<Duration> {
        if self.state() != CircuitState::Open {
            return None;
        }
        let opened_at = self.opened_at.load(Ordering::SeqCst);
        let elapsed = Duration::from_millis(current_timestamp().saturating_sub(opened_at));
        Some(self.config.reset_timeout.saturating_sub(elapsed))
    }

    /// Get current failure count
    #[must_use]
    pub fn failure_count(&self) -> u32 {
        self.failure_count.load(Ordering::SeqCst)
    }

    /// Check if the circuit allows a request
    #[must_use]
    pub fn can_execute(&self) -> bool {
        self.current_state() != CircuitState::Open
    }

    /// Record a successful operation
    pub fn record_success(&self) {
        match self.state() {
            CircuitState::Closed => {
                // Reset failure count on success in closed state
                self.failure_count.store(0, Ordering::SeqCst);
            }
            CircuitState::HalfOpen => {
                let successes = self.success_count.fetch_add(1, Ordering::SeqCst) + 1;
                debug!(
                    name = %self.name,
                    successes = successes,
                    threshold = self.config.success_threshold,
                    "Circuit breaker success in half-open state"
                );

                if successes >= self.config.success_threshold {
                    self.close();
                }
            }
            CircuitState::Open => {
                // Late result of a call dispatched before the circuit opened
            }
        }
    }

    /// Record a failed operation
    pub fn record_failure(&self) {
        let now = current_timestamp();

        match self.state() {
            CircuitState::Closed => {
                // Check if we should reset the failure count (outside window)
                let last_failure = self.last_failure_time.load(Ordering::SeqCst);
                if last_failure > 0 {
                    let elapsed = Duration::from_millis(now.saturating_sub(last_failure));
                    if elapsed > self.config.failure_window {
                        self.failure_count.store(0, Ordering::SeqCst);
                    }
                }

                self.last_failure_time.store(now, Ordering::SeqCst);
                let failures = self.failure_count.fetch_add(1, Ordering::SeqCst) + 1;

                debug!(
                    name = %self.name,
                    failures = failures,
                    threshold = self.config.failure_threshold,
                    "Circuit breaker failure recorded"
                );

                if failures >= self.config.failure_threshold {
                    self.open();
                }
            }
            CircuitState::HalfOpen => {
                // Any failure in half-open state reopens the circuit
                warn!(
                    name = %self.name,
                    "Circuit breaker failure in half-open state, reopening"
                );
                self.open();
            }
            CircuitState::Open => {
                // Already open, ignore
            }
        }
    }

    /// Check and perform state transitions
    fn check_state_transition(&self) {
        if self.state() == CircuitState::Open {
            let opened_at = self.opened_at.load(Ordering::SeqCst);
            let now = current_timestamp();
            let elapsed = Duration::from_millis(now.saturating_sub(opened_at));

            if elapsed >= self.config.reset_timeout {
                self.half_open();
            }
        }
    }

    // A poisoned lock still holds a valid state value
    fn read_state(&self) -> RwLockReadGuard<'_, CircuitState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CircuitState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Transition to open state
    fn open(&self) {
        let mut state = self.write_state();
        if *state != CircuitState::Open {
            info!(
                name = %self.name,
                failures = self.failure_count.load(Ordering::SeqCst),
                reset_after_secs = self.config.reset_timeout.as_secs(),
                "Circuit breaker opened"
            );
            *state = CircuitState::Open;
            self.opened_at.store(current_timestamp(), Ordering::SeqCst);
        }
    }

    /// Transition to half-open state
    fn half_open(&self) {
        let mut state = self.write_state();
        if *state == CircuitState::Open {
            info!(name = %self.name, "Circuit breaker entering half-open state");
            *state = CircuitState::HalfOpen;
            self.success_count.store(0, Ordering::SeqCst);
            self.failure_count.store(0, Ordering::SeqCst);
        }
    }

    /// Transition to closed state
    fn close(&self) {
        let mut state = self.write_state();
        if *state != CircuitState::Closed {
            info!(name = %self.name, "Circuit breaker closed");
            *state = CircuitState::Closed;
            self.failure_count.store(0, Ordering::SeqCst);
            self.success_count.store(0, Ordering::SeqCst);
        }
    }

    /// Reset the circuit breaker to closed state
    pub fn reset(&self) {
        self.close();
    }
}

/// Durations written as whole seconds in configuration files
pub(crate) mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
