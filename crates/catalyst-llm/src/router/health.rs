//! Per-provider health
//!
//! Every provider call updates the provider's circuit breaker, its success and
//! failure counters and an exponentially weighted moving average of latency.
//! The plan reads these to skip broken providers and to rank by latency.

use crate::error::Error;
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Weight of the newest latency sample
const EWMA_ALPHA: f64 = 0.3;

/// Health state for one provider
#[derive(Debug)]
pub struct ProviderHealth {
    breaker: CircuitBreaker,
    ewma_latency_ms: Mutex<Option<f64>>,
    last_error: Mutex<Option<String>>,
    successes: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of a provider's health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    /// Circuit breaker state
    pub circuit: CircuitState,
    /// Smoothed latency of successful calls
    pub ewma_latency_ms: Option<f64>,
    /// Successful calls
    pub successes: u64,
    /// Failed calls
    pub failures: u64,
    /// Most recent failure message
    pub last_error: Option<String>,
}

impl ProviderHealth {
    /// Create health state with its own circuit breaker
    #[must_use]
    pub fn new(name: &str, config: CircuitBreakerConfig) -> Self {
        Self {
            breaker: CircuitBreaker::new(name, config),
            ewma_latency_ms: Mutex::new(None),
            last_error: Mutex::new(None),
            successes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    /// The provider's circuit breaker
    #[must_use]
    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Circuit state, applying a due open → half-open transition
    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.current_state()
    }

    /// Smoothed latency, if any call has succeeded
    #[must_use]
    pub fn ewma_latency_ms(&self) -> Option<f64> {
        *self.ewma_latency_ms.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record a successful call
    pub fn record_success(&self, latency: Duration) {
        self.successes.fetch_add(1, Ordering::Relaxed);
        self.breaker.record_success();

        let sample = latency.as_secs_f64() * 1000.0;
        let mut ewma = self.ewma_latency_ms.lock().unwrap_or_else(|e| e.into_inner());
        *ewma = Some(match *ewma {
            Some(prev) => EWMA_ALPHA * sample + (1.0 - EWMA_ALPHA) * prev,
            None => sample,
        });
    }

    /// Record a failed call
    ///
    /// Errors caused by the request itself do not count against the provider.
    pub fn record_failure(&self, error: &Error) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        *self.last_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(error.to_string());

        if counts_against_provider(error) {
            self.breaker.record_failure();
        }
    }

    /// Copy the current state
    #[must_use]
    pub fn snapshot(&self) -> HealthSnapshot {
        HealthSnapshot {
            circuit: self.circuit_state(),
            ewma_latency_ms: self.ewma_latency_ms(),
            successes: self.successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            last_error: self
                .last_error
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone(),
        }
    }
}

fn counts_against_provider(error: &Error) -> bool {
    !matches!(error, Error::InvalidRequest(_) | Error::ContextLength(_))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ewma_latency() {
        let health = ProviderHealth::new("p", CircuitBreakerConfig::default());
        assert!(health.ewma_latency_ms().is_none());

        health.record_success(Duration::from_millis(100));
        assert!((health.ewma_latency_ms().unwrap() - 100.0).abs() < 1e-6);

        health.record_success(Duration::from_millis(200));
        // 0.3 * 200 + 0.7 * 100
        assert!((health.ewma_latency_ms().unwrap() - 130.0).abs() < 1e-6);
    }

    #[test]
    fn test_failures_open_circuit() {
        let config = CircuitBreakerConfig::new().with_failure_threshold(2);
        let health = ProviderHealth::new("p", config);

        health.record_failure(&Error::Api("500".into()));
        health.record_failure(&Error::Timeout(1000));

        let snapshot = health.snapshot();
        assert_eq!(snapshot.circuit, CircuitState::Open);
        assert_eq!(snapshot.failures, 2);
        assert_eq!(snapshot.last_error.as_deref(), Some("timeout after 1000ms"));
    }

    #[test]
    fn test_unknown_model_trips_breaker() {
        let config = CircuitBreakerConfig::new().with_failure_threshold(1);
        let health = ProviderHealth::new("p", config);

        health.record_failure(&Error::ModelNotFound("no such model".into()));

        assert_eq!(health.circuit_state(), CircuitState::Open);
    }

    #[test]
    fn test_request_errors_do_not_trip_breaker() {
        let config = CircuitBreakerConfig::new().with_failure_threshold(1);
        let health = ProviderHealth::new("p", config);

        health.record_failure(&Error::InvalidRequest("bad".into()));
        health.record_failure(&Error::ContextLength("long".into()));

        assert_eq!(health.circuit_state(), CircuitState::Closed);
        assert_eq!(health.snapshot().failures, 2);
    }
}
