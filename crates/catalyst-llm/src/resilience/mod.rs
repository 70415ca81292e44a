//! Resilience primitives shared by the router
//!
//! - [`CircuitBreaker`]: takes failing providers out of rotation
//! - [`retry_with_backoff`]: same-provider retries with exponential backoff
//! - [`RateLimiter`]: sliding-window request ceiling per provider

mod circuit_breaker;
mod rate_limiter;
mod retry;

pub(crate) use circuit_breaker::duration_secs;
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use rate_limiter::{RateLimitConfig, RateLimitResult, RateLimiter};
pub use retry::{retry_with_backoff, Retried, RetryConfig, RetryDecision, RetryError};
