//! Error types for catalyst-llm

use std::time::Duration;
use thiserror::Error;

/// LLM error type
#[derive(Debug, Error)]
pub enum Error {
    /// Provider not configured (missing key, unknown name)
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// Authentication rejected by the provider
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Rate limit exceeded
    #[error("rate limit exceeded")]
    RateLimit {
        /// Delay requested by the provider, if any
        retry_after: Option<Duration>,
    },

    /// Request rejected as malformed
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Model or endpoint unknown to this provider
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Prompt does not fit the model's context window
    #[error("context length exceeded: {0}")]
    ContextLength(String),

    /// API error (server side)
    #[error("api error: {0}")]
    Api(String),

    /// Invalid response
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// Timeout
    #[error("timeout after {0}ms")]
    Timeout(u64),

    /// Invalid catalog or router configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// No provider was eligible for the task
    #[error("no provider available for {task}: {reasons}")]
    NoProviderAvailable {
        /// Task that was being routed
        task: String,
        /// Why each provider was skipped
        reasons: String,
    },

    /// Every candidate provider failed
    #[error("all providers failed for {task} after {attempts} attempts: {last_error}")]
    AllProvidersFailed {
        /// Task that was being routed
        task: String,
        /// Number of provider attempts made
        attempts: usize,
        /// Message of the final failure
        last_error: String,
    },
}

impl Error {
    /// Whether retrying the same provider may succeed
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimit { .. } | Self::Api(_) | Self::Network(_) | Self::Timeout(_)
        )
    }

    /// Whether another provider may succeed where this one failed
    ///
    /// A malformed request fails the same way everywhere.
    #[must_use]
    pub fn should_fallback(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }

    /// Provider-requested delay before the next attempt
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Short machine-readable label used in attempt traces and logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured(_) => "not_configured",
            Self::Auth(_) => "auth",
            Self::RateLimit { .. } => "rate_limit",
            Self::InvalidRequest(_) => "invalid_request",
            Self::ModelNotFound(_) => "model_not_found",
            Self::ContextLength(_) => "context_length",
            Self::Api(_) => "api",
            Self::InvalidResponse(_) => "invalid_response",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::Config(_) => "config",
            Self::NoProviderAvailable { .. } => "no_provider",
            Self::AllProvidersFailed { .. } => "all_failed",
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
