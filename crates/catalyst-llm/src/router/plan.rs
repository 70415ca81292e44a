//! Route plans and execution traces

use super::config::RoutingStrategy;
use super::types::{ModelTier, TaskType};
use crate::completion::CompletionResponse;
use crate::resilience::CircuitState;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Why a provider is not in the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// Disabled in the catalog
    Disabled,
    /// Missing credentials or no registered transport
    NotConfigured,
    /// Provider does not serve this task
    UnsupportedTask,
    /// Excluded by the caller
    Excluded,
    /// Circuit breaker is open
    CircuitOpen {
        /// Seconds until the breaker probes again
        retry_in_secs: u64,
    },
    /// Rate-limit window is full
    RateLimited {
        /// Milliseconds until a slot frees up
        reset_in_ms: u64,
    },
    /// Estimated cost exceeds the remaining daily budget
    OverBudget {
        /// Estimated request cost (USD)
        estimated_cost: f64,
        /// Budget left today (USD)
        remaining: f64,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::NotConfigured => write!(f, "not configured"),
            Self::UnsupportedTask => write!(f, "task not supported"),
            Self::Excluded => write!(f, "excluded"),
            Self::CircuitOpen { retry_in_secs } => {
                write!(f, "circuit open (retry in {}s)", retry_in_secs)
            }
            Self::RateLimited { reset_in_ms } => {
                write!(f, "rate limited (reset in {}ms)", reset_in_ms)
            }
            Self::OverBudget {
                estimated_cost,
                remaining,
            } => write!(
                f,
                "over budget (needs ${:.4}, ${:.4} left)",
                estimated_cost, remaining
            ),
        }
    }
}

/// A provider left out of the plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedProvider {
    /// Provider name
    pub provider: String,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// A provider/model pair the router will try
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteCandidate {
    /// Provider name
    pub provider: String,
    /// Model to request
    pub model: String,
    /// Model tier
    pub tier: ModelTier,
    /// Catalog priority
    pub priority: u32,
    /// Estimated request cost (USD)
    pub estimated_cost: f64,
    /// Observed latency, if known
    pub latency_ms: Option<f64>,
    /// Circuit state at planning time
    pub circuit: CircuitState,
}

/// Ordered candidates for one task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// Task being routed
    pub task: TaskType,
    /// Strategy used for ordering
    pub strategy: RoutingStrategy,
    /// Candidates in the order they will be tried
    pub candidates: Vec<RouteCandidate>,
    /// Providers left out and why
    pub skipped: Vec<SkippedProvider>,
}

impl RoutePlan {
    /// Whether nothing can be tried
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Provider names in try order
    #[must_use]
    pub fn provider_order(&self) -> Vec<&str> {
        self.candidates.iter().map(|c| c.provider.as_str()).collect()
    }

    /// Skip reason recorded for a provider
    #[must_use]
    pub fn skip_reason(&self, provider: &str) -> Option<&SkipReason> {
        self.skipped
            .iter()
            .find(|s| s.provider == provider)
            .map(|s| &s.reason)
    }

    /// One-line summary of the skip reasons
    #[must_use]
    pub fn describe_skips(&self) -> String {
        if self.skipped.is_empty() {
            return "no providers registered".to_string();
        }
        self.skipped
            .iter()
            .map(|s| format!("{}: {}", s.provider, s.reason))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// How one provider attempt ended
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Accepted response
    Success {
        /// Confidence score
        confidence: f32,
    },
    /// Response below the confidence threshold; next candidate tried
    LowConfidence {
        /// Confidence score
        confidence: f32,
    },
    /// Call failed after retries
    Failed {
        /// Error kind label
        error_kind: String,
        /// Sanitized error message
        message: String,
    },
    /// No rate-limit slot at dispatch time
    RateLimited,
}

/// One provider attempt within a route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Provider name
    pub provider: String,
    /// Model requested
    pub model: String,
    /// Result
    pub outcome: AttemptOutcome,
    /// Calls made to the provider (retries included)
    pub tries: u32,
    /// Wall time spent on this provider
    pub latency_ms: u64,
}

/// Result of a routed completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutedResponse {
    /// Identifier for logs and usage correlation
    pub route_id: Uuid,
    /// Task routed
    pub task: TaskType,
    /// The accepted response
    pub response: CompletionResponse,
    /// Provider that produced it
    pub provider: String,
    /// Model that produced it
    pub model: String,
    /// Confidence score
    pub confidence: f32,
    /// Every attempt in order
    pub attempts: Vec<AttemptRecord>,
    /// Whether a candidate other than the first answered
    pub used_fallback: bool,
    /// Whether no candidate reached the confidence threshold
    pub low_confidence: bool,
    /// Total wall time
    pub latency_ms: u64,
    /// Estimated cost of the accepted call (USD)
    pub estimated_cost: f64,
}
