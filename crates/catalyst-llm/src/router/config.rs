//! Router configuration
//!
//! Strategy, fallback depth, confidence escalation, budget and the
//! resilience settings used for every provider call.

use super::rules::RoutingRules;
use super::types::ModelTier;
use crate::resilience::{CircuitBreakerConfig, RetryConfig};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How eligible providers are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    /// Catalog priority ascending
    #[default]
    Priority,
    /// Estimated request cost ascending
    CostOptimized,
    /// Observed latency ascending
    LatencyOptimized,
}

impl fmt::Display for RoutingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Priority => "priority",
            Self::CostOptimized => "cost_optimized",
            Self::LatencyOptimized => "latency_optimized",
        })
    }
}

/// Router configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Default ordering strategy
    pub strategy: RoutingStrategy,
    /// Candidates tried after the first one
    pub max_fallbacks: usize,
    /// Responses scoring below this are considered low confidence
    pub confidence_threshold: f32,
    /// Try the next candidate after a low-confidence response
    pub escalate_on_low_confidence: bool,
    /// Daily spending limit in USD (UTC day); unset = unlimited
    pub daily_budget_usd: Option<f64>,
    /// Same-provider retry settings
    pub retry: RetryConfig,
    /// Circuit breaker settings, one breaker per provider
    pub circuit_breaker: CircuitBreakerConfig,
    /// Task-specific overrides
    pub rules: RoutingRules,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strategy: RoutingStrategy::Priority,
            max_fallbacks: 3,
            confidence_threshold: 0.6,
            escalate_on_low_confidence: true,
            daily_budget_usd: None,
            retry: RetryConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            rules: RoutingRules::default(),
        }
    }
}

impl RouterConfig {
    /// Set the strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the fallback depth
    #[must_use]
    pub fn with_max_fallbacks(mut self, max_fallbacks: usize) -> Self {
        self.max_fallbacks = max_fallbacks;
        self
    }

    /// Set the confidence threshold
    #[must_use]
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Set the daily budget
    #[must_use]
    pub fn with_daily_budget(mut self, usd: f64) -> Self {
        self.daily_budget_usd = Some(usd);
        self
    }

    /// Set retry settings
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set circuit breaker settings
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set routing rules
    #[must_use]
    pub fn with_rules(mut self, rules: RoutingRules) -> Self {
        self.rules = rules;
        self
    }
}

/// Per-call routing options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteOptions {
    /// Force an ordering strategy
    pub strategy: Option<RoutingStrategy>,
    /// Move this provider to the front when eligible
    pub preferred_provider: Option<String>,
    /// Providers to leave out
    pub exclude: Vec<String>,
    /// Cap the model tier for this call
    pub max_tier: Option<ModelTier>,
    /// Prompt size used for cost estimates (set by `route`)
    pub estimated_input_tokens: Option<u32>,
}

impl RouteOptions {
    /// Prefer a provider
    #[must_use]
    pub fn prefer(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    /// Exclude a provider
    #[must_use]
    pub fn exclude(mut self, provider: impl Into<String>) -> Self {
        self.exclude.push(provider.into());
        self
    }

    /// Force a strategy
    #[must_use]
    pub fn with_strategy(mut self, strategy: RoutingStrategy) -> Self {
        self.strategy = Some(strategy);
        self
    }

    /// Cap the model tier
    #[must_use]
    pub fn with_max_tier(mut self, tier: ModelTier) -> Self {
        self.max_tier = Some(tier);
        self
    }
}
