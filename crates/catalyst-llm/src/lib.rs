//! Catalyst LLM - provider catalog, routing and fallback
//!
//! This crate provides LLM integration for Catalyst:
//! - Catalog: providers, models, tiers, prices and rate limits
//! - Router: task-based planning with priority, cost and latency strategies
//! - Resilience: retries, per-provider circuit breakers and rate limiting
//! - Confidence: escalation past low-confidence answers
//! - Cost: usage tracking, daily budget and savings reports
//! - Providers: OpenAI-compatible, Anthropic and Ollama transports

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod catalog;
pub mod completion;
pub mod confidence;
pub mod cost;
pub mod diagnostics;
pub mod error;
pub mod message;
pub mod providers;
pub mod resilience;
pub mod router;
pub mod token;
pub mod util;

pub use catalog::{
    ModelSpec, ProviderCatalog, ProviderKind, ProviderOverride, ProviderSettings, Protocol,
};
pub use confidence::ConfidenceScorer;
pub use cost::{
    BudgetStatus, CostReport, CostTracker, ModelPricing, SavingsPotential, UsageEvent,
    UsageRecord, UsageStats,
};
pub use diagnostics::{
    get_system_usage_metrics, test_providers, ProbeStatus, ProviderTestResult, UsageMetrics,
};
pub use error::{Error, Result};
pub use providers::{build_provider, build_router, ScriptedProvider};
pub use router::{
    AttemptOutcome, AttemptRecord, CompletionRequest, CompletionResponse, LlmProvider, LlmRouter,
    Message, MessageRole, ModelTier, ProviderStatus, RouteOptions, RoutePlan, RoutedResponse,
    RouterConfig, RoutingRules, RoutingStrategy, SkipReason, TaskType, TokenUsage,
};
pub use token::{count_message_tokens, count_tokens, TokenBudget, TokenCounter, TOKEN_COUNTER};
