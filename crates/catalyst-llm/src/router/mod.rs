//! Router - task-based provider selection with fallback
//!
//! # Module Structure
//!
//! - `types`: Core types (TaskType, ModelTier)
//! - `rules`: Task-specific routing overrides
//! - `config`: Router configuration and per-call options
//! - `provider`: LlmProvider trait definition
//! - `health`: Per-provider circuit breaker and latency tracking
//! - `plan`: Route plans, skip reasons and attempt traces
//! - `router_impl`: LlmRouter implementation

mod config;
mod health;
mod plan;
mod provider;
mod router_impl;
mod rules;
mod types;

#[cfg(test)]
mod tests;

pub use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
pub use crate::message::{Message, MessageRole};

pub use config::{RouteOptions, RouterConfig, RoutingStrategy};
pub use health::{HealthSnapshot, ProviderHealth};
pub use plan::{
    AttemptOutcome, AttemptRecord, RouteCandidate, RoutePlan, RoutedResponse, SkipReason,
    SkippedProvider,
};
pub use provider::LlmProvider;
pub use router_impl::{LlmRouter, ProviderStatus};
pub use rules::RoutingRules;
pub use types::{ModelTier, TaskType};
