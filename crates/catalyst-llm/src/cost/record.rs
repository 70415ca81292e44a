//! Usage Records and Statistics

use crate::router::TaskType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Usage data reported by the router after a provider call
#[derive(Debug, Clone)]
pub struct UsageEvent {
    /// Route this call belonged to
    pub route_id: Option<Uuid>,
    /// Provider name
    pub provider: String,
    /// Model name
    pub model: String,
    /// Task routed
    pub task: Option<TaskType>,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Latency in milliseconds
    pub latency_ms: u64,
    /// Was the request successful?
    pub success: bool,
    /// Was this provider a fallback candidate?
    pub fallback: bool,
}

impl UsageEvent {
    /// Create an event for a provider/model pair
    #[must_use]
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            route_id: None,
            provider: provider.into(),
            model: model.into(),
            task: None,
            input_tokens: 0,
            output_tokens: 0,
            latency_ms: 0,
            success: true,
            fallback: false,
        }
    }

    /// Set token counts
    #[must_use]
    pub fn tokens(mut self, input_tokens: u32, output_tokens: u32) -> Self {
        self.input_tokens = input_tokens;
        self.output_tokens = output_tokens;
        self
    }

    /// Set latency
    #[must_use]
    pub fn latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Mark as failed
    #[must_use]
    pub fn failed(mut self) -> Self {
        self.success = false;
        self
    }

    /// Set the task
    #[must_use]
    pub fn task(mut self, task: TaskType) -> Self {
        self.task = Some(task);
        self
    }

    /// Set the route id
    #[must_use]
    pub fn route(mut self, route_id: Uuid) -> Self {
        self.route_id = Some(route_id);
        self
    }

    /// Mark as a fallback call
    #[must_use]
    pub fn fallback(mut self, fallback: bool) -> Self {
        self.fallback = fallback;
        self
    }
}

/// A single usage record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Record ID
    pub id: u64,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Route ID (if the call was routed)
    pub route_id: Option<Uuid>,
    /// Provider name
    pub provider: String,
    /// Model name
    pub model: String,
    /// Task routed
    pub task: Option<TaskType>,
    /// Input tokens
    pub input_tokens: u32,
    /// Output tokens
    pub output_tokens: u32,
    /// Estimated cost (USD)
    pub estimated_cost: f64,
    /// Latency in milliseconds
    pub latency_ms: u64,
    /// Was the request successful?
    pub success: bool,
    /// Was this provider a fallback candidate?
    pub fallback: bool,
}

/// Aggregated usage statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageStats {
    /// Total input tokens
    pub total_input_tokens: u64,
    /// Total output tokens
    pub total_output_tokens: u64,
    /// Total estimated cost (USD)
    pub total_cost: f64,
    /// Total requests
    pub total_requests: u64,
    /// Successful requests
    pub successful_requests: u64,
    /// Failed requests
    pub failed_requests: u64,
    /// Requests served by a fallback provider
    pub fallback_requests: u64,
    /// Average latency (ms)
    pub avg_latency_ms: f64,
    /// Usage by provider
    pub by_provider: HashMap<String, ProviderStats>,
    /// Usage by model
    pub by_model: HashMap<String, ModelStats>,
    /// Request count by task
    pub by_task: HashMap<TaskType, u64>,
}

/// Per-provider statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStats {
    /// Provider name
    pub provider: String,
    /// Total tokens
    pub total_tokens: u64,
    /// Total cost
    pub total_cost: f64,
    /// Request count
    pub request_count: u64,
    /// Failed request count
    pub failure_count: u64,
}

/// Per-model statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelStats {
    /// Model name
    pub model: String,
    /// Provider serving the model
    pub provider: String,
    /// Total input tokens
    pub input_tokens: u64,
    /// Total output tokens
    pub output_tokens: u64,
    /// Total cost
    pub total_cost: f64,
    /// Request count
    pub request_count: u64,
}
