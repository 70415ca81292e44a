//! Cost Tracker - Usage monitoring
//!
//! Records every provider call the router makes, prices it from the catalog
//! and answers budget questions for the plan.

use super::pricing::{default_cost, pricing_from_catalog, pricing_key, ModelPricing};
use super::record::{ModelStats, ProviderStats, UsageEvent, UsageRecord, UsageStats};
use super::report::{calculate_savings_potential, CostReport};
use crate::catalog::ProviderCatalog;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Maximum records to keep in memory by default
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

/// Records included in a report
const REPORT_RECENT_RECORDS: usize = 100;

/// Spending against the daily budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    /// Configured limit (USD); `None` = unlimited
    pub daily_limit_usd: Option<f64>,
    /// Spent since the start of the UTC day (USD)
    pub spent_today_usd: f64,
    /// Left today (USD); `None` = unlimited
    pub remaining_usd: Option<f64>,
    /// Whether the limit has been reached
    pub exhausted: bool,
    /// Start of the current budget day
    pub day_start: DateTime<Utc>,
}

/// Cost tracker for monitoring LLM usage
#[derive(Debug)]
pub struct CostTracker {
    /// Pricing information keyed by `provider/model`
    pricing: RwLock<HashMap<String, ModelPricing>>,
    /// Usage records, oldest first
    records: RwLock<Vec<UsageRecord>>,
    /// Record ID counter
    next_id: AtomicU64,
    /// Maximum records to keep in memory
    max_records: usize,
}

impl Default for CostTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CostTracker {
    /// Create a new cost tracker with an empty pricing table
    #[must_use]
    pub fn new() -> Self {
        Self {
            pricing: RwLock::new(HashMap::new()),
            records: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            max_records: DEFAULT_MAX_RECORDS,
        }
    }

    /// Create a tracker priced from a catalog
    #[must_use]
    pub fn with_catalog(catalog: &ProviderCatalog) -> Self {
        Self {
            pricing: RwLock::new(pricing_from_catalog(catalog)),
            ..Self::new()
        }
    }

    /// Create with custom max records
    #[must_use]
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Update pricing for a model
    pub async fn update_pricing(&self, pricing: ModelPricing) {
        let mut prices = self.pricing.write().await;
        prices.insert(pricing_key(&pricing.provider, &pricing.model), pricing);
    }

    /// Get pricing for a model
    pub async fn get_pricing(&self, provider: &str, model: &str) -> Option<ModelPricing> {
        let prices = self.pricing.read().await;
        prices.get(&pricing_key(provider, model)).cloned()
    }

    /// Estimate cost for a request
    pub async fn estimate_cost(
        &self,
        provider: &str,
        model: &str,
        input_tokens: u32,
        output_tokens: u32,
    ) -> f64 {
        let prices = self.pricing.read().await;
        match prices.get(&pricing_key(provider, model)) {
            Some(pricing) => pricing.calculate_cost(input_tokens, output_tokens),
            None => default_cost(input_tokens, output_tokens),
        }
    }

    /// Record a usage event
    pub async fn record_usage(&self, event: UsageEvent) -> UsageRecord {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let estimated_cost = self
            .estimate_cost(
                &event.provider,
                &event.model,
                event.input_tokens,
                event.output_tokens,
            )
            .await;

        let record = UsageRecord {
            id,
            timestamp: Utc::now(),
            route_id: event.route_id,
            provider: event.provider,
            model: event.model,
            task: event.task,
            input_tokens: event.input_tokens,
            output_tokens: event.output_tokens,
            estimated_cost,
            latency_ms: event.latency_ms,
            success: event.success,
            fallback: event.fallback,
        };

        let mut records = self.records.write().await;
        records.push(record.clone());

        // Trim old records if needed
        if records.len() > self.max_records {
            let drain_count = records.len() - self.max_records;
            records.drain(0..drain_count);
        }

        record
    }

    /// Get usage statistics for a time range
    pub async fn get_stats(&self, since: Option<DateTime<Utc>>) -> UsageStats {
        let records = self.records.read().await;
        let filtered: Vec<&UsageRecord> = records
            .iter()
            .filter(|r| since.map_or(true, |since| r.timestamp >= since))
            .collect();

        let mut stats = UsageStats::default();
        let mut total_latency: u64 = 0;

        for record in &filtered {
            stats.total_input_tokens += record.input_tokens as u64;
            stats.total_output_tokens += record.output_tokens as u64;
            stats.total_cost += record.estimated_cost;
            stats.total_requests += 1;
            total_latency += record.latency_ms;

            if record.success {
                stats.successful_requests += 1;
                if record.fallback {
                    stats.fallback_requests += 1;
                }
            } else {
                stats.failed_requests += 1;
            }

            let provider_stats = stats
                .by_provider
                .entry(record.provider.clone())
                .or_insert_with(|| ProviderStats {
                    provider: record.provider.clone(),
                    ..Default::default()
                });
            provider_stats.total_tokens += (record.input_tokens + record.output_tokens) as u64;
            provider_stats.total_cost += record.estimated_cost;
            provider_stats.request_count += 1;
            if !record.success {
                provider_stats.failure_count += 1;
            }

            let model_stats = stats
                .by_model
                .entry(pricing_key(&record.provider, &record.model))
                .or_insert_with(|| ModelStats {
                    model: record.model.clone(),
                    provider: record.provider.clone(),
                    ..Default::default()
                });
            model_stats.input_tokens += record.input_tokens as u64;
            model_stats.output_tokens += record.output_tokens as u64;
            model_stats.total_cost += record.estimated_cost;
            model_stats.request_count += 1;

            if let Some(task) = record.task {
                *stats.by_task.entry(task).or_insert(0) += 1;
            }
        }

        if !filtered.is_empty() {
            stats.avg_latency_ms = total_latency as f64 / filtered.len() as f64;
        }

        stats
    }

    /// Total estimated spend since a point in time
    pub async fn spent_since(&self, since: DateTime<Utc>) -> f64 {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.timestamp >= since)
            .map(|r| r.estimated_cost)
            .sum()
    }

    /// Spending against a daily budget (UTC day)
    pub async fn budget_status(&self, daily_limit_usd: Option<f64>) -> BudgetStatus {
        let day_start = start_of_utc_day(Utc::now());
        let spent_today_usd = self.spent_since(day_start).await;
        let remaining_usd = daily_limit_usd.map(|limit| (limit - spent_today_usd).max(0.0));

        BudgetStatus {
            daily_limit_usd,
            spent_today_usd,
            remaining_usd,
            exhausted: remaining_usd.is_some_and(|r| r <= 0.0),
            day_start,
        }
    }

    /// Get recent records
    pub async fn get_recent_records(&self, limit: usize) -> Vec<UsageRecord> {
        let records = self.records.read().await;
        let start = records.len().saturating_sub(limit);
        records[start..].to_vec()
    }

    /// Get records for a specific route
    pub async fn get_route_records(&self, route_id: uuid::Uuid) -> Vec<UsageRecord> {
        let records = self.records.read().await;
        records
            .iter()
            .filter(|r| r.route_id == Some(route_id))
            .cloned()
            .collect()
    }

    /// Generate a cost report
    pub async fn generate_report(&self, since: Option<DateTime<Utc>>) -> CostReport {
        let stats = self.get_stats(since).await;
        let records = self.get_recent_records(REPORT_RECENT_RECORDS).await;

        let most_expensive_model = stats
            .by_model
            .values()
            .max_by(|a, b| {
                a.total_cost
                    .partial_cmp(&b.total_cost)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.model.clone());

        let most_used_model = stats
            .by_model
            .values()
            .max_by_key(|s| s.request_count)
            .map(|s| s.model.clone());

        let savings_potential = {
            let prices = self.pricing.read().await;
            calculate_savings_potential(&stats, &prices)
        };

        CostReport {
            generated_at: Utc::now(),
            period_start: since,
            stats,
            recent_records: records,
            most_expensive_model,
            most_used_model,
            savings_potential,
        }
    }

    /// Format report as text
    #[must_use]
    pub fn format_report(report: &CostReport) -> String {
        super::report::format_report(report)
    }
}

/// Midnight UTC of the given instant's day
#[must_use]
pub fn start_of_utc_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .unwrap_or_else(|| now - Duration::hours(24))
}
