//! Cost Reporting
//!
//! Reports aggregate usage and point out models that a cheaper catalog model
//! of the same tier could replace.

use super::pricing::{pricing_key, ModelPricing};
use super::record::{ModelStats, UsageRecord, UsageStats};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cost report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostReport {
    /// When report was generated
    pub generated_at: DateTime<Utc>,
    /// Start of reporting period
    pub period_start: Option<DateTime<Utc>>,
    /// Usage statistics
    pub stats: UsageStats,
    /// Recent records
    pub recent_records: Vec<UsageRecord>,
    /// Most expensive model
    pub most_expensive_model: Option<String>,
    /// Most used model
    pub most_used_model: Option<String>,
    /// Savings potential
    pub savings_potential: Option<SavingsPotential>,
}

/// Potential cost savings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsPotential {
    /// Estimated savings in USD
    pub estimated_savings: f64,
    /// Recommendations
    pub recommendations: Vec<String>,
}

/// Minimum cost threshold for savings recommendation (USD)
pub const MIN_SAVINGS_THRESHOLD: f64 = 0.01;

/// Assumed share of a model's traffic that could move to a cheaper model
pub const CANDIDATE_RATIO: f64 = 0.3;

/// Cheapest priced model of the same tier as `current`, if strictly cheaper
fn cheaper_alternative<'a>(
    current: &ModelPricing,
    prices: &'a HashMap<String, ModelPricing>,
) -> Option<&'a ModelPricing> {
    prices
        .values()
        .filter(|p| p.tier == current.tier)
        .filter(|p| p.blended_cost_per_million() < current.blended_cost_per_million())
        .min_by(|a, b| {
            a.blended_cost_per_million()
                .partial_cmp(&b.blended_cost_per_million())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
}

/// Savings from moving part of one model's traffic to a cheaper same-tier model
pub fn calculate_model_savings(
    model_stats: &ModelStats,
    prices: &HashMap<String, ModelPricing>,
) -> Option<(f64, String)> {
    let current = prices.get(&pricing_key(&model_stats.provider, &model_stats.model))?;
    let alternative = cheaper_alternative(current, prices)?;

    let input = model_stats.input_tokens as f64 / 1_000_000.0;
    let output = model_stats.output_tokens as f64 / 1_000_000.0;
    let cost_with = |p: &ModelPricing| {
        input * p.input_cost_per_million + output * p.output_cost_per_million
    };
    let savings = (cost_with(current) - cost_with(alternative)) * CANDIDATE_RATIO;

    (savings > MIN_SAVINGS_THRESHOLD).then(|| {
        (
            savings,
            format!(
                "Consider {} ({}) instead of {} for {} tasks (est. ${:.2} savings)",
                alternative.model, alternative.provider, current.model, current.tier, savings
            ),
        )
    })
}

/// Calculate savings potential from usage stats
pub fn calculate_savings_potential(
    stats: &UsageStats,
    prices: &HashMap<String, ModelPricing>,
) -> Option<SavingsPotential> {
    let mut potential_savings = 0.0;
    let mut recommendations = Vec::new();

    for model_stats in stats.by_model.values() {
        if let Some((savings, recommendation)) = calculate_model_savings(model_stats, prices) {
            potential_savings += savings;
            recommendations.push(recommendation);
        }
    }

    if potential_savings > MIN_SAVINGS_THRESHOLD {
        recommendations.sort();
        Some(SavingsPotential {
            estimated_savings: potential_savings,
            recommendations,
        })
    } else {
        None
    }
}

/// Format report as text
#[must_use]
pub fn format_report(report: &CostReport) -> String {
    let mut output = String::new();

    output.push_str("LLM Cost Report\n\n");
    output.push_str(&format!(
        "Generated: {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    if let Some(start) = report.period_start {
        output.push_str(&format!(
            "Period: {} to now\n",
            start.format("%Y-%m-%d %H:%M UTC")
        ));
    }

    output.push_str("\nSummary:\n");
    output.push_str(&format!(
        "  Total Requests: {} ({} success, {} failed, {} via fallback)\n",
        report.stats.total_requests,
        report.stats.successful_requests,
        report.stats.failed_requests,
        report.stats.fallback_requests
    ));
    output.push_str(&format!(
        "  Total Tokens: {} input, {} output\n",
        report.stats.total_input_tokens, report.stats.total_output_tokens
    ));
    output.push_str(&format!("  Total Cost: ${:.4}\n", report.stats.total_cost));
    output.push_str(&format!(
        "  Avg Latency: {:.0}ms\n",
        report.stats.avg_latency_ms
    ));

    if let Some(model) = &report.most_used_model {
        output.push_str(&format!("  Most Used Model: {}\n", model));
    }

    if let Some(model) = &report.most_expensive_model {
        output.push_str(&format!("  Most Expensive Model: {}\n", model));
    }

    let mut providers: Vec<_> = report.stats.by_provider.values().collect();
    providers.sort_by(|a, b| a.provider.cmp(&b.provider));
    output.push_str("\nBy Provider:\n");
    for stats in providers {
        output.push_str(&format!(
            "  {}: {} requests ({} failed), ${:.4}\n",
            stats.provider, stats.request_count, stats.failure_count, stats.total_cost
        ));
    }

    let mut models: Vec<_> = report.stats.by_model.values().collect();
    models.sort_by(|a, b| (&a.provider, &a.model).cmp(&(&b.provider, &b.model)));
    output.push_str("\nBy Model:\n");
    for stats in models {
        output.push_str(&format!(
            "  {}/{}: {} requests, {} tokens, ${:.4}\n",
            stats.provider,
            stats.model,
            stats.request_count,
            stats.input_tokens + stats.output_tokens,
            stats.total_cost
        ));
    }

    if let Some(savings) = &report.savings_potential {
        output.push_str(&format!(
            "\nPotential Savings: ${:.2}\n",
            savings.estimated_savings
        ));
        for rec in &savings.recommendations {
            output.push_str(&format!("  {}\n", rec));
        }
    }

    output
}
