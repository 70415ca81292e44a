//! Provider diagnostics and usage metrics
//!
//! Connectivity probes run concurrently; each result also feeds the
//! provider's health so an unreachable provider shows up in routing.

use crate::cost::{BudgetStatus, UsageStats};
use crate::router::{LlmRouter, ProviderStatus};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Outcome of a connectivity probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    /// Health check succeeded
    Healthy,
    /// Health check failed
    Unhealthy,
    /// Disabled in the catalog; probed when registered, never routed to
    Disabled,
    /// No credentials; not probed
    Unconfigured,
}

/// Probe result for one provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderTestResult {
    /// Provider name
    pub provider: String,
    /// Outcome
    pub status: ProbeStatus,
    /// Probe round trip, when one was made
    pub latency_ms: Option<u64>,
    /// Failure message
    pub error: Option<String>,
}

/// Probe one provider, or every catalog entry when `only` is `None`
///
/// Results follow catalog priority order. An unknown name yields an empty list.
pub async fn test_providers(router: &LlmRouter, only: Option<&str>) -> Vec<ProviderTestResult> {
    let mut entries: Vec<_> = router
        .catalog()
        .providers()
        .iter()
        .filter(|p| only.map_or(true, |name| p.name == name))
        .collect();
    entries.sort_by(|a, b| a.priority.cmp(&b.priority).then(a.name.cmp(&b.name)));

    let probes = entries.into_iter().map(|settings| async move {
        let provider = settings.name.clone();

        if !router.has_provider(&settings.name) {
            if !settings.enabled {
                return ProviderTestResult {
                    provider,
                    status: ProbeStatus::Disabled,
                    latency_ms: None,
                    error: None,
                };
            }
            return ProviderTestResult {
                provider,
                status: ProbeStatus::Unconfigured,
                latency_ms: None,
                error: settings
                    .api_key_env()
                    .map(|var| format!("{} is not set", var)),
            };
        }

        let (status, latency_ms, error) = match router.probe(&settings.name).await {
            Ok(elapsed) => {
                info!(provider = %provider, latency_ms = elapsed.as_millis() as u64, "Provider healthy");
                (ProbeStatus::Healthy, Some(elapsed.as_millis() as u64), None)
            }
            Err(e) => {
                warn!(provider = %provider, error = %e, "Provider health check failed");
                (ProbeStatus::Unhealthy, None, Some(e.to_string()))
            }
        };

        // Disabled entries are checked but never reported as routable
        ProviderTestResult {
            provider,
            status: if settings.enabled {
                status
            } else {
                ProbeStatus::Disabled
            },
            latency_ms,
            error,
        }
    });

    join_all(probes).await
}

/// System-wide usage view for dashboards
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageMetrics {
    /// Start of the aggregation window (`None` = everything retained)
    pub window_start: Option<DateTime<Utc>>,
    /// Aggregated usage
    pub stats: UsageStats,
    /// Per-provider status
    pub providers: Vec<ProviderStatus>,
    /// Daily budget
    pub budget: BudgetStatus,
}

/// Collect usage, provider status and budget in one snapshot
pub async fn get_system_usage_metrics(
    router: &LlmRouter,
    since: Option<DateTime<Utc>>,
) -> UsageMetrics {
    UsageMetrics {
        window_start: since,
        stats: router.cost_tracker().get_stats(since).await,
        providers: router.provider_statuses().await,
        budget: router.budget_status().await,
    }
}
