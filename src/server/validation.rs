//! Configuration validation
//!
//! Hard errors for settings the router cannot run with, plus warnings for
//! risky production deployments.

use super::config::AppConfig;
use super::loader::environment;
use anyhow::{bail, Result};
use tracing::warn;

/// Upper bound on fallback depth
const MAX_FALLBACKS: usize = 10;

/// Reject unusable settings
pub fn validate_config(config: &AppConfig) -> Result<()> {
    let router = &config.router;

    if !(0.0..=1.0).contains(&router.confidence_threshold) {
        bail!(
            "router.confidence_threshold must be between 0 and 1 (got {})",
            router.confidence_threshold
        );
    }
    if router.max_fallbacks > MAX_FALLBACKS {
        bail!(
            "router.max_fallbacks must be <= {} (got {})",
            MAX_FALLBACKS,
            router.max_fallbacks
        );
    }
    if router.retry.max_attempts == 0 {
        bail!("router.retry.max_attempts must be at least 1");
    }
    if router.circuit_breaker.failure_threshold == 0 {
        bail!("router.circuit_breaker.failure_threshold must be at least 1");
    }
    if matches!(router.daily_budget_usd, Some(budget) if budget < 0.0) {
        bail!("router.daily_budget_usd must not be negative");
    }
    if config.analysis.max_turns == 0 || config.analysis.max_chars == 0 {
        bail!("analysis limits must be greater than zero");
    }

    Ok(())
}

/// Validate configuration for production deployments
pub fn validate_production_config(config: &AppConfig) -> Result<()> {
    validate_config(config)?;

    if environment().to_lowercase() != "production" {
        return Ok(());
    }

    if config.server.host == "0.0.0.0" {
        warn!(
            "SECURITY WARNING: Server is binding to all interfaces (0.0.0.0) in production. \
             Consider binding to 127.0.0.1 and using a reverse proxy."
        );
    }

    if config.server.cors_permissive {
        warn!("SECURITY WARNING: Permissive CORS is enabled in production.");
    }

    if config.router.daily_budget_usd.is_none() {
        warn!(
            "No daily LLM budget configured in production. \
             Set [router] daily_budget_usd to cap spending."
        );
    }

    Ok(())
}
