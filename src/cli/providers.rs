//! `catalyst providers` commands

use anyhow::Result;
use catalyst_llm::{test_providers, ProbeStatus};

/// Print every catalog entry with its routing state
pub async fn list() -> Result<()> {
    let (_, router) = crate::server::init_from_env()?;

    println!("🔌 Catalyst providers\n");
    println!(
        "{:<12} {:<4} {:<8} {:<11} {:<10} {:<30}",
        "NAME", "PRI", "ENABLED", "CONFIGURED", "CIRCUIT", "DEFAULT MODEL"
    );

    for status in router.provider_statuses().await {
        println!(
            "{:<12} {:<4} {:<8} {:<11} {:<10} {:<30}",
            status.name,
            status.priority,
            if status.enabled { "yes" } else { "no" },
            if status.configured { "yes" } else { "no" },
            format!("{:?}", status.circuit).to_lowercase(),
            status.default_model,
        );
    }

    Ok(())
}

/// Probe providers and print the results
pub async fn test(name: Option<&str>) -> Result<()> {
    let (_, router) = crate::server::init_from_env()?;

    println!("🏥 Testing providers...\n");
    let results = test_providers(&router, name).await;
    if results.is_empty() {
        anyhow::bail!("unknown provider: {}", name.unwrap_or_default());
    }

    let mut healthy = 0;
    for result in &results {
        let line = match result.status {
            ProbeStatus::Healthy => {
                healthy += 1;
                format!("✅ healthy ({}ms)", result.latency_ms.unwrap_or_default())
            }
            ProbeStatus::Unhealthy => format!(
                "❌ unhealthy: {}",
                result.error.as_deref().unwrap_or("unknown error")
            ),
            ProbeStatus::Disabled => match (result.latency_ms, result.error.as_deref()) {
                (Some(ms), _) => format!("⏸️  disabled (reachable, {}ms)", ms),
                (None, Some(error)) => format!("⏸️  disabled (unreachable: {})", error),
                (None, None) => "⏸️  disabled".to_string(),
            },
            ProbeStatus::Unconfigured => format!(
                "⚠️  not configured: {}",
                result.error.as_deref().unwrap_or("missing credentials")
            ),
        };
        println!("{:<12} {}", result.provider, line);
    }

    println!();
    if healthy == 0 {
        println!("⚠️  No healthy provider. Set an API key in .env and try again.");
    } else {
        println!("✅ {} of {} providers healthy.", healthy, results.len());
    }
    Ok(())
}
