//! Server initialization and main run loop

use super::config::AppConfig;
use super::loader::load_config;
use super::validation::validate_production_config;
use anyhow::{Context, Result};
use catalyst_core::AnalysisService;
use catalyst_llm::{build_router, LlmRouter, ProviderCatalog};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Build the shared router from the built-in catalog plus configured overrides
pub fn init_router(config: &AppConfig) -> Result<Arc<LlmRouter>> {
    let mut catalog = ProviderCatalog::default();
    catalog
        .apply_overrides(&config.providers)
        .context("Invalid provider overrides")?;

    let router =
        build_router(catalog, config.router.clone()).context("Failed to build LLM router")?;
    info!(
        strategy = %config.router.strategy,
        max_fallbacks = config.router.max_fallbacks,
        registered = router.list_providers().len(),
        "LLM router initialized"
    );
    Ok(Arc::new(router))
}

/// Load and validate configuration, then build the router
pub fn init_from_env() -> Result<(AppConfig, Arc<LlmRouter>)> {
    let config = load_config().context("Failed to load configuration")?;
    validate_production_config(&config)?;
    let router = init_router(&config)?;
    Ok((config, router))
}

/// Run the server
pub async fn run() -> Result<()> {
    info!("Starting Catalyst v{}", env!("CARGO_PKG_VERSION"));

    let (config, router) = init_from_env()?;
    let analysis = AnalysisService::with_config(router.clone(), config.analysis.clone());

    let app = crate::api::app(router, analysis).layer(TraceLayer::new_for_http());
    let app = if config.server.cors_permissive {
        app.layer(CorsLayer::permissive())
    } else {
        app
    };

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Catalyst shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_router_applies_overrides() {
        let mut config = AppConfig::default();
        config.providers.insert(
            "groq".to_string(),
            catalyst_llm::ProviderOverride {
                priority: Some(0),
                ..Default::default()
            },
        );

        let router = init_router(&config).unwrap();
        assert_eq!(router.catalog().get("groq").unwrap().priority, 0);
    }

    #[test]
    fn test_init_router_rejects_unknown_override() {
        let mut config = AppConfig::default();
        config
            .providers
            .insert("nope".to_string(), Default::default());

        assert!(init_router(&config).is_err());
    }
}
