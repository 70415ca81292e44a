//! Provider transports
//!
//! One transport per wire protocol; catalog entries choose theirs through
//! [`ProviderKind::protocol`](crate::catalog::ProviderKind::protocol).

/// Anthropic Messages API
pub mod anthropic;
/// Shared HTTP plumbing and error mapping
pub mod http;
/// Local Ollama server
pub mod ollama;
/// OpenAI-compatible chat completions
pub mod openai_compat;
/// Scripted provider for tests and demos
pub mod scripted;

pub use anthropic::AnthropicProvider;
pub use http::ProviderConfig;
pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatibleProvider;
pub use scripted::ScriptedProvider;

use crate::catalog::{ProviderCatalog, ProviderSettings, Protocol};
use crate::error::{Error, Result};
use crate::router::{LlmProvider, LlmRouter, RouterConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Build the transport for a catalog entry
///
/// Fails with [`Error::NotConfigured`] when the entry needs an API key that
/// is not set.
pub fn build_provider(settings: &ProviderSettings) -> Result<Arc<dyn LlmProvider>> {
    let config = ProviderConfig::from_settings(settings)?;
    Ok(match settings.kind.protocol() {
        Protocol::OpenAiCompatible => Arc::new(OpenAiCompatibleProvider::new(config)?),
        Protocol::Anthropic => Arc::new(AnthropicProvider::new(config)?),
        Protocol::Ollama => Arc::new(OllamaProvider::new(config)?),
    })
}

/// Build a router and register a transport for every configured entry
///
/// Entries without credentials stay in the catalog unregistered; the plan
/// reports them as not configured. Disabled entries are still registered: the
/// plan never routes to them, but `test_providers` health-checks them.
pub fn build_router(catalog: ProviderCatalog, config: RouterConfig) -> Result<LlmRouter> {
    catalog.validate()?;

    let mut providers = Vec::new();
    for settings in catalog.providers() {
        match build_provider(settings) {
            Ok(provider) => {
                info!(
                    provider = %settings.name,
                    kind = %settings.kind,
                    enabled = settings.enabled,
                    "Provider configured"
                );
                providers.push(provider);
            }
            Err(Error::NotConfigured(reason)) => {
                info!(provider = %settings.name, "Provider not configured: {}", reason);
            }
            Err(e) => return Err(e),
        }
    }

    let mut router = LlmRouter::new(catalog, config);
    for provider in providers {
        router.register(provider)?;
    }

    if router.list_providers().is_empty() {
        warn!("No LLM provider has credentials; every route will fail until one is configured");
    }
    Ok(router)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ModelSpec, ProviderKind};
    use crate::router::ModelTier;

    fn local_catalog() -> ProviderCatalog {
        ProviderCatalog::new(vec![
            ProviderSettings::new(
                "local",
                ProviderKind::Ollama,
                1,
                ModelSpec::new("llama3.1:8b", ModelTier::Fast, 0.0, 0.0, 128_000),
            ),
            ProviderSettings::new(
                "paid",
                ProviderKind::Mistral,
                2,
                ModelSpec::new("mistral-small-latest", ModelTier::Fast, 0.2, 0.6, 32_000),
            )
            .with_api_key_env("CATALYST_TEST_NEVER_SET_MISTRAL"),
        ])
    }

    #[test]
    fn test_build_provider_by_protocol() {
        let catalog = local_catalog();
        let provider = build_provider(catalog.get("local").unwrap()).unwrap();
        assert_eq!(provider.kind(), ProviderKind::Ollama);
        assert_eq!(provider.name(), "local");

        assert!(matches!(
            build_provider(catalog.get("paid").unwrap()),
            Err(Error::NotConfigured(_))
        ));
    }

    #[test]
    fn test_build_router_skips_unconfigured() {
        let router = build_router(local_catalog(), RouterConfig::default()).unwrap();
        assert_eq!(router.list_providers(), vec!["local"]);
        assert!(!router.has_provider("paid"));
        assert_eq!(router.catalog().len(), 2);
    }
}
