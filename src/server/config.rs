//! Application configuration structures

use catalyst_core::AnalysisConfig;
use catalyst_llm::{ProviderOverride, RouterConfig};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server
    #[serde(default)]
    pub server: ServerConfig,
    /// Router behaviour
    #[serde(default)]
    pub router: RouterConfig,
    /// Analysis limits
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Overrides for built-in catalog entries, keyed by provider name
    #[serde(default)]
    pub providers: HashMap<String, ProviderOverride>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub cors_permissive: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_permissive: true,
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_true() -> bool {
    true
}
