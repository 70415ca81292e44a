//! Provider catalog
//!
//! The catalog is the routing table: which providers exist, in what order
//! they are preferred, which models they serve at which tier and price, and
//! how many requests per minute they accept. The router plans from it and the
//! cost tracker prices from it.

use crate::error::{Error, Result};
use crate::router::{ModelTier, TaskType};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;

/// Default request timeout for remote providers (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

// ============================================================================
// Provider kind
// ============================================================================

/// Wire protocol spoken by a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// `POST {base}/chat/completions`
    OpenAiCompatible,
    /// `POST {base}/v1/messages`
    Anthropic,
    /// `POST {base}/api/chat`
    Ollama,
}

/// Supported provider families
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI
    OpenAi,
    /// Anthropic
    Anthropic,
    /// Mistral AI
    Mistral,
    /// Groq
    Groq,
    /// HuggingFace inference router
    HuggingFace,
    /// OpenRouter gateway
    OpenRouter,
    /// Local Ollama server
    Ollama,
}

impl ProviderKind {
    /// All provider kinds
    pub const ALL: [ProviderKind; 7] = [
        Self::OpenAi,
        Self::Anthropic,
        Self::Mistral,
        Self::Groq,
        Self::HuggingFace,
        Self::OpenRouter,
        Self::Ollama,
    ];

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Mistral => "mistral",
            Self::Groq => "groq",
            Self::HuggingFace => "huggingface",
            Self::OpenRouter => "openrouter",
            Self::Ollama => "ollama",
        }
    }

    /// Wire protocol
    #[must_use]
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Anthropic => Protocol::Anthropic,
            Self::Ollama => Protocol::Ollama,
            _ => Protocol::OpenAiCompatible,
        }
    }

    /// Default API base URL
    #[must_use]
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com",
            Self::Mistral => "https://api.mistral.ai/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::HuggingFace => "https://router.huggingface.co/v1",
            Self::OpenRouter => "https://openrouter.ai/api/v1",
            Self::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable holding the API key
    #[must_use]
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Anthropic => Some("ANTHROPIC_API_KEY"),
            Self::Mistral => Some("MISTRAL_API_KEY"),
            Self::Groq => Some("GROQ_API_KEY"),
            Self::HuggingFace => Some("HUGGINGFACE_API_KEY"),
            Self::OpenRouter => Some("OPENROUTER_API_KEY"),
            Self::Ollama => None,
        }
    }

    /// Whether requests need an API key
    #[must_use]
    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Models and limits
// ============================================================================

/// A model served by a provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Model name as the provider expects it
    pub name: String,
    /// Capability tier
    pub tier: ModelTier,
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
    /// Context window size
    pub context_window: u32,
}

impl ModelSpec {
    /// Create a model spec
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        tier: ModelTier,
        input_cost_per_million: f64,
        output_cost_per_million: f64,
        context_window: u32,
    ) -> Self {
        Self {
            name: name.into(),
            tier,
            input_cost_per_million,
            output_cost_per_million,
            context_window,
        }
    }

    /// Calculate cost for given token counts
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million;
        input_cost + output_cost
    }

    fn blended_cost(&self) -> f64 {
        self.input_cost_per_million + self.output_cost_per_million
    }
}

/// Provider-declared rate limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSpec {
    /// Requests accepted per minute
    pub requests_per_minute: u32,
}

impl Default for RateLimitSpec {
    fn default() -> Self {
        Self {
            requests_per_minute: 60,
        }
    }
}

// ============================================================================
// Provider settings
// ============================================================================

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Unique provider name used in routing and logs
    pub name: String,
    /// Provider family
    pub kind: ProviderKind,
    /// Whether the provider takes part in routing
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Lower is preferred
    pub priority: u32,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<String>,
    /// API key environment variable override
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Model used when no tier-specific choice applies
    pub default_model: String,
    /// Models served
    pub models: Vec<ModelSpec>,
    /// Rate limits
    #[serde(default)]
    pub rate_limit: RateLimitSpec,
    /// Request timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Tasks this provider serves (empty = all)
    #[serde(default)]
    pub tasks: Vec<TaskType>,
}

impl ProviderSettings {
    /// Create settings with a single model
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ProviderKind, priority: u32, model: ModelSpec) -> Self {
        Self {
            name: name.into(),
            kind,
            enabled: true,
            priority,
            base_url: None,
            api_key_env: None,
            default_model: model.name.clone(),
            models: vec![model],
            rate_limit: RateLimitSpec::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            tasks: Vec::new(),
        }
    }

    /// Add a model
    #[must_use]
    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.models.push(model);
        self
    }

    /// Set the default model
    #[must_use]
    pub fn with_default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Set requests per minute
    #[must_use]
    pub fn with_requests_per_minute(mut self, rpm: u32) -> Self {
        self.rate_limit.requests_per_minute = rpm;
        self
    }

    /// Set timeout
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Restrict to the given tasks
    #[must_use]
    pub fn with_tasks(mut self, tasks: Vec<TaskType>) -> Self {
        self.tasks = tasks;
        self
    }

    /// Enable or disable
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Override the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the API key environment variable
    #[must_use]
    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key_env = Some(var.into());
        self
    }

    /// Effective base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.kind.default_base_url())
    }

    /// Effective API key environment variable
    #[must_use]
    pub fn api_key_env(&self) -> Option<&str> {
        self.api_key_env.as_deref().or(self.kind.api_key_env())
    }

    /// Read the API key from the environment (empty values count as missing)
    #[must_use]
    pub fn resolve_api_key(&self) -> Option<String> {
        let var = self.api_key_env()?;
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }

    /// Whether the provider has everything it needs to be called
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.kind.requires_api_key() || self.resolve_api_key().is_some()
    }

    /// Whether the provider serves a task
    #[must_use]
    pub fn supports_task(&self, task: TaskType) -> bool {
        self.tasks.is_empty() || self.tasks.contains(&task)
    }

    /// Request timeout
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Look up a model by name
    #[must_use]
    pub fn model(&self, name: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|m| m.name == name)
    }

    /// Pick a model for a tier
    ///
    /// Exact tier first, then the most capable model below it, then the
    /// cheapest model above it, then the default model.
    #[must_use]
    pub fn model_for_tier(&self, tier: ModelTier) -> Option<&ModelSpec> {
        let target = tier.level();

        if let Some(exact) = self.models.iter().find(|m| m.tier == tier) {
            return Some(exact);
        }

        let below = self
            .models
            .iter()
            .filter(|m| m.tier.level() < target)
            .max_by_key(|m| m.tier.level());
        if below.is_some() {
            return below;
        }

        let above = self
            .models
            .iter()
            .filter(|m| m.tier.level() > target)
            .min_by(|a, b| {
                a.tier.level().cmp(&b.tier.level()).then(
                    a.blended_cost()
                        .partial_cmp(&b.blended_cost())
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
            });
        above.or_else(|| self.model(&self.default_model))
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config("provider name must not be empty".into()));
        }
        if self.models.is_empty() {
            return Err(Error::Config(format!("{}: no models configured", self.name)));
        }
        if self.model(&self.default_model).is_none() {
            return Err(Error::Config(format!(
                "{}: default model '{}' is not in the model list",
                self.name, self.default_model
            )));
        }
        if self.rate_limit.requests_per_minute == 0 {
            return Err(Error::Config(format!(
                "{}: requests_per_minute must be greater than zero",
                self.name
            )));
        }
        if self.timeout_ms == 0 {
            return Err(Error::Config(format!(
                "{}: timeout_ms must be greater than zero",
                self.name
            )));
        }
        if let Some(model) = self
            .models
            .iter()
            .find(|m| m.input_cost_per_million < 0.0 || m.output_cost_per_million < 0.0)
        {
            return Err(Error::Config(format!(
                "{}: model '{}' has a negative price",
                self.name, model.name
            )));
        }
        Ok(())
    }
}

/// Partial settings applied on top of a catalog entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderOverride {
    /// Enable or disable
    pub enabled: Option<bool>,
    /// Priority (lower is preferred)
    pub priority: Option<u32>,
    /// Base URL
    pub base_url: Option<String>,
    /// API key environment variable
    pub api_key_env: Option<String>,
    /// Default model (must be in the model list)
    pub default_model: Option<String>,
    /// Requests per minute
    pub requests_per_minute: Option<u32>,
    /// Timeout in milliseconds
    pub timeout_ms: Option<u64>,
    /// Tasks served
    pub tasks: Option<Vec<TaskType>>,
}

// ============================================================================
// Catalog
// ============================================================================

/// The provider table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderCatalog {
    providers: Vec<ProviderSettings>,
}

impl ProviderCatalog {
    /// Create a catalog from entries
    #[must_use]
    pub fn new(providers: Vec<ProviderSettings>) -> Self {
        Self { providers }
    }

    /// Create an empty catalog
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Add an entry
    pub fn push(&mut self, settings: ProviderSettings) {
        self.providers.push(settings);
    }

    /// All entries
    #[must_use]
    pub fn providers(&self) -> &[ProviderSettings] {
        &self.providers
    }

    /// Look up an entry by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the catalog has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Find a model by name across providers
    #[must_use]
    pub fn find_model(&self, model: &str) -> Option<(&ProviderSettings, &ModelSpec)> {
        self.providers
            .iter()
            .find_map(|p| p.model(model).map(|m| (p, m)))
    }

    /// Apply configuration overrides keyed by provider name
    ///
    /// Nothing is applied when any name is unknown.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, ProviderOverride>) -> Result<()> {
        let mut unknown: Vec<&str> = overrides
            .keys()
            .filter(|name| self.get(name).is_none())
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(Error::Config(format!(
                "unknown provider in overrides: {}",
                unknown.join(", ")
            )));
        }

        for (name, ov) in overrides {
            let entry = self
                .providers
                .iter_mut()
                .find(|p| p.name == *name)
                .ok_or_else(|| Error::Config(format!("unknown provider in overrides: {}", name)))?;

            if let Some(enabled) = ov.enabled {
                entry.enabled = enabled;
            }
            if let Some(priority) = ov.priority {
                entry.priority = priority;
            }
            if let Some(base_url) = &ov.base_url {
                entry.base_url = Some(base_url.clone());
            }
            if let Some(var) = &ov.api_key_env {
                entry.api_key_env = Some(var.clone());
            }
            if let Some(model) = &ov.default_model {
                entry.default_model = model.clone();
            }
            if let Some(rpm) = ov.requests_per_minute {
                entry.rate_limit.requests_per_minute = rpm;
            }
            if let Some(timeout_ms) = ov.timeout_ms {
                entry.timeout_ms = timeout_ms;
            }
            if let Some(tasks) = &ov.tasks {
                entry.tasks = tasks.clone();
            }
        }
        Ok(())
    }

    /// Check the catalog for configuration mistakes
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for provider in &self.providers {
            if !seen.insert(provider.name.as_str()) {
                return Err(Error::Config(format!(
                    "duplicate provider name: {}",
                    provider.name
                )));
            }
            provider.validate()?;
        }
        Ok(())
    }
}

impl Default for ProviderCatalog {
    /// Built-in catalog with one entry per provider kind
    fn default() -> Self {
        use ModelTier::{Fast, Premium, Standard, UltraBudget};

        Self::new(vec![
            ProviderSettings::new(
                "openai",
                ProviderKind::OpenAi,
                1,
                ModelSpec::new("gpt-4.1-nano", UltraBudget, 0.10, 0.40, 1_047_576),
            )
            .with_model(ModelSpec::new("gpt-4o-mini", Fast, 0.15, 0.60, 128_000))
            .with_model(ModelSpec::new("gpt-4o", Standard, 2.50, 10.00, 128_000))
            .with_model(ModelSpec::new("o1", Premium, 15.00, 60.00, 200_000))
            .with_default_model("gpt-4o-mini")
            .with_requests_per_minute(500),
            ProviderSettings::new(
                "anthropic",
                ProviderKind::Anthropic,
                2,
                ModelSpec::new("claude-3-5-haiku-latest", Fast, 0.80, 4.00, 200_000),
            )
            .with_model(ModelSpec::new(
                "claude-sonnet-4-20250514",
                Standard,
                3.00,
                15.00,
                200_000,
            ))
            .with_model(ModelSpec::new(
                "claude-opus-4-20250514",
                Premium,
                15.00,
                75.00,
                200_000,
            ))
            .with_requests_per_minute(50),
            ProviderSettings::new(
                "mistral",
                ProviderKind::Mistral,
                3,
                ModelSpec::new("mistral-small-latest", Fast, 0.20, 0.60, 32_000),
            )
            .with_model(ModelSpec::new(
                "mistral-medium-latest",
                Standard,
                0.40,
                2.00,
                128_000,
            ))
            .with_model(ModelSpec::new(
                "mistral-large-latest",
                Premium,
                2.00,
                6.00,
                128_000,
            )),
            ProviderSettings::new(
                "groq",
                ProviderKind::Groq,
                4,
                ModelSpec::new("llama-3.1-8b-instant", UltraBudget, 0.05, 0.08, 131_072),
            )
            .with_model(ModelSpec::new(
                "llama-3.3-70b-versatile",
                Standard,
                0.59,
                0.79,
                131_072,
            ))
            .with_default_model("llama-3.3-70b-versatile")
            .with_requests_per_minute(30)
            .with_timeout_ms(20_000),
            ProviderSettings::new(
                "openrouter",
                ProviderKind::OpenRouter,
                5,
                ModelSpec::new(
                    "meta-llama/llama-3.1-8b-instruct",
                    UltraBudget,
                    0.02,
                    0.05,
                    131_072,
                ),
            )
            .with_model(ModelSpec::new("openai/gpt-4o-mini", Fast, 0.15, 0.60, 128_000))
            .with_model(ModelSpec::new(
                "anthropic/claude-sonnet-4",
                Standard,
                3.00,
                15.00,
                200_000,
            ))
            .with_default_model("openai/gpt-4o-mini"),
            ProviderSettings::new(
                "huggingface",
                ProviderKind::HuggingFace,
                6,
                ModelSpec::new(
                    "meta-llama/Llama-3.1-8B-Instruct",
                    Fast,
                    0.10,
                    0.10,
                    131_072,
                ),
            )
            .with_model(ModelSpec::new(
                "meta-llama/Llama-3.3-70B-Instruct",
                Standard,
                0.60,
                0.60,
                131_072,
            ))
            .with_requests_per_minute(30),
            // Local server, opt-in
            ProviderSettings::new(
                "ollama",
                ProviderKind::Ollama,
                10,
                ModelSpec::new("llama3.1:8b", Fast, 0.0, 0.0, 8_192),
            )
            .with_requests_per_minute(120)
            .with_timeout_ms(60_000)
            .with_enabled(false),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = ProviderCatalog::default();
        assert_eq!(catalog.len(), ProviderKind::ALL.len());
        catalog.validate().unwrap();

        for kind in ProviderKind::ALL {
            assert!(
                catalog.providers().iter().any(|p| p.kind == kind),
                "missing {}",
                kind
            );
        }
    }

    #[test]
    fn test_kind_wire_details() {
        assert_eq!(ProviderKind::Groq.protocol(), Protocol::OpenAiCompatible);
        assert_eq!(ProviderKind::Anthropic.protocol(), Protocol::Anthropic);
        assert_eq!(ProviderKind::Ollama.protocol(), Protocol::Ollama);
        assert_eq!(ProviderKind::Mistral.api_key_env(), Some("MISTRAL_API_KEY"));
        assert!(!ProviderKind::Ollama.requires_api_key());
        assert_eq!(
            ProviderKind::OpenRouter.default_base_url(),
            "https://openrouter.ai/api/v1"
        );
    }

    #[test]
    fn test_kind_serde_names() {
        let kind: ProviderKind = serde_json::from_str("\"huggingface\"").unwrap();
        assert_eq!(kind, ProviderKind::HuggingFace);
        assert_eq!(serde_json::to_string(&ProviderKind::OpenAi).unwrap(), "\"openai\"");
    }

    #[test]
    fn test_model_for_tier_exact_and_fallbacks() {
        let catalog = ProviderCatalog::default();

        let openai = catalog.get("openai").unwrap();
        assert_eq!(openai.model_for_tier(ModelTier::Fast).unwrap().name, "gpt-4o-mini");
        assert_eq!(openai.model_for_tier(ModelTier::Premium).unwrap().name, "o1");

        // No Fast model: most capable below is UltraBudget
        let groq = catalog.get("groq").unwrap();
        assert_eq!(
            groq.model_for_tier(ModelTier::Fast).unwrap().name,
            "llama-3.1-8b-instant"
        );
        // No Premium model: most capable below is Standard
        assert_eq!(
            groq.model_for_tier(ModelTier::Premium).unwrap().name,
            "llama-3.3-70b-versatile"
        );

        // Nothing below UltraBudget: cheapest above
        let anthropic = catalog.get("anthropic").unwrap();
        assert_eq!(
            anthropic.model_for_tier(ModelTier::UltraBudget).unwrap().name,
            "claude-3-5-haiku-latest"
        );
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let entry = ProviderSettings::new(
            "a",
            ProviderKind::OpenAi,
            1,
            ModelSpec::new("m", ModelTier::Fast, 0.1, 0.1, 1000),
        );
        let catalog = ProviderCatalog::new(vec![entry.clone(), entry]);
        assert!(matches!(catalog.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let base = ProviderSettings::new(
            "a",
            ProviderKind::OpenAi,
            1,
            ModelSpec::new("m", ModelTier::Fast, 0.1, 0.1, 1000),
        );

        let unknown_default = base.clone().with_default_model("other");
        assert!(ProviderCatalog::new(vec![unknown_default]).validate().is_err());

        let zero_rpm = base.clone().with_requests_per_minute(0);
        assert!(ProviderCatalog::new(vec![zero_rpm]).validate().is_err());

        let mut negative = base.clone();
        negative.models[0].input_cost_per_million = -1.0;
        assert!(ProviderCatalog::new(vec![negative]).validate().is_err());

        let mut no_models = base;
        no_models.models.clear();
        assert!(ProviderCatalog::new(vec![no_models]).validate().is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut catalog = ProviderCatalog::default();
        let mut overrides = HashMap::new();
        overrides.insert(
            "groq".to_string(),
            ProviderOverride {
                enabled: Some(false),
                priority: Some(1),
                requests_per_minute: Some(5),
                tasks: Some(vec![TaskType::Classification]),
                ..Default::default()
            },
        );
        catalog.apply_overrides(&overrides).unwrap();

        let groq = catalog.get("groq").unwrap();
        assert!(!groq.enabled);
        assert_eq!(groq.priority, 1);
        assert_eq!(groq.rate_limit.requests_per_minute, 5);
        assert!(groq.supports_task(TaskType::Classification));
        assert!(!groq.supports_task(TaskType::Summarization));

        overrides.insert("nope".to_string(), ProviderOverride::default());
        assert!(catalog.apply_overrides(&overrides).is_err());
    }

    #[test]
    fn test_unknown_override_leaves_catalog_untouched() {
        let mut catalog = ProviderCatalog::default();
        let before = catalog.get("groq").unwrap().clone();

        let mut overrides = HashMap::new();
        overrides.insert(
            "groq".to_string(),
            ProviderOverride {
                enabled: Some(false),
                priority: Some(9),
                ..Default::default()
            },
        );
        overrides.insert("nope".to_string(), ProviderOverride::default());

        let err = catalog.apply_overrides(&overrides).unwrap_err();
        assert!(err.to_string().contains("nope"));

        let groq = catalog.get("groq").unwrap();
        assert_eq!(groq.enabled, before.enabled);
        assert_eq!(groq.priority, before.priority);
    }

    #[test]
    fn test_cost_calculation() {
        let model = ModelSpec::new("m", ModelTier::Standard, 10.0, 20.0, 128_000);
        assert!((model.calculate_cost(1_000_000, 1_000_000) - 30.0).abs() < 1e-9);
        assert!((model.calculate_cost(1_000, 1_000) - 0.03).abs() < 1e-9);
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let catalog = ProviderCatalog::default();
        let ollama = catalog.get("ollama").unwrap();
        assert!(ollama.is_configured());
        assert!(!ollama.enabled);
    }
}
