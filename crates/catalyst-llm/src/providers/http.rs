//! Shared HTTP plumbing for provider transports
//!
//! Status codes and transport failures are mapped onto the crate error
//! taxonomy here so every provider classifies failures the same way.

use crate::catalog::{ProviderKind, ProviderSettings};
use crate::error::{Error, Result};
use crate::util::{mask_api_key, sanitize_api_error};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Connection settings for one provider transport
#[derive(Clone)]
pub struct ProviderConfig {
    /// Provider name (catalog entry)
    pub name: String,
    /// Provider family
    pub kind: ProviderKind,
    /// API base URL without trailing slash
    pub base_url: String,
    /// API key, when the provider needs one
    pub api_key: Option<String>,
    /// Default model
    pub default_model: String,
    /// Models served
    pub models: Vec<String>,
    /// Request timeout
    pub timeout: Duration,
}

// SECURITY: Custom Debug implementation to mask API key
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("api_key", &self.api_key.as_deref().map(mask_api_key))
            .field("base_url", &self.base_url)
            .field("default_model", &self.default_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    /// Build from a catalog entry, reading the API key from the environment
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        let api_key = settings.resolve_api_key();
        if settings.kind.requires_api_key() && api_key.is_none() {
            return Err(Error::NotConfigured(format!(
                "{} ({} not set)",
                settings.name,
                settings.api_key_env().unwrap_or("API key")
            )));
        }

        Ok(Self {
            name: settings.name.clone(),
            kind: settings.kind,
            base_url: settings.base_url().trim_end_matches('/').to_string(),
            api_key,
            default_model: settings.default_model.clone(),
            models: settings.models.iter().map(|m| m.name.clone()).collect(),
            timeout: settings.timeout(),
        })
    }

    /// Set the API key
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub(crate) fn api_key(&self) -> &str {
        self.api_key.as_deref().unwrap_or_default()
    }

    pub(crate) fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }

    pub(crate) fn model_or_default<'a>(&'a self, requested: &'a str) -> &'a str {
        if requested.is_empty() {
            &self.default_model
        } else {
            requested
        }
    }
}

/// Build the HTTP client for a provider
pub(crate) fn build_client(config: &ProviderConfig) -> Result<Client> {
    Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| Error::Config(format!("{}: failed to create HTTP client: {}", config.name, e)))
}

/// Send a request and decode a JSON body, mapping failures to crate errors
pub(crate) async fn send_json<T: DeserializeOwned>(
    config: &ProviderConfig,
    request: RequestBuilder,
) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(config, &e))?;

    let status = response.status();
    let retry_after = parse_retry_after(response.headers());
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(config, &e))?;

    if !status.is_success() {
        tracing::warn!(provider = %config.name, status = %status, "Provider returned error status");
        return Err(status_error(&config.name, status, retry_after, &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| Error::InvalidResponse(format!("{}: {}", config.name, e)))
}

/// Send a request and only check the status
pub(crate) async fn send_probe(config: &ProviderConfig, request: RequestBuilder) -> Result<()> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(config, &e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let retry_after = parse_retry_after(response.headers());
    let body = response.text().await.unwrap_or_default();
    Err(status_error(&config.name, status, retry_after, &body))
}

/// Map a reqwest failure
pub(crate) fn transport_error(config: &ProviderConfig, error: &reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::Timeout(config.timeout_ms())
    } else if error.is_decode() {
        Error::InvalidResponse(format!("{}: {}", config.name, error))
    } else {
        Error::Network(sanitize_api_error(&config.name, &error.to_string()))
    }
}

/// Parse a `retry-after` header given in seconds
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    value
        .parse::<f64>()
        .ok()
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(Duration::from_secs_f64)
}

/// Pull a human-readable message out of a provider error body
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };

    let nested = value
        .get("error")
        .and_then(|e| e.get("message").or(Some(e)))
        .and_then(Value::as_str);
    nested
        .or_else(|| value.get("message").and_then(Value::as_str))
        .or_else(|| value.get("detail").and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

fn is_context_length_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    ["context length", "context_length", "maximum context", "context window", "too many tokens"]
        .iter()
        .any(|p| lower.contains(p))
}

/// Map an HTTP error status onto the error taxonomy
pub(crate) fn status_error(
    provider: &str,
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &str,
) -> Error {
    let message = sanitize_api_error(provider, &error_message(body));
    let message = if message.is_empty() {
        format!("HTTP {}", status)
    } else {
        message
    };

    match status.as_u16() {
        429 => Error::RateLimit { retry_after },
        401 | 403 => Error::Auth(format!("{} rejected the request credentials", provider)),
        400 | 404 | 413 | 422 if is_context_length_message(&message) => {
            Error::ContextLength(message)
        }
        400 | 422 => Error::InvalidRequest(message),
        404 => Error::ModelNotFound(message),
        _ => Error::Api(format!("{} (HTTP {})", message, status.as_u16())),
    }
}
