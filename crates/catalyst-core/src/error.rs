//! Error types for catalyst-core
//!
//! This module provides error types and user-friendly error formatting.

use thiserror::Error;

/// Core error type
#[derive(Debug, Error)]
pub enum Error {
    /// Request rejected before routing
    #[error("validation error: {0}")]
    Validation(String),

    /// Model output could not be used
    #[error("parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// LLM routing error
    #[error("llm error: {0}")]
    Llm(#[from] catalyst_llm::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Trait for user-friendly error messages
///
/// Provides human-readable error messages and suggestions for fixing.
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get a suggestion for how to fix the error
    fn suggestion(&self) -> Option<String>;
}

impl UserFriendlyError for Error {
    fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) => format!("📝 Invalid request: {}", msg),
            Error::Parse(msg) => format!("🧩 Could not read the model output: {}", msg),
            Error::Configuration(msg) => format!("⚙️ Configuration error: {}", msg),
            Error::Llm(catalyst_llm::Error::NoProviderAvailable { task, .. }) => {
                format!("🔌 No AI provider is available for {}.", task)
            }
            Error::Llm(catalyst_llm::Error::AllProvidersFailed { task, attempts, .. }) => {
                format!(
                    "🤖 Every AI provider failed for {} ({} attempts).",
                    task, attempts
                )
            }
            Error::Llm(catalyst_llm::Error::RateLimit { .. }) => {
                "⏳ Rate limit exceeded. Please try again later.".to_string()
            }
            Error::Llm(e) => format!("🤖 LLM error: {}", e),
        }
    }

    fn suggestion(&self) -> Option<String> {
        match self {
            Error::Validation(_) => {
                Some("💡 Send at least one conversation turn with text.".to_string())
            }
            Error::Configuration(_) => {
                Some("💡 Check config/default.toml or CATALYST_* environment variables.".to_string())
            }
            Error::Llm(catalyst_llm::Error::NoProviderAvailable { .. }) => Some(
                "💡 Set an API key (e.g. GROQ_API_KEY) or enable a provider, then run `catalyst providers list`."
                    .to_string(),
            ),
            Error::Llm(catalyst_llm::Error::AllProvidersFailed { .. }) => {
                Some("💡 Run `catalyst providers test` to check connectivity.".to_string())
            }
            Error::Llm(catalyst_llm::Error::Auth(_)) => {
                Some("💡 Check the provider API key in your .env file.".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display in the CLI
pub fn format_error_for_cli(error: &Error) -> String {
    let mut output = error.user_message();
    output.push('\n');

    if let Some(suggestion) = error.suggestion() {
        output.push('\n');
        output.push_str(&suggestion);
        output.push('\n');
    }

    output
}
