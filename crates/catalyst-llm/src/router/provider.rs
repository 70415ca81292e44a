//! LLM Provider trait definition
//!
//! Every backend the router can call implements this trait. Implementations
//! map transport failures into the crate error taxonomy so the router can
//! decide between retrying, falling back and stopping.

use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::Result;

/// Trait for LLM providers
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (matches the catalog entry)
    fn name(&self) -> &str;

    /// Provider family
    fn kind(&self) -> ProviderKind;

    /// Get available models
    fn available_models(&self) -> Vec<String>;

    /// Get the default model
    fn default_model(&self) -> &str;

    /// Complete a conversation
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Cheap request proving the provider is reachable and the key is accepted
    async fn health_check(&self) -> Result<()>;
}
