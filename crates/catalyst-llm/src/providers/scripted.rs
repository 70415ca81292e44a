//! Scripted provider for tests and offline demos
//!
//! Replays a queue of replies and failures in order, then falls back to a
//! fixed reply. Every request is recorded so tests can assert on what the
//! router actually sent.

use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::router::LlmProvider;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_REPLY: &str = "This is a scripted reply used for testing.";

enum Step {
    Reply(CompletionResponse),
    Fail(Error),
}

/// A provider that returns queued outcomes
pub struct ScriptedProvider {
    name: String,
    kind: ProviderKind,
    models: Vec<String>,
    steps: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<CompletionRequest>>,
    default_reply: String,
    usage: Option<TokenUsage>,
    delay: Option<Duration>,
    healthy: AtomicBool,
}

impl ScriptedProvider {
    /// Create a provider with a single model named `{name}-model`
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ProviderKind) -> Self {
        let name = name.into();
        Self {
            models: vec![format!("{}-model", name)],
            name,
            kind,
            steps: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_reply: DEFAULT_REPLY.to_string(),
            usage: Some(TokenUsage::new(100, 50)),
            delay: None,
            healthy: AtomicBool::new(true),
        }
    }

    /// Replace the served model list (first entry becomes the default)
    #[must_use]
    pub fn with_models(mut self, models: &[&str]) -> Self {
        if !models.is_empty() {
            self.models = models.iter().map(|m| (*m).to_string()).collect();
        }
        self
    }

    /// Reply used once the queue is empty
    #[must_use]
    pub fn with_default_reply(mut self, content: impl Into<String>) -> Self {
        self.default_reply = content.into();
        self
    }

    /// Usage reported with every reply
    #[must_use]
    pub fn with_usage(mut self, usage: Option<TokenUsage>) -> Self {
        self.usage = usage;
        self
    }

    /// Sleep before answering
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a text reply
    pub fn push_reply(&self, content: impl Into<String>) -> &Self {
        let response = CompletionResponse {
            content: content.into(),
            usage: self.usage.clone(),
            finish_reason: Some("stop".to_string()),
            model: String::new(),
        };
        self.push_response(response)
    }

    /// Queue a full response
    pub fn push_response(&self, response: CompletionResponse) -> &Self {
        self.lock_steps().push_back(Step::Reply(response));
        self
    }

    /// Queue a failure
    pub fn push_error(&self, error: Error) -> &Self {
        self.lock_steps().push_back(Step::Fail(error));
        self
    }

    /// Make `health_check` fail or succeed
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Requests received so far
    #[must_use]
    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests received
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    fn lock_steps(&self) -> std::sync::MutexGuard<'_, VecDeque<Step>> {
        self.steps.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn available_models(&self) -> Vec<String> {
        self.models.clone()
    }

    fn default_model(&self) -> &str {
        self.models.first().map(String::as_str).unwrap_or_default()
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = if request.model.is_empty() {
            self.default_model().to_string()
        } else {
            request.model.clone()
        };
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let step = self.lock_steps().pop_front();
        match step {
            Some(Step::Reply(mut response)) => {
                if response.model.is_empty() {
                    response.model = model;
                }
                Ok(response)
            }
            Some(Step::Fail(error)) => Err(error),
            None => Ok(CompletionResponse {
                content: self.default_reply.clone(),
                usage: self.usage.clone(),
                finish_reason: Some("stop".to_string()),
                model,
            }),
        }
    }

    async fn health_check(&self) -> Result<()> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Network(format!("{} is unreachable", self.name)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Message;

    fn request() -> CompletionRequest {
        CompletionRequest::new("").with_message(Message::user("hi"))
    }

    #[tokio::test]
    async fn test_replays_queue_then_default() {
        let provider = ScriptedProvider::new("groq", ProviderKind::Groq);
        provider
            .push_error(Error::Api("boom".to_string()))
            .push_reply("first");

        assert!(provider.complete(request()).await.is_err());
        let first = provider.complete(request()).await.unwrap();
        assert_eq!(first.content, "first");
        assert_eq!(first.model, "groq-model");

        let fallback = provider.complete(request()).await.unwrap();
        assert_eq!(fallback.content, DEFAULT_REPLY);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_records_requests() {
        let provider = ScriptedProvider::new("openai", ProviderKind::OpenAi)
            .with_models(&["gpt-4o-mini", "gpt-4o"]);
        provider
            .complete(CompletionRequest::new("gpt-4o").with_max_tokens(10))
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].max_tokens, Some(10));
        assert_eq!(provider.default_model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_health_toggle() {
        let provider = ScriptedProvider::new("mistral", ProviderKind::Mistral);
        assert!(provider.health_check().await.is_ok());
        provider.set_healthy(false);
        assert!(matches!(
            provider.health_check().await,
            Err(Error::Network(_))
        ));
    }
}
