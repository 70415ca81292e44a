use super::types::{build_request, OllamaChatResponse};
use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::{Error, Result};
use crate::providers::http::{build_client, send_json, send_probe, ProviderConfig};
use crate::router::LlmProvider;
use reqwest::Client;
use tracing::{debug, instrument};

/// Local Ollama provider
pub struct OllamaProvider {
    client: Client,
    config: ProviderConfig,
}

impl OllamaProvider {
    /// Create a new Ollama provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }
}

/// Connection refusals mean the server is not running; say so plainly
fn describe_unreachable(config: &ProviderConfig, err: Error) -> Error {
    match err {
        Error::Network(_) => Error::Network(format!(
            "cannot reach Ollama at {} (is the server running?)",
            config.base_url
        )),
        other => other,
    }
}

#[async_trait::async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Ollama
    }

    fn available_models(&self) -> Vec<String> {
        self.config.models.clone()
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }

    #[instrument(skip(self, request), fields(provider = %self.config.name, model = %request.model))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = self.config.model_or_default(&request.model).to_string();
        let body = build_request(&model, &request);
        let url = format!("{}/api/chat", self.config.base_url);

        debug!("Sending request to Ollama: {}", url);

        let response: OllamaChatResponse = send_json(&self.config, self.client.post(&url).json(&body))
            .await
            .map_err(|e| describe_unreachable(&self.config, e))?;

        let usage = match (response.prompt_eval_count, response.eval_count) {
            (None, None) => None,
            (prompt, completion) => Some(TokenUsage::new(
                prompt.unwrap_or(0),
                completion.unwrap_or(0),
            )),
        };

        Ok(CompletionResponse {
            content: response.message.content,
            usage,
            finish_reason: response.done_reason,
            model: response.model,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/api/tags", self.config.base_url);
        send_probe(&self.config, self.client.get(&url))
            .await
            .map_err(|e| describe_unreachable(&self.config, e))
    }
}
