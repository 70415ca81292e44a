use super::types::{build_request, ChatResponse, OPENROUTER_TITLE};
use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, CompletionResponse};
use crate::error::{Error, Result};
use crate::providers::http::{build_client, send_json, send_probe, ProviderConfig};
use crate::router::LlmProvider;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

/// Provider speaking the OpenAI chat completions dialect
pub struct OpenAiCompatibleProvider {
    client: Client,
    config: ProviderConfig,
}

impl OpenAiCompatibleProvider {
    /// Create a new provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    /// Provider configuration
    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = match self.config.api_key.as_deref() {
            Some(key) => builder.header("Authorization", format!("Bearer {}", key)),
            None => builder,
        };
        if self.config.kind == ProviderKind::OpenRouter {
            builder.header("X-Title", OPENROUTER_TITLE)
        } else {
            builder
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> ProviderKind {
        self.config.kind
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
        let body = build_request(self.config.kind, &model, &request);
        let url = format!("{}/chat/completions", self.config.base_url);

        debug!("Sending request to {}", url);

        let response: ChatResponse =
            send_json(&self.config, self.authorized(self.client.post(&url)).json(&body)).await?;

        let choice = response.choices.into_iter().next().ok_or_else(|| {
            Error::InvalidResponse(format!("{}: response has no choices", self.config.name))
        })?;

        Ok(CompletionResponse {
            content: choice.message.content.unwrap_or_default(),
            usage: response.usage.map(Into::into),
            finish_reason: choice.finish_reason,
            model: response.model.unwrap_or(model),
        })
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/models", self.config.base_url);
        send_probe(&self.config, self.authorized(self.client.get(&url))).await
    }
}
