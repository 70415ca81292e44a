use super::convert::{collect_text, convert_messages};
use super::types::{AnthropicRequest, AnthropicResponse, API_VERSION, DEFAULT_MAX_TOKENS};
use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, CompletionResponse, TokenUsage};
use crate::error::Result;
use crate::providers::http::{build_client, send_json, send_probe, ProviderConfig};
use crate::router::LlmProvider;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

/// Anthropic Claude provider
pub struct AnthropicProvider {
    client: Client,
    config: ProviderConfig,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(config: ProviderConfig) -> Result<Self> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("x-api-key", self.config.api_key())
            .header("anthropic-version", API_VERSION)
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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
        let (system, messages) = convert_messages(&request.messages);

        // No native JSON mode; structured tasks carry their format in the prompt
        let body = AnthropicRequest {
            model,
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system,
            messages,
            temperature: request.temperature,
        };

        let url = format!("{}/v1/messages", self.config.base_url);
        debug!("Sending request to Anthropic: {}", url);

        let response: AnthropicResponse =
            send_json(&self.config, self.authorized(self.client.post(&url)).json(&body)).await?;

        Ok(CompletionResponse {
            content: collect_text(&response.content),
            usage: Some(TokenUsage::new(
                response.usage.input_tokens,
                response.usage.output_tokens,
            )),
            finish_reason: response.stop_reason,
            model: response.model,
        })
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/v1/models", self.config.base_url);
        send_probe(&self.config, self.authorized(self.client.get(&url))).await
    }
}
