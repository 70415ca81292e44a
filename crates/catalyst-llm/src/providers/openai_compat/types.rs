use crate::catalog::ProviderKind;
use crate::completion::{CompletionRequest, TokenUsage};
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// OpenRouter asks callers to identify themselves
pub const OPENROUTER_TITLE: &str = "Catalyst";

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
}

impl From<ChatUsage> for TokenUsage {
    fn from(usage: ChatUsage) -> Self {
        TokenUsage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

// ============================================================================
// Conversion
// ============================================================================

/// Whether the endpoint honors `response_format: json_object`
pub(crate) fn supports_json_mode(kind: ProviderKind) -> bool {
    matches!(
        kind,
        ProviderKind::OpenAi | ProviderKind::Mistral | ProviderKind::Groq | ProviderKind::OpenRouter
    )
}

pub(crate) fn convert_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| ChatMessage {
            role: m.role.as_str().to_string(),
            content: Some(m.content.clone()),
        })
        .collect()
}

pub(crate) fn build_request(kind: ProviderKind, model: &str, request: &CompletionRequest) -> ChatRequest {
    let response_format = (request.json_mode && supports_json_mode(kind)).then_some(ResponseFormat {
        format_type: "json_object",
    });

    ChatRequest {
        model: model.to_string(),
        messages: convert_messages(&request.messages),
        max_tokens: request.max_tokens,
        temperature: request.temperature,
        response_format,
    }
}
