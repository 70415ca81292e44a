use crate::completion::CompletionRequest;
use crate::message::Message;
use serde::{Deserialize, Serialize};

/// Request for the Ollama chat endpoint
#[derive(Debug, Serialize)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OllamaMessage {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

/// Model configuration options for Ollama
#[derive(Debug, Serialize)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

/// Non-streaming chat response
#[derive(Debug, Deserialize)]
pub struct OllamaChatResponse {
    pub model: String,
    pub message: OllamaMessage,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u32>,
    #[serde(default)]
    pub eval_count: Option<u32>,
}

pub(crate) fn build_request(model: &str, request: &CompletionRequest) -> OllamaChatRequest {
    let options = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| {
        OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
        }
    });

    OllamaChatRequest {
        model: model.to_string(),
        messages: convert_messages(&request.messages),
        stream: false,
        format: request.json_mode.then_some("json"),
        options,
    }
}

pub(crate) fn convert_messages(messages: &[Message]) -> Vec<OllamaMessage> {
    messages
        .iter()
        .map(|m| OllamaMessage {
            role: m.role.as_str().to_string(),
            content: m.content.clone(),
        })
        .collect()
}
