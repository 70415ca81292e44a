use super::types::{build_request, convert_messages, supports_json_mode, ChatResponse};
use super::OpenAiCompatibleProvider;
use crate::catalog::{ProviderCatalog, ProviderKind};
use crate::completion::{CompletionRequest, TokenUsage};
use crate::message::Message;
use crate::providers::http::ProviderConfig;
use crate::router::LlmProvider;

fn groq_config() -> ProviderConfig {
    let catalog = ProviderCatalog::default();
    let settings = catalog.get("groq").unwrap();
    // Built directly so the test does not read GROQ_API_KEY
    ProviderConfig {
        name: settings.name.clone(),
        kind: settings.kind,
        base_url: settings.base_url().to_string(),
        api_key: Some("gsk_test_key_1234567890".to_string()),
        default_model: settings.default_model.clone(),
        models: settings.models.iter().map(|m| m.name.clone()).collect(),
        timeout: settings.timeout(),
    }
}

#[test]
fn test_message_conversion() {
    let messages = vec![
        Message::system("You are helpful"),
        Message::user("Hello"),
        Message::assistant("Hi there!"),
    ];

    let converted = convert_messages(&messages);
    assert_eq!(converted.len(), 3);
    assert_eq!(converted[0].role, "system");
    assert_eq!(converted[1].role, "user");
    assert_eq!(converted[2].role, "assistant");
}

#[test]
fn test_json_mode_only_where_supported() {
    let request = CompletionRequest::new("m")
        .with_message(Message::user("classify"))
        .with_json_mode(true);

    let body = serde_json::to_value(build_request(ProviderKind::Groq, "m", &request)).unwrap();
    assert_eq!(body["response_format"]["type"], "json_object");

    let body =
        serde_json::to_value(build_request(ProviderKind::HuggingFace, "m", &request)).unwrap();
    assert!(body.get("response_format").is_none());
    assert!(!supports_json_mode(ProviderKind::HuggingFace));
}

#[test]
fn test_optional_fields_skipped() {
    let request = CompletionRequest::new("m").with_message(Message::user("hi"));
    let body = serde_json::to_value(build_request(ProviderKind::OpenAi, "m", &request)).unwrap();
    assert!(body.get("max_tokens").is_none());
    assert!(body.get("temperature").is_none());

    let request = request.with_max_tokens(64).with_temperature(0.2);
    let body = serde_json::to_value(build_request(ProviderKind::OpenAi, "m", &request)).unwrap();
    assert_eq!(body["max_tokens"], 64);
}

#[test]
fn test_response_parsing() {
    let raw = r#"{
        "id": "chatcmpl-1",
        "model": "llama-3.3-70b-versatile",
        "choices": [{"index": 0, "message": {"role": "assistant", "content": "hello"}, "finish_reason": "stop"}],
        "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
    }"#;
    let response: ChatResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(response.choices[0].message.content.as_deref(), Some("hello"));
    let usage: TokenUsage = response.usage.unwrap().into();
    assert_eq!(usage.total_tokens, 15);
}

#[test]
fn test_provider_metadata() {
    let provider = OpenAiCompatibleProvider::new(groq_config()).unwrap();
    assert_eq!(provider.name(), "groq");
    assert_eq!(provider.kind(), ProviderKind::Groq);
    assert_eq!(provider.default_model(), "llama-3.3-70b-versatile");
    assert!(provider
        .available_models()
        .contains(&"llama-3.1-8b-instant".to_string()));
}
