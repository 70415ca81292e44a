use super::provider::OllamaProvider;
use super::types::{build_request, OllamaChatResponse};
use crate::catalog::ProviderCatalog;
use crate::completion::CompletionRequest;
use crate::message::Message;
use crate::providers::http::ProviderConfig;
use crate::router::LlmProvider;

#[test]
fn test_request_shape() {
    let request = CompletionRequest::new("llama3.1:8b")
        .with_message(Message::system("You are helpful"))
        .with_message(Message::user("Hello"))
        .with_max_tokens(128)
        .with_json_mode(true);

    let body = serde_json::to_value(build_request("llama3.1:8b", &request)).unwrap();
    assert_eq!(body["stream"], false);
    assert_eq!(body["format"], "json");
    assert_eq!(body["options"]["num_predict"], 128);
    assert!(body["options"].get("temperature").is_none());
    assert_eq!(body["messages"][0]["role"], "system");
}

#[test]
fn test_request_without_options() {
    let request = CompletionRequest::new("m").with_message(Message::user("hi"));
    let body = serde_json::to_value(build_request("m", &request)).unwrap();
    assert!(body.get("options").is_none());
    assert!(body.get("format").is_none());
}

#[test]
fn test_response_parsing() {
    let raw = r#"{
        "model": "llama3.1:8b",
        "created_at": "2024-07-22T20:33:28.123648Z",
        "message": {"role": "assistant", "content": "Hello!"},
        "done": true,
        "done_reason": "stop",
        "prompt_eval_count": 26,
        "eval_count": 5
    }"#;
    let response: OllamaChatResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(response.message.content, "Hello!");
    assert_eq!(response.prompt_eval_count, Some(26));
    assert_eq!(response.eval_count, Some(5));
}

#[test]
fn test_provider_from_catalog() {
    let catalog = ProviderCatalog::default();
    let config = ProviderConfig::from_settings(catalog.get("ollama").unwrap()).unwrap();
    let provider = OllamaProvider::new(config).unwrap();

    assert_eq!(provider.name(), "ollama");
    assert_eq!(provider.default_model(), "llama3.1:8b");
}
