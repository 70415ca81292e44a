use super::types::{AnthropicMessage, ResponseContentBlock};
use crate::message::{Message, MessageRole};

/// Split out the system prompt and merge consecutive same-role turns
///
/// The Messages API takes the system prompt as a separate field and
/// rejects two user (or two assistant) messages in a row.
pub(crate) fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<AnthropicMessage>) {
    let mut system_parts = Vec::new();
    let mut converted: Vec<AnthropicMessage> = Vec::new();

    for msg in messages {
        let role = match msg.role {
            MessageRole::System => {
                if !msg.content.is_empty() {
                    system_parts.push(msg.content.clone());
                }
                continue;
            }
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        };

        match converted.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&msg.content);
            }
            _ => converted.push(AnthropicMessage {
                role: role.to_string(),
                content: msg.content.clone(),
            }),
        }
    }

    let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));
    (system, converted)
}

/// Concatenate the text blocks of a response
pub(crate) fn collect_text(blocks: &[ResponseContentBlock]) -> String {
    blocks
        .iter()
        .filter_map(|block| match block {
            ResponseContentBlock::Text { text } => Some(text.as_str()),
            ResponseContentBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("")
}
