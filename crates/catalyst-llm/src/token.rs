//! Token counting and budget management
//!
//! Token counts are estimated client-side with tiktoken's cl100k_base
//! encoding. The router uses them to price a request before choosing a
//! provider, so estimates only need to be close, not exact.

use crate::message::Message;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tiktoken_rs::{cl100k_base, CoreBPE};

/// Global tokenizer instance (initialized once, thread-safe)
static TOKENIZER: LazyLock<CoreBPE> = LazyLock::new(|| {
    cl100k_base().expect("cl100k_base tokenizer is a compile-time constant and should never fail")
});

/// Global token counter instance for convenience
pub static TOKEN_COUNTER: TokenCounter = TokenCounter::new();

// ============================================================================
// Token Counter
// ============================================================================

/// Token counter for estimating message token usage
#[derive(Clone, Copy, Debug)]
pub struct TokenCounter;

impl TokenCounter {
    /// Create a new token counter
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Count tokens in a string
    #[must_use]
    pub fn count_tokens(&self, text: &str) -> usize {
        TOKENIZER.encode_with_special_tokens(text).len()
    }

    /// Count tokens in a message (includes role overhead)
    #[must_use]
    pub fn count_message_tokens(&self, message: &Message) -> usize {
        const MESSAGE_OVERHEAD: usize = 6; // role + separators
        self.count_tokens(&message.content) + MESSAGE_OVERHEAD
    }

    /// Count total tokens in a conversation
    #[must_use]
    pub fn count_conversation_tokens(&self, messages: &[Message]) -> usize {
        const CONVERSATION_OVERHEAD: usize = 3; // start/end tokens
        messages
            .iter()
            .map(|m| self.count_message_tokens(m))
            .sum::<usize>()
            + CONVERSATION_OVERHEAD
    }
}

impl Default for TokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to count tokens in text
#[must_use]
pub fn count_tokens(text: &str) -> usize {
    TOKEN_COUNTER.count_tokens(text)
}

/// Convenience function to count tokens in messages
#[must_use]
pub fn count_message_tokens(messages: &[Message]) -> usize {
    TOKEN_COUNTER.count_conversation_tokens(messages)
}

// ============================================================================
// Token Budget
// ============================================================================

/// Token budget configuration for different task types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBudget {
    /// Maximum tokens to generate for this task type
    pub max_tokens: u32,
    /// Recommended temperature for this task type
    pub temperature: f32,
}

impl TokenBudget {
    /// Create a new token budget
    #[must_use]
    pub const fn new(max_tokens: u32, temperature: f32) -> Self {
        Self {
            max_tokens,
            temperature,
        }
    }
}

impl Default for TokenBudget {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: 0.7,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_counter_basic() {
        let counter = TokenCounter::new();

        let tokens = counter.count_tokens("Hello, world!");
        assert!(tokens > 0);
        assert!(tokens < 10);

        assert_eq!(counter.count_tokens(""), 0);
    }

    #[test]
    fn test_token_counter_message() {
        let counter = TokenCounter::new();

        let message = Message::user("I felt ignored when you checked your phone.");
        let tokens = counter.count_message_tokens(&message);

        let content_tokens = counter.count_tokens(&message.content);
        assert!(tokens > content_tokens);
    }

    #[test]
    fn test_token_counter_conversation() {
        let counter = TokenCounter::new();

        let messages = vec![
            Message::system("You are a relationship coach."),
            Message::user("We argued again."),
            Message::assistant("What was the argument about?"),
        ];

        let total = counter.count_conversation_tokens(&messages);
        let sum: usize = messages
            .iter()
            .map(|m| counter.count_message_tokens(m))
            .sum();
        assert!(total >= sum);
    }

    #[test]
    fn test_global_token_counter() {
        let tokens = count_tokens("Hello, world!");
        assert!(tokens > 0);

        let messages = vec![Message::user("Hello, world!")];
        assert!(count_message_tokens(&messages) > tokens);
    }

    #[test]
    fn test_token_budget_default() {
        let budget = TokenBudget::default();
        assert_eq!(budget.max_tokens, 2048);
        assert_eq!(budget.temperature, 0.7);
    }
}
