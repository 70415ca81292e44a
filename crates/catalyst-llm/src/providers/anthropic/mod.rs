//! Anthropic - Claude Messages API provider

#![allow(missing_docs)]

pub mod convert;
pub mod provider;
pub mod types;


pub use provider::AnthropicProvider;
pub use types::{API_VERSION, DEFAULT_MAX_TOKENS};
