//! OpenAI-compatible chat completions
//!
//! OpenAI, Mistral, Groq, OpenRouter and the Hugging Face router all speak
//! the `/chat/completions` dialect; one transport serves them all.

#![allow(missing_docs)]

pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use provider::OpenAiCompatibleProvider;
