//! Ollama - local model server provider
//!
//! Talks to the native `/api/chat` endpoint. No API key; the catalog
//! ships this provider disabled until an operator opts in.

#![allow(missing_docs)]

pub mod provider;
pub mod types;

#[cfg(test)]
mod tests;

pub use provider::OllamaProvider;
