//! Catalyst Core - conversation analysis on top of the LLM router
//!
//! - Analysis: validated analysis requests routed per analysis type
//! - Whisper: real-time coaching suggestions over the latest turns
//! - Error: user-facing error taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod analysis;
pub mod error;

pub use analysis::{
    AnalysisConfig, AnalysisOutcome, AnalysisReport, AnalysisRequest, AnalysisService,
    AnalysisType, CommunicationPattern, Conflict, ConversationTurn, Intervention, Level,
    SentimentScores, WhisperSuggestion,
};
pub use error::{format_error_for_cli, Error, Result, UserFriendlyError};
