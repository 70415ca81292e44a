//! Conversation analysis
//!
//! Turns a transcript into a routed LLM request per analysis type and reads
//! the answer back into an [`AnalysisReport`]. Whisper suggestions use the
//! same path over the most recent turns.

mod parse;
mod prompts;
mod service;
mod types;


pub use parse::parse_report;
pub use prompts::{build_messages, build_whisper_messages, render_transcript};
pub use service::{AnalysisConfig, AnalysisService};
pub use types::{
    AnalysisOutcome, AnalysisReport, AnalysisRequest, AnalysisType, CommunicationPattern,
    Conflict, ConversationTurn, Intervention, Level, SentimentScores, WhisperSuggestion,
};
