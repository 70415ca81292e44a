//! Prompt construction for analysis and whisper requests

use catalyst_llm::Message;

use super::types::{AnalysisType, ConversationTurn};

/// Shared preamble for every analysis prompt
const ANALYST_PREAMBLE: &str = r#"You are Catalyst, an experienced relationship coach analysing a conversation between partners.
Be specific, neutral and kind. Never take sides. Base every statement on the transcript.
Respond with a single JSON object and nothing else. Include a "confidence" number between 0 and 1."#;

const SENTIMENT_SCHEMA: &str = r#"{"summary": string, "sentiment": {"overall": number (-1..1), "per_speaker": {speaker: number (-1..1)}, "emotions": [string]}, "confidence": number}"#;

const PATTERNS_SCHEMA: &str = r#"{"summary": string, "patterns": [{"name": string, "description": string, "speakers": [string]}], "confidence": number}"#;

const CONFLICT_SCHEMA: &str = r#"{"summary": string, "conflicts": [{"topic": string, "description": string, "severity": "low"|"medium"|"high"}], "confidence": number}"#;

const INTERVENTION_SCHEMA: &str = r#"{"summary": string, "interventions": [{"title": string, "description": string, "category": string, "priority": "low"|"medium"|"high"}], "confidence": number}"#;

const SUMMARY_SCHEMA: &str = r#"{"summary": string, "confidence": number}"#;

const COMPREHENSIVE_SCHEMA: &str = r#"{"summary": string, "sentiment": {"overall": number, "per_speaker": {speaker: number}, "emotions": [string]}, "patterns": [{"name": string, "description": string, "speakers": [string]}], "conflicts": [{"topic": string, "description": string, "severity": "low"|"medium"|"high"}], "interventions": [{"title": string, "description": string, "category": string, "priority": "low"|"medium"|"high"}], "confidence": number}"#;

const WHISPER_PROMPT: &str = r#"You are Catalyst, a relationship coach quietly listening to a live conversation.
Suggest ONE short thing the next speaker could say or do to keep the conversation constructive.
Answer in one or two sentences of plain text. No lists, no JSON, no preamble."#;

fn instructions(analysis_type: AnalysisType) -> (&'static str, &'static str) {
    match analysis_type {
        AnalysisType::Sentiment => (
            "Assess the emotional tone of the conversation overall and for each speaker.",
            SENTIMENT_SCHEMA,
        ),
        AnalysisType::CommunicationPatterns => (
            "Identify recurring communication patterns such as criticism, defensiveness, stonewalling, validation or repair attempts.",
            PATTERNS_SCHEMA,
        ),
        AnalysisType::ConflictDetection => (
            "Identify the conflicts in the conversation, what each is about and how severe it is.",
            CONFLICT_SCHEMA,
        ),
        AnalysisType::Interventions => (
            "Recommend practical, evidence-based interventions the couple could try next.",
            INTERVENTION_SCHEMA,
        ),
        AnalysisType::Summary => (
            "Summarise the conversation in a few sentences, covering the main topics and how it ended.",
            SUMMARY_SCHEMA,
        ),
        AnalysisType::Comprehensive => (
            "Produce a full analysis: sentiment, communication patterns, conflicts and recommended interventions.",
            COMPREHENSIVE_SCHEMA,
        ),
    }
}

/// System prompt for an analysis type
#[must_use]
pub fn system_prompt(analysis_type: AnalysisType) -> String {
    let (task, schema) = instructions(analysis_type);
    format!(
        "{}\n\nTask: {}\n\nJSON shape:\n{}",
        ANALYST_PREAMBLE, task, schema
    )
}

/// Render turns as `Speaker: text` lines, skipping empty turns
#[must_use]
pub fn render_transcript(turns: &[ConversationTurn]) -> String {
    turns
        .iter()
        .filter(|turn| !turn.text.trim().is_empty())
        .map(|turn| format!("{}: {}", turn.speaker.trim(), turn.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Messages for an analysis request
#[must_use]
pub fn build_messages(analysis_type: AnalysisType, turns: &[ConversationTurn]) -> Vec<Message> {
    vec![
        Message::system(system_prompt(analysis_type)),
        Message::user(format!("Transcript:\n{}", render_transcript(turns))),
    ]
}

/// Messages for a whisper suggestion
#[must_use]
pub fn build_whisper_messages(turns: &[ConversationTurn]) -> Vec<Message> {
    vec![
        Message::system(WHISPER_PROMPT),
        Message::user(format!(
            "Latest turns:\n{}\n\nSuggestion:",
            render_transcript(turns)
        )),
    ]
}
