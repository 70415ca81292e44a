//! Analysis request and report types

use catalyst_llm::{AttemptRecord, ModelTier, TaskType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::Error;

/// Kind of analysis to run over a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisType {
    /// Overall and per-speaker sentiment
    Sentiment,
    /// Recurring communication patterns
    CommunicationPatterns,
    /// Conflicts and their severity
    ConflictDetection,
    /// Recommended interventions
    Interventions,
    /// Short summary
    Summary,
    /// All of the above
    Comprehensive,
}

impl AnalysisType {
    /// All analysis types
    pub const ALL: [AnalysisType; 6] = [
        Self::Sentiment,
        Self::CommunicationPatterns,
        Self::ConflictDetection,
        Self::Interventions,
        Self::Summary,
        Self::Comprehensive,
    ];

    /// Router task for this analysis
    #[must_use]
    pub fn task_type(&self) -> TaskType {
        match self {
            Self::Sentiment => TaskType::SentimentAnalysis,
            Self::CommunicationPatterns => TaskType::CommunicationPatterns,
            Self::ConflictDetection => TaskType::ConflictDetection,
            Self::Interventions => TaskType::InterventionGeneration,
            Self::Summary => TaskType::Summarization,
            Self::Comprehensive => TaskType::ComprehensiveAnalysis,
        }
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sentiment => "sentiment",
            Self::CommunicationPatterns => "communication_patterns",
            Self::ConflictDetection => "conflict_detection",
            Self::Interventions => "interventions",
            Self::Summary => "summary",
            Self::Comprehensive => "comprehensive",
        }
    }
}

impl fmt::Display for AnalysisType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .or(match normalized.as_str() {
                "patterns" => Some(Self::CommunicationPatterns),
                "conflicts" | "conflict" => Some(Self::ConflictDetection),
                "intervention" => Some(Self::Interventions),
                "full" => Some(Self::Comprehensive),
                _ => None,
            })
            .ok_or_else(|| Error::Validation(format!("unknown analysis type: {}", s)))
    }
}

/// One utterance in a conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke
    pub speaker: String,
    /// What was said
    pub text: String,
}

impl ConversationTurn {
    /// Create a turn
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
        }
    }
}

/// Request to analyze a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Caller's conversation id, echoed back
    #[serde(default)]
    pub conversation_id: Option<String>,
    /// What to analyze
    pub analysis_type: AnalysisType,
    /// Transcript in order
    pub turns: Vec<ConversationTurn>,
    /// Provider to try first
    #[serde(default)]
    pub preferred_provider: Option<String>,
    /// Providers to leave out
    #[serde(default)]
    pub exclude_providers: Vec<String>,
    /// Cap the model tier
    #[serde(default)]
    pub max_tier: Option<ModelTier>,
}

impl AnalysisRequest {
    /// Create a request
    pub fn new(analysis_type: AnalysisType, turns: Vec<ConversationTurn>) -> Self {
        Self {
            conversation_id: None,
            analysis_type,
            turns,
            preferred_provider: None,
            exclude_providers: Vec::new(),
            max_tier: None,
        }
    }

    /// Prefer a provider
    #[must_use]
    pub fn with_preferred_provider(mut self, provider: impl Into<String>) -> Self {
        self.preferred_provider = Some(provider.into());
        self
    }

    /// Attach the caller's conversation id
    #[must_use]
    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }
}

/// Low / medium / high rating used for conflict severity and intervention priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Low
    Low,
    /// Medium
    #[default]
    Medium,
    /// High
    High,
}

impl Level {
    /// Read a level from model output, accepting words, 1-3 ranks or 0-1 fractions
    #[must_use]
    pub fn parse_lenient(value: &serde_json::Value) -> Self {
        if let Some(s) = value.as_str() {
            return match s.trim().to_lowercase().as_str() {
                "low" | "minor" => Self::Low,
                "high" | "severe" | "critical" | "urgent" => Self::High,
                _ => Self::Medium,
            };
        }
        match value.as_f64() {
            Some(n) if n > 0.0 && n < 1.0 => {
                if n < 0.34 {
                    Self::Low
                } else if n < 0.67 {
                    Self::Medium
                } else {
                    Self::High
                }
            }
            Some(n) if n < 1.5 => Self::Low,
            Some(n) if n < 2.5 => Self::Medium,
            Some(_) => Self::High,
            None => Self::default(),
        }
    }
}

/// Sentiment scores in `[-1, 1]`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentScores {
    /// Whole conversation
    pub overall: f32,
    /// Per speaker
    pub per_speaker: HashMap<String, f32>,
    /// Emotions named by the model
    pub emotions: Vec<String>,
}

/// A recurring way of communicating
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationPattern {
    /// Short label
    pub name: String,
    /// Explanation
    pub description: String,
    /// Speakers showing the pattern
    pub speakers: Vec<String>,
}

/// A detected conflict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// What it is about
    pub topic: String,
    /// Explanation
    pub description: String,
    /// How serious
    pub severity: Level,
}

/// A therapeutic recommendation tied to an analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// Short title
    pub title: String,
    /// What to do
    pub description: String,
    /// Grouping (e.g. "communication", "conflict_resolution")
    pub category: String,
    /// Urgency
    pub priority: Level,
}

/// Parsed analysis result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Summary text (raw model output when it was not JSON)
    pub summary: String,
    /// Sentiment, when reported
    pub sentiment: Option<SentimentScores>,
    /// Communication patterns
    pub patterns: Vec<CommunicationPattern>,
    /// Conflicts
    pub conflicts: Vec<Conflict>,
    /// Interventions
    pub interventions: Vec<Intervention>,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
    /// Whether the model answered with a JSON object
    pub structured: bool,
}

/// Analysis result with routing metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    /// Identifier of this analysis
    pub analysis_id: Uuid,
    /// Caller's conversation id
    pub conversation_id: Option<String>,
    /// What was analyzed
    pub analysis_type: AnalysisType,
    /// Parsed report
    pub report: AnalysisReport,
    /// Provider that answered
    pub provider: String,
    /// Model that answered
    pub model: String,
    /// Whether a fallback provider answered
    pub used_fallback: bool,
    /// Whether the answer fell below the confidence threshold everywhere
    pub low_confidence: bool,
    /// Every provider attempt
    pub attempts: Vec<AttemptRecord>,
    /// Total latency
    pub latency_ms: u64,
    /// Estimated cost (USD)
    pub estimated_cost: f64,
    /// Completion time
    pub created_at: DateTime<Utc>,
}

/// Real-time coaching hint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhisperSuggestion {
    /// The hint
    pub suggestion: String,
    /// Provider that answered
    pub provider: String,
    /// Model that answered
    pub model: String,
    /// Confidence in `[0, 1]`
    pub confidence: f32,
    /// Turns included in the prompt
    pub turns_considered: usize,
    /// Total latency
    pub latency_ms: u64,
}
