//! Core types for LLM routing
//!
//! TaskType describes what a request is for; ModelTier describes how much
//! model it deserves. Together they drive model selection in the plan.

use crate::token::TokenBudget;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Task Type
// ============================================================================

/// Task type for model routing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    /// Label or intent detection
    Classification,
    /// Sentiment and emotion scoring
    SentimentAnalysis,
    /// Conversation summary
    Summarization,
    /// Short real-time coaching hint during a live conversation
    WhisperSuggestion,
    /// Communication pattern detection
    CommunicationPatterns,
    /// Conflict detection
    ConflictDetection,
    /// General conversation
    Conversation,
    /// Therapeutic intervention recommendations
    InterventionGeneration,
    /// Full multi-section analysis
    ComprehensiveAnalysis,
}

impl TaskType {
    /// All task types, cheapest first
    pub const ALL: [TaskType; 9] = [
        Self::Classification,
        Self::SentimentAnalysis,
        Self::Summarization,
        Self::WhisperSuggestion,
        Self::CommunicationPatterns,
        Self::ConflictDetection,
        Self::Conversation,
        Self::InterventionGeneration,
        Self::ComprehensiveAnalysis,
    ];

    /// Get the recommended model tier for this task type
    ///
    /// - UltraBudget: classification
    /// - Fast: sentiment, summaries, whisper suggestions
    /// - Standard: pattern and conflict detection, conversation
    /// - Premium: interventions, comprehensive analysis
    #[must_use]
    pub fn recommended_tier(&self) -> ModelTier {
        match self {
            Self::Classification => ModelTier::UltraBudget,

            Self::SentimentAnalysis => ModelTier::Fast,
            Self::Summarization => ModelTier::Fast,
            Self::WhisperSuggestion => ModelTier::Fast,

            Self::CommunicationPatterns => ModelTier::Standard,
            Self::ConflictDetection => ModelTier::Standard,
            Self::Conversation => ModelTier::Standard,

            Self::InterventionGeneration => ModelTier::Premium,
            Self::ComprehensiveAnalysis => ModelTier::Premium,
        }
    }

    /// Get the default token budget for this task type
    #[must_use]
    pub fn default_token_budget(&self) -> TokenBudget {
        match self {
            Self::Classification => TokenBudget::new(200, 0.2),
            Self::SentimentAnalysis => TokenBudget::new(600, 0.2),
            Self::Summarization => TokenBudget::new(1000, 0.5),
            Self::WhisperSuggestion => TokenBudget::new(300, 0.6),
            Self::CommunicationPatterns => TokenBudget::new(1500, 0.3),
            Self::ConflictDetection => TokenBudget::new(1200, 0.3),
            Self::Conversation => TokenBudget::new(2000, 0.7),
            Self::InterventionGeneration => TokenBudget::new(2500, 0.5),
            Self::ComprehensiveAnalysis => TokenBudget::new(3000, 0.4),
        }
    }

    /// Whether answers are expected as a JSON object
    #[must_use]
    pub fn expects_json(&self) -> bool {
        !matches!(self, Self::Conversation | Self::WhisperSuggestion)
    }

    /// Whether the caller is waiting in real time
    ///
    /// Latency-sensitive tasks rank providers by observed latency unless the
    /// caller forces a strategy.
    #[must_use]
    pub fn is_latency_sensitive(&self) -> bool {
        matches!(self, Self::WhisperSuggestion)
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classification => "classification",
            Self::SentimentAnalysis => "sentiment_analysis",
            Self::Summarization => "summarization",
            Self::WhisperSuggestion => "whisper_suggestion",
            Self::CommunicationPatterns => "communication_patterns",
            Self::ConflictDetection => "conflict_detection",
            Self::Conversation => "conversation",
            Self::InterventionGeneration => "intervention_generation",
            Self::ComprehensiveAnalysis => "comprehensive_analysis",
        }
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Model Tier
// ============================================================================

/// Model tier for cost/performance optimization
///
/// Tiers are ordered by cost (ascending) and quality (ascending):
/// - UltraBudget: < $0.15/M tokens
/// - Fast: $0.15 ~ $1.00/M tokens
/// - Standard: $1.00 ~ $5.00/M tokens
/// - Premium: > $5.00/M tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelTier {
    /// Small models for trivial tasks
    UltraBudget,
    /// Fast, cheap models for simple tasks
    Fast,
    /// Balanced models for general tasks
    Standard,
    /// Premium models for complex reasoning
    Premium,
}

impl ModelTier {
    /// Get the price range description for this tier
    #[must_use]
    pub fn price_range(&self) -> &'static str {
        match self {
            ModelTier::UltraBudget => "< $0.15/M tokens",
            ModelTier::Fast => "$0.15 ~ $1.00/M tokens",
            ModelTier::Standard => "$1.00 ~ $5.00/M tokens",
            ModelTier::Premium => "> $5.00/M tokens",
        }
    }

    /// Constrain this tier to not exceed the given maximum tier
    ///
    /// Tier ordering: UltraBudget < Fast < Standard < Premium
    #[must_use]
    pub fn constrain_to(&self, max_tier: &ModelTier) -> ModelTier {
        if self.level() <= max_tier.level() {
            *self
        } else {
            *max_tier
        }
    }

    /// Numeric level for tier comparison (lower = cheaper)
    #[must_use]
    pub fn level(&self) -> u8 {
        match self {
            ModelTier::UltraBudget => 0,
            ModelTier::Fast => 1,
            ModelTier::Standard => 2,
            ModelTier::Premium => 3,
        }
    }

    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::UltraBudget => "ultra_budget",
            ModelTier::Fast => "fast",
            ModelTier::Standard => "standard",
            ModelTier::Premium => "premium",
        }
    }
}

impl fmt::Display for ModelTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
