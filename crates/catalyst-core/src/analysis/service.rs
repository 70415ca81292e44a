//! Analysis service over the LLM router

use catalyst_llm::{LlmRouter, RouteOptions, TaskType};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::parse::parse_report;
use super::prompts::{build_messages, build_whisper_messages};
use super::types::{AnalysisOutcome, AnalysisRequest, ConversationTurn, WhisperSuggestion};
use crate::error::{Error, Result};

/// Analysis limits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Maximum turns per request
    pub max_turns: usize,
    /// Maximum characters across all turns
    pub max_chars: usize,
    /// Most recent turns sent for a whisper suggestion
    pub whisper_window: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_turns: 500,
            max_chars: 60_000,
            whisper_window: 6,
        }
    }
}

impl AnalysisConfig {
    /// Set the turn limit
    #[must_use]
    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    /// Set the character limit
    #[must_use]
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// Runs analyses and whisper suggestions through a shared router
#[derive(Clone)]
pub struct AnalysisService {
    router: Arc<LlmRouter>,
    config: AnalysisConfig,
}

impl AnalysisService {
    /// Create a service with default limits
    pub fn new(router: Arc<LlmRouter>) -> Self {
        Self::with_config(router, AnalysisConfig::default())
    }

    /// Create a service with explicit limits
    pub fn with_config(router: Arc<LlmRouter>, config: AnalysisConfig) -> Self {
        Self { router, config }
    }

    /// The underlying router
    pub fn router(&self) -> &Arc<LlmRouter> {
        &self.router
    }

    /// Current limits
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Check a transcript against the configured limits
    pub fn validate_turns(&self, turns: &[ConversationTurn]) -> Result<()> {
        if turns.is_empty() {
            return Err(Error::Validation("conversation has no turns".to_string()));
        }
        if turns.iter().all(|turn| turn.text.trim().is_empty()) {
            return Err(Error::Validation(
                "every conversation turn is empty".to_string(),
            ));
        }
        if turns.len() > self.config.max_turns {
            return Err(Error::Validation(format!(
                "conversation has {} turns (max {})",
                turns.len(),
                self.config.max_turns
            )));
        }

        let chars: usize = turns.iter().map(|turn| turn.text.chars().count()).sum();
        if chars > self.config.max_chars {
            return Err(Error::Validation(format!(
                "conversation has {} characters (max {})",
                chars, self.config.max_chars
            )));
        }
        Ok(())
    }

    /// Validate, route and parse an analysis request
    #[instrument(
        skip(self, request),
        fields(analysis_type = %request.analysis_type, turns = request.turns.len())
    )]
    pub async fn route_analysis_request(&self, request: AnalysisRequest) -> Result<AnalysisOutcome> {
        self.validate_turns(&request.turns)?;

        let task = request.analysis_type.task_type();
        let messages = build_messages(request.analysis_type, &request.turns);
        let options = RouteOptions {
            preferred_provider: request.preferred_provider.clone(),
            exclude: request.exclude_providers.clone(),
            max_tier: request.max_tier,
            ..Default::default()
        };

        let routed = self.router.route(task, messages, options).await?;
        let report = parse_report(
            request.analysis_type,
            &routed.response.content,
            routed.confidence,
        );

        if !report.structured {
            warn!(
                provider = %routed.provider,
                model = %routed.model,
                "Analysis output was not JSON, keeping raw text"
            );
        }

        info!(
            provider = %routed.provider,
            model = %routed.model,
            fallback = routed.used_fallback,
            confidence = report.confidence,
            latency_ms = routed.latency_ms,
            "Analysis completed"
        );

        Ok(AnalysisOutcome {
            analysis_id: Uuid::new_v4(),
            conversation_id: request.conversation_id,
            analysis_type: request.analysis_type,
            report,
            provider: routed.provider,
            model: routed.model,
            used_fallback: routed.used_fallback,
            low_confidence: routed.low_confidence,
            attempts: routed.attempts,
            latency_ms: routed.latency_ms,
            estimated_cost: routed.estimated_cost,
            created_at: Utc::now(),
        })
    }

    /// Suggest what to say next, from the most recent turns
    #[instrument(skip(self, turns), fields(turns = turns.len()))]
    pub async fn whisper_suggestion(&self, turns: &[ConversationTurn]) -> Result<WhisperSuggestion> {
        if turns.is_empty() {
            return Err(Error::Validation("conversation has no turns".to_string()));
        }

        // Only the recent window is sent, so only it is held to the limits
        let window = self.config.whisper_window.max(1);
        let recent = &turns[turns.len().saturating_sub(window)..];
        self.validate_turns(recent)?;
        debug!(window = recent.len(), "Building whisper prompt");

        let routed = self
            .router
            .route(
                TaskType::WhisperSuggestion,
                build_whisper_messages(recent),
                RouteOptions::default(),
            )
            .await?;

        let suggestion = clean_suggestion(&routed.response.content);
        if suggestion.is_empty() {
            return Err(Error::Parse(format!(
                "{} returned an empty suggestion",
                routed.provider
            )));
        }

        Ok(WhisperSuggestion {
            suggestion,
            provider: routed.provider,
            model: routed.model,
            confidence: routed.confidence,
            turns_considered: recent.len(),
            latency_ms: routed.latency_ms,
        })
    }
}

/// Strip labels and wrapping quotes models like to add
fn clean_suggestion(content: &str) -> String {
    let mut text = content.trim();
    for label in ["Suggestion:", "suggestion:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim();
        }
    }
    text.trim_matches(|c| c == '"' || c == '\u{201c}' || c == '\u{201d}')
        .trim()
        .to_string()
}
