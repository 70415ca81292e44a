//! Response confidence scoring
//!
//! A cheap, model-agnostic estimate of whether a response is usable. The
//! router escalates to the next provider when the score falls below the
//! configured threshold.

use crate::completion::CompletionResponse;
use crate::router::TaskType;
use crate::util::strip_code_fence;
use serde_json::Value;

/// Penalty for responses cut off by the token limit
const TRUNCATED_FACTOR: f32 = 0.6;
/// Penalty for structured tasks whose answer is not JSON
const UNPARSEABLE_FACTOR: f32 = 0.4;
/// Penalty for suspiciously short answers
const SHORT_ANSWER_FACTOR: f32 = 0.7;

/// Scores completion responses in `[0, 1]`
#[derive(Debug, Clone, Copy)]
pub struct ConfidenceScorer {
    /// Answers shorter than this (in chars) are penalized, except classifications
    pub min_answer_chars: usize,
}

impl Default for ConfidenceScorer {
    fn default() -> Self {
        Self {
            min_answer_chars: 20,
        }
    }
}

impl ConfidenceScorer {
    /// Score a response for a task
    #[must_use]
    pub fn score(&self, task: TaskType, response: &CompletionResponse) -> f32 {
        let content = response.content.trim();
        if content.is_empty() {
            return 0.0;
        }

        let mut score = 1.0_f32;

        if response.was_truncated() {
            score *= TRUNCATED_FACTOR;
        }

        if task.expects_json() {
            match serde_json::from_str::<Value>(strip_code_fence(content)) {
                Ok(value) => {
                    if let Some(reported) = value.get("confidence").and_then(Value::as_f64) {
                        score *= (reported as f32).clamp(0.0, 1.0);
                    }
                }
                Err(_) => score *= UNPARSEABLE_FACTOR,
            }
        }

        if task != TaskType::Classification && content.chars().count() < self.min_answer_chars {
            score *= SHORT_ANSWER_FACTOR;
        }

        score.clamp(0.0, 1.0)
    }
}
