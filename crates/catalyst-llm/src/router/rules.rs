//! Routing rules for model selection

use super::types::{ModelTier, TaskType};
use crate::token::TokenBudget;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Task-specific routing overrides
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingRules {
    /// Provider preferred for a task when the caller names none
    #[serde(default)]
    pub task_providers: HashMap<TaskType, String>,
    /// Model used for a task by any provider that serves it
    #[serde(default)]
    pub task_models: HashMap<TaskType, String>,
    /// Task-specific token budget overrides
    #[serde(default)]
    pub task_token_budgets: HashMap<TaskType, TokenBudget>,
    /// Maximum cost tier allowed
    #[serde(default)]
    pub max_tier: Option<ModelTier>,
}

impl RoutingRules {
    /// Get token budget for a task type, with custom override or default
    #[must_use]
    pub fn get_token_budget(&self, task_type: TaskType) -> TokenBudget {
        self.task_token_budgets
            .get(&task_type)
            .cloned()
            .unwrap_or_else(|| task_type.default_token_budget())
    }

    /// Tier to target for a task after applying the tier caps
    #[must_use]
    pub fn target_tier(&self, task_type: TaskType, call_max: Option<ModelTier>) -> ModelTier {
        let mut tier = task_type.recommended_tier();
        if let Some(max) = &self.max_tier {
            tier = tier.constrain_to(max);
        }
        if let Some(max) = &call_max {
            tier = tier.constrain_to(max);
        }
        tier
    }
}
