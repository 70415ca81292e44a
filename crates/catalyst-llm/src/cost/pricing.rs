//! Model Pricing - LLM cost information
//!
//! Prices are taken from the provider catalog so the router's cost estimates
//! and the usage reports always agree.

use crate::catalog::ProviderCatalog;
use crate::router::ModelTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default cost per 1M input tokens (USD) for unknown models
pub const DEFAULT_INPUT_COST_PER_MILLION: f64 = 5.0;

/// Default cost per 1M output tokens (USD) for unknown models
pub const DEFAULT_OUTPUT_COST_PER_MILLION: f64 = 15.0;

/// Pricing for one provider/model pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    /// Model name
    pub model: String,
    /// Provider name
    pub provider: String,
    /// Capability tier
    pub tier: ModelTier,
    /// Cost per 1M input tokens (USD)
    pub input_cost_per_million: f64,
    /// Cost per 1M output tokens (USD)
    pub output_cost_per_million: f64,
    /// Context window size
    pub context_window: u32,
    /// Last updated
    pub updated_at: DateTime<Utc>,
}

impl ModelPricing {
    /// Calculate cost for given token counts
    #[must_use]
    pub fn calculate_cost(&self, input_tokens: u32, output_tokens: u32) -> f64 {
        let input_cost = (input_tokens as f64 / 1_000_000.0) * self.input_cost_per_million;
        let output_cost = (output_tokens as f64 / 1_000_000.0) * self.output_cost_per_million;
        input_cost + output_cost
    }

    /// Sum of input and output price, used to compare models
    #[must_use]
    pub fn blended_cost_per_million(&self) -> f64 {
        self.input_cost_per_million + self.output_cost_per_million
    }
}

/// Key used in the pricing table
#[must_use]
pub fn pricing_key(provider: &str, model: &str) -> String {
    format!("{}/{}", provider, model)
}

/// Cost for a model missing from the pricing table
#[must_use]
pub fn default_cost(input_tokens: u32, output_tokens: u32) -> f64 {
    (input_tokens as f64 / 1_000_000.0) * DEFAULT_INPUT_COST_PER_MILLION
        + (output_tokens as f64 / 1_000_000.0) * DEFAULT_OUTPUT_COST_PER_MILLION
}

/// Build the pricing table from every model in the catalog
#[must_use]
pub fn pricing_from_catalog(catalog: &ProviderCatalog) -> HashMap<String, ModelPricing> {
    let now = Utc::now();
    catalog
        .providers()
        .iter()
        .flat_map(|provider| {
            provider.models.iter().map(move |model| {
                (
                    pricing_key(&provider.name, &model.name),
                    ModelPricing {
                        model: model.name.clone(),
                        provider: provider.name.clone(),
                        tier: model.tier,
                        input_cost_per_million: model.input_cost_per_million,
                        output_cost_per_million: model.output_cost_per_million,
                        context_window: model.context_window,
                        updated_at: now,
                    },
                )
            })
        })
        .collect()
}
