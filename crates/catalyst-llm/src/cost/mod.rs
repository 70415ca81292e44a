//! Cost Tracking - LLM usage and cost reporting
//!
//! # Module Structure
//!
//! - `pricing`: Model pricing derived from the provider catalog
//! - `record`: Usage records and statistics types
//! - `tracker`: CostTracker implementation and daily budget
//! - `report`: Cost reports and savings analysis

mod pricing;
mod record;
mod report;
mod tracker;


pub use pricing::{pricing_from_catalog, pricing_key, ModelPricing};
pub use record::{ModelStats, ProviderStats, UsageEvent, UsageRecord, UsageStats};
pub use report::{CostReport, SavingsPotential};
pub use tracker::{start_of_utc_day, BudgetStatus, CostTracker, DEFAULT_MAX_RECORDS};
