//! Usage metrics endpoint

use super::{ApiError, ApiResponse};
use axum::extract::{Extension, Query};
use axum::routing::get;
use axum::{Json, Router};
use catalyst_llm::{get_system_usage_metrics, LlmRouter, UsageMetrics};
use chrono::{Duration, Utc};
use serde::Deserialize;
use std::sync::Arc;

/// Longest window accepted (30 days)
const MAX_SINCE_HOURS: i64 = 24 * 30;

/// Query for `GET /api/v1/usage`
#[derive(Debug, Deserialize)]
pub struct UsageQuery {
    /// Only records from the last N hours; all retained records when absent
    pub since_hours: Option<i64>,
}

async fn usage(
    Extension(router): Extension<Arc<LlmRouter>>,
    Query(query): Query<UsageQuery>,
) -> Result<Json<ApiResponse<UsageMetrics>>, ApiError> {
    let since = match query.since_hours {
        Some(hours) if !(1..=MAX_SINCE_HOURS).contains(&hours) => {
            return Err(ApiError::bad_request(format!(
                "since_hours must be between 1 and {}",
                MAX_SINCE_HOURS
            )))
        }
        Some(hours) => Some(Utc::now() - Duration::hours(hours)),
        None => None,
    };

    Ok(ApiResponse::ok(get_system_usage_metrics(&router, since).await))
}

pub fn usage_routes() -> Router {
    Router::new().route("/api/v1/usage", get(usage))
}
