//! Provider administration endpoints

use super::error::ApiError;
use super::ApiResponse;
use axum::body::Bytes;
use axum::extract::Extension;
use axum::routing::{get, post};
use axum::{Json, Router};
use catalyst_llm::{test_providers, LlmRouter, ProviderStatus, ProviderTestResult};
use serde::Deserialize;
use std::sync::Arc;

/// Body of `POST /api/v1/providers/test`
#[derive(Debug, Default, Deserialize)]
pub struct TestProvidersRequest {
    /// Probe only this provider
    #[serde(default)]
    pub name: Option<String>,
}

async fn list_providers(
    Extension(router): Extension<Arc<LlmRouter>>,
) -> Json<ApiResponse<Vec<ProviderStatus>>> {
    ApiResponse::ok(router.provider_statuses().await)
}

/// An empty body checks every provider; anything else must be valid JSON
async fn test_providers_handler(
    Extension(router): Extension<Arc<LlmRouter>>,
    body: Bytes,
) -> Result<Json<ApiResponse<Vec<ProviderTestResult>>>, ApiError> {
    let request = if body.iter().all(u8::is_ascii_whitespace) {
        TestProvidersRequest::default()
    } else {
        serde_json::from_slice::<TestProvidersRequest>(&body)
            .map_err(|e| ApiError::bad_request(format!("invalid request body: {}", e)))?
    };
    let results = test_providers(&router, request.name.as_deref()).await;
    Ok(ApiResponse::ok(results))
}

pub fn providers_routes() -> Router {
    Router::new()
        .route("/api/v1/providers", get(list_providers))
        .route("/api/v1/providers/test", post(test_providers_handler))
}
