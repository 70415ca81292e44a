//! Health check endpoint

use axum::extract::Extension;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use catalyst_llm::LlmRouter;
use serde::Serialize;
use std::sync::Arc;

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Providers with credentials
    pub providers_configured: usize,
}

async fn health(Extension(router): Extension<Arc<LlmRouter>>) -> Json<HealthResponse> {
    let configured = router.list_providers().len();
    Json(HealthResponse {
        status: if configured > 0 { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        providers_configured: configured,
    })
}

pub fn health_routes() -> Router {
    Router::new().route("/health", get(health))
}
