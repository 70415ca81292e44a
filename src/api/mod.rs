//! Web API module for Catalyst
//!
//! - `GET /health`
//! - `GET /api/v1/providers`, `POST /api/v1/providers/test`
//! - `GET /api/v1/usage`
//! - `POST /api/v1/analysis`, `POST /api/v1/whisper`

mod analysis;
mod error;
mod health;
mod providers;
mod usage;


use axum::{Extension, Router};
use catalyst_core::AnalysisService;
use catalyst_llm::LlmRouter;
use serde::Serialize;
use std::sync::Arc;

pub use error::ApiError;

/// Success envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            data,
        })
    }
}

/// Create the application with all endpoints and shared state
pub fn app(router: Arc<LlmRouter>, analysis: AnalysisService) -> Router {
    Router::new()
        .merge(health::health_routes())
        .merge(providers::providers_routes())
        .merge(usage::usage_routes())
        .merge(analysis::analysis_routes())
        .layer(Extension(router))
        .layer(Extension(analysis))
}
