//! Analysis and whisper endpoints

use super::{ApiError, ApiResponse};
use axum::extract::Extension;
use axum::routing::post;
use axum::{Json, Router};
use catalyst_core::{
    AnalysisOutcome, AnalysisRequest, AnalysisService, ConversationTurn, WhisperSuggestion,
};
use serde::Deserialize;

/// Body of `POST /api/v1/whisper`
#[derive(Debug, Deserialize)]
pub struct WhisperRequest {
    pub turns: Vec<ConversationTurn>,
}

async fn analyze(
    Extension(service): Extension<AnalysisService>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<ApiResponse<AnalysisOutcome>>, ApiError> {
    let outcome = service.route_analysis_request(request).await?;
    Ok(ApiResponse::ok(outcome))
}

async fn whisper(
    Extension(service): Extension<AnalysisService>,
    Json(request): Json<WhisperRequest>,
) -> Result<Json<ApiResponse<WhisperSuggestion>>, ApiError> {
    let suggestion = service.whisper_suggestion(&request.turns).await?;
    Ok(ApiResponse::ok(suggestion))
}

pub fn analysis_routes() -> Router {
    Router::new()
        .route("/api/v1/analysis", post(analyze))
        .route("/api/v1/whisper", post(whisper))
}
