//! API error responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use catalyst_core::Error as CoreError;
use catalyst_llm::Error as LlmError;
use serde::Serialize;
use tracing::{error, warn};

/// Error envelope body
#[derive(Debug, Serialize)]
struct ErrorBody {
    success: bool,
    error: String,
    code: &'static str,
}

/// Error returned by handlers
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "validation_error",
            message: message.into(),
        }
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (status, code) = match &err {
            CoreError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            CoreError::Llm(LlmError::InvalidRequest(_) | LlmError::ContextLength(_)) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            CoreError::Llm(LlmError::AllProvidersFailed { .. }) => {
                (StatusCode::BAD_GATEWAY, "all_providers_failed")
            }
            CoreError::Llm(LlmError::NoProviderAvailable { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "no_provider_available")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };

        if status.is_server_error() {
            error!(code, error = %err, "Request failed");
        } else {
            warn!(code, error = %err, "Request rejected");
        }

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl From<LlmError> for ApiError {
    fn from(err: LlmError) -> Self {
        CoreError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}
