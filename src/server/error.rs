//! Mapping of analysis failures onto HTTP responses.

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::analysis::AnalysisError;
use crate::parsers::ParseError;

/// Errors returned by API handlers. Bodies are `{"detail": ...}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Rejected(#[from] MultipartRejection),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(e) => e.status(),
            ApiError::Rejected(_) => StatusCode::BAD_REQUEST,
            ApiError::Analysis(AnalysisError::ProviderNotAvailable { .. }) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Analysis(AnalysisError::Parse(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        match &self {
            ApiError::Analysis(AnalysisError::Parse(ParseError::ToolNotFound(tool))) => {
                tracing::error!("Cannot parse upload, missing tool: {}", tool);
            }
            ApiError::Analysis(AnalysisError::Parse(ParseError::Io(e))) => {
                tracing::error!("I/O failure while parsing upload: {}", e);
            }
            _ => tracing::info!("Rejecting request ({}): {}", status.as_u16(), self),
        }

        let body = match &self {
            ApiError::Analysis(AnalysisError::ProviderNotAvailable { available, .. }) => {
                serde_json::json!({
                    "detail": self.to_string(),
                    "available_providers": available,
                })
            }
            _ => serde_json::json!({ "detail": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
