// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// HTTP error mapping

use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{ErrorKind, PipelineError};

pub type ServerResult<T> = Result<T, ServerError>;

/// Server error types
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Not found")]
    NotFound,
}

/// API error response structure
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl ServerError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServerError::Pipeline(err) => match err.kind() {
                ErrorKind::UnsupportedFormat => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ErrorKind::DecodeError => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::DetectionEngineError => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::InvalidReference => StatusCode::BAD_REQUEST,
                ErrorKind::StorageError | ErrorKind::ConfigError | ErrorKind::MaskError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Multipart(err) => err.status(),
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServerError::NotFound => StatusCode::NOT_FOUND,
        }
    }

    /// Get error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ServerError::Pipeline(err) => err.kind().as_str(),
            ServerError::BadRequest(_) => "BAD_REQUEST",
            ServerError::Multipart(err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                "PAYLOAD_TOO_LARGE"
            }
            ServerError::Multipart(_) => "BAD_REQUEST",
            ServerError::Internal(_) => "INTERNAL_ERROR",
            ServerError::NotFound => "NOT_FOUND",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.error_code(), error = %self, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Internal(format!("worker task failed: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentFormat;

    #[test]
    fn test_pipeline_status_mapping() {
        let cases = [
            (
                PipelineError::UnsupportedFormat("a.csv".into()),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                "UNSUPPORTED_FORMAT",
            ),
            (
                PipelineError::Decode {
                    format: DocumentFormat::Pdf,
                    reason: "bad".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
                "DECODE_ERROR",
            ),
            (
                PipelineError::DetectionEngine("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "DETECTION_ENGINE_ERROR",
            ),
            (
                PipelineError::NotFound("x".into()),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (
                PipelineError::InvalidReference("..".into()),
                StatusCode::BAD_REQUEST,
                "INVALID_REFERENCE",
            ),
            (
                PipelineError::Mask("automaton".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "MASK_ERROR",
            ),
        ];

        for (err, status, code) in cases {
            let err = ServerError::from(err);
            assert_eq!(err.status_code(), status);
            assert_eq!(err.error_code(), code);
        }
    }

    #[test]
    fn test_bad_request_message_is_verbatim() {
        let err = ServerError::BadRequest("No file part".into());
        assert_eq!(err.to_string(), "No file part");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
