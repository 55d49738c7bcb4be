use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::index::IndexError;

/// Unique error codes for client identification
#[derive(Debug, Clone, Copy)]
pub enum ErrorCode {
    // Validation errors (2xxx)
    ValidationFailed = 2001,

    // Index state errors (3xxx)
    IndexNotReady = 3001,

    // Document errors (4xxx)
    DocumentUnreadable = 4001,
    EmptyDocument = 4002,

    // External service errors (5xxx)
    EmbeddingServiceError = 5001,
    CompletionServiceError = 5002,

    // Storage errors (6xxx)
    IndexStorage = 6001,
    IndexCorrupt = 6002,

    // Internal errors (9xxx)
    InternalError = 9001,
    ConfigurationError = 9002,
    SerializationError = 9003,
}

impl ErrorCode {
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }
}

/// Error types for the question-answering pipeline
#[derive(Error, Debug)]
pub enum AppError {
    // Validation errors
    #[error("Validation failed: {0}")]
    ValidationError(String),

    // Index state errors
    #[error("Index not ready. Check document presence and server logs")]
    IndexNotReady,

    // Document errors
    #[error("Cannot read document {path}: {message}")]
    DocumentUnreadable { path: String, message: String },

    #[error("No text extracted from document. Ensure the PDF is text-based or run OCR for scanned PDFs")]
    EmptyDocument,

    // External service errors
    #[error("Embedding service error: {0}")]
    EmbeddingService(String),

    #[error("Completion service error: {0}")]
    CompletionService(String),

    // Storage errors
    #[error("Index storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    // Internal errors
    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl AppError {
    /// Get the error code for this error type
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::ValidationError(_) => ErrorCode::ValidationFailed,
            Self::IndexNotReady => ErrorCode::IndexNotReady,
            Self::DocumentUnreadable { .. } => ErrorCode::DocumentUnreadable,
            Self::EmptyDocument => ErrorCode::EmptyDocument,
            Self::EmbeddingService(_) => ErrorCode::EmbeddingServiceError,
            Self::CompletionService(_) => ErrorCode::CompletionServiceError,
            Self::Io(_) => ErrorCode::IndexStorage,
            Self::Index(_) => ErrorCode::IndexCorrupt,
            Self::InternalError(_) => ErrorCode::InternalError,
            Self::ConfigError(_) => ErrorCode::ConfigurationError,
            Self::SerializationError(_) => ErrorCode::SerializationError,
        }
    }

    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::IndexNotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::DocumentUnreadable { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmptyDocument => StatusCode::INTERNAL_SERVER_ERROR,
            Self::EmbeddingService(_) => StatusCode::BAD_GATEWAY,
            Self::CompletionService(_) => StatusCode::BAD_GATEWAY,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Index(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ConfigError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();
        let message = self.to_string();

        // Log based on severity
        match &self {
            AppError::ValidationError(_) => {
                tracing::debug!(error_code = error_code.as_u16(), %message, "Client error");
            }
            AppError::IndexNotReady => {
                tracing::info!(error_code = error_code.as_u16(), %message, "Index not ready");
            }
            _ => {
                tracing::error!(error_code = error_code.as_u16(), %message, error = ?self, "Server error");
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code.as_u16(),
                "status": status.as_u16(),
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
