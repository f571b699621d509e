//! Error types for the document compliance service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::types::JobStatus;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Document compliance errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// File parsing error
    #[error("Failed to parse file '{filename}': {message}")]
    FileParse { filename: String, message: String },

    /// Unsupported file type
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// Upload exceeds the configured size limit
    #[error("File too large: {size} bytes (limit {limit} bytes)")]
    FileTooLarge { size: usize, limit: usize },

    /// Malformed client request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    /// Job not found
    #[error("Job not found: {0}")]
    JobNotFound(String),

    /// Text generation backend error
    #[error("LLM error: {0}")]
    Llm(String),

    /// Text generation backend answered with a non-success status
    #[error("LLM backend returned HTTP {status}: {body}")]
    LlmStatus { status: u16, body: String },

    /// Illegal job status change
    #[error("Invalid job transition from {from:?} to {to:?}")]
    InvalidTransition { from: JobStatus, to: JobStatus },

    /// Missing or wrong API key
    #[error("Invalid API key")]
    Unauthorized,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a file parse error
    pub fn file_parse(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FileParse {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an LLM error
    pub fn llm(message: impl Into<String>) -> Self {
        Self::Llm(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether a text generation call failing with this error may succeed on retry
    pub fn is_transient(&self) -> bool {
        match self {
            Error::LlmStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Error::Http(_) => true,
            _ => false,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::Config(msg) => (StatusCode::SERVICE_UNAVAILABLE, "config_error", msg.clone()),
            Error::FileParse { filename, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "parse_error",
                format!("Failed to parse '{}': {}", filename, message),
            ),
            Error::UnsupportedFileType(ext) => (
                StatusCode::BAD_REQUEST,
                "unsupported_type",
                format!("Unsupported file type: {}", ext),
            ),
            Error::FileTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "file_too_large", self.to_string())
            }
            Error::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, "invalid_request", msg.clone()),
            Error::DocumentNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Document not found: {}", id),
            ),
            Error::JobNotFound(id) => (
                StatusCode::NOT_FOUND,
                "not_found",
                format!("Job not found: {}", id),
            ),
            Error::Llm(msg) => (StatusCode::SERVICE_UNAVAILABLE, "llm_error", msg.clone()),
            Error::LlmStatus { .. } => (StatusCode::BAD_GATEWAY, "llm_error", self.to_string()),
            Error::InvalidTransition { .. } => {
                (StatusCode::CONFLICT, "invalid_transition", self.to_string())
            }
            Error::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized", self.to_string()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (
                StatusCode::BAD_GATEWAY,
                "http_error",
                err.to_string(),
            ),
            Error::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg.clone())
            }
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        let rate_limited = Error::LlmStatus { status: 429, body: String::new() };
        let unavailable = Error::LlmStatus { status: 503, body: String::new() };
        let bad_request = Error::LlmStatus { status: 400, body: String::new() };
        let not_found = Error::LlmStatus { status: 404, body: String::new() };

        assert!(rate_limited.is_transient());
        assert!(unavailable.is_transient());
        assert!(!bad_request.is_transient());
        assert!(!not_found.is_transient());
        assert!(!Error::Config("no key".into()).is_transient());
    }

    #[test]
    fn test_not_found_status() {
        let response = Error::DocumentNotFound("doc-1".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = Error::FileTooLarge { size: 10, limit: 5 }.into_response();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}
