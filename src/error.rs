//! Error handling and custom error types
//!
//! Provides unified error handling across the service using thiserror, and the
//! mapping from those errors to HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Status-code token that marks an upstream rate-limit failure.
const RATE_LIMIT_MARKER: &str = "429";

const RETRY_SUGGESTION: &str = "Please wait a moment and try again.";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI provider error: {0}")]
    AiProvider(String),

    #[error("Missing required fields")]
    MissingFields,

    #[error("Invalid image format")]
    InvalidImageFormat,

    #[error("Empty response from AI (model {model})")]
    ModelOutputEmpty { model: String },

    #[error("JSON parsing failed for model {model}: {reason}")]
    ModelOutputUnparsable { model: String, reason: String },

    #[error("Output from model {model} rejected: {reason}")]
    ModelOutputRejected { model: String, reason: String },

    #[error("All AI models failed: {details}")]
    AllCandidatesExhausted { details: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether this failure carries the upstream rate-limit signal.
    ///
    /// Output-shape failures never do, even though their text could in theory
    /// contain the marker.
    pub fn is_rate_limited(&self) -> bool {
        match self {
            Error::ModelOutputEmpty { .. }
            | Error::ModelOutputUnparsable { .. }
            | Error::ModelOutputRejected { .. } => false,
            other => other.to_string().contains(RATE_LIMIT_MARKER),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// JSON failure envelope returned to HTTP callers.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            client @ (Error::MissingFields | Error::InvalidImageFormat) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: client.to_string(),
                    details: None,
                    suggestion: None,
                },
            ),
            Error::AllCandidatesExhausted { details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "All AI models failed".to_string(),
                    details: Some(details),
                    suggestion: Some(RETRY_SUGGESTION.to_string()),
                },
            ),
            other => {
                tracing::error!("Generation failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "AI Generation failed".to_string(),
                        details: Some(other.to_string()),
                        suggestion: None,
                    },
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_detected_from_status_text() {
        let err = Error::AiProvider(
            "Gemini API error (status 429 Too Many Requests): quota exceeded".to_string(),
        );
        assert!(err.is_rate_limited());
    }

    #[test]
    fn test_other_provider_errors_are_not_rate_limited() {
        let err = Error::AiProvider("Gemini API error (status 404 Not Found): gone".to_string());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_output_failures_never_rate_limited() {
        let err = Error::ModelOutputUnparsable {
            model: "m".to_string(),
            reason: "expected value at line 429".to_string(),
        };
        assert!(!err.is_rate_limited());
        assert!(!Error::ModelOutputEmpty {
            model: "m-429".to_string()
        }
        .is_rate_limited());
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            Error::MissingFields.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::InvalidImageFormat.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            Error::AllCandidatesExhausted {
                details: "x".to_string()
            }
            .into_response()
            .status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            Error::Config("bad".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
