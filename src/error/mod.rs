//! Error types for the TOON codec and the conversion gateway

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Failures raised by a codec while encoding or decoding
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ToonError {
    /// The TOON text could not be parsed. `line` is 1-based.
    #[error("TOON parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("TOON encoding error: {0}")]
    Encode(String),

    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

impl ToonError {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::Encode(message.into())
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        Self::InvalidOptions(message.into())
    }
}

impl From<serde_json::Error> for ToonError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidOptions(err.to_string())
    }
}

/// Failures surfaced to gateway callers as HTTP 400 responses
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// A required field was absent or had the wrong shape. Raised before any
    /// codec call.
    #[error("{0}")]
    Validation(String),

    /// The codec rejected the input.
    #[error("{source}")]
    Codec {
        #[source]
        source: ToonError,
        details: Option<&'static str>,
    },
}

impl GatewayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn codec(source: ToonError) -> Self {
        Self::Codec {
            source,
            details: None,
        }
    }

    pub fn codec_with_details(source: ToonError, details: &'static str) -> Self {
        Self::Codec {
            source,
            details: Some(details),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    /// Short label for log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Codec { .. } => "codec",
        }
    }
}

/// Malformed or mistyped bodies are reported like any other shape problem
impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

/// Wire shape of every failed response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<&'static str>,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::Validation(message) => ErrorBody {
                error: message.clone(),
                details: None,
            },
            Self::Codec { source, details } => ErrorBody {
                error: source.to_string(),
                details: *details,
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Result type for codec operations
pub type ToonResult<T> = Result<T, ToonError>;

/// Result type for gateway handlers
pub type GatewayResult<T> = Result<T, GatewayError>;
