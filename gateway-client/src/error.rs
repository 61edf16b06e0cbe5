//! Error types for the gateway client

use gateway_core::dto::errors::FieldErrors;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the gateway client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// The server rejected one or more submitted fields
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// The request needs a valid API token
    #[error("Forbidden: a valid API token is required")]
    Forbidden,

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Map an unsuccessful response to the matching error.
    ///
    /// `resource` names what was requested and is used for not-found errors.
    pub fn from_response(status: u16, body: &str, resource: &str) -> Self {
        match status {
            400 => match serde_json::from_str::<FieldErrors>(body) {
                Ok(errors) if !errors.is_empty() => Self::Validation(errors),
                _ => Self::api_error(status, error_message(body)),
            },
            403 => Self::Forbidden,
            404 => Self::NotFound(resource.to_string()),
            _ => Self::api_error(status, error_message(body)),
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_)) || matches!(self, Self::ApiError { status: 404, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Forbidden | Self::NotFound(_))
            || matches!(self, Self::ApiError { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::ApiError { status, .. } if *status >= 500)
    }
}

/// Pull the message out of an `{"error": "..."}` body, or use the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            if body.is_empty() {
                "Unknown error".to_string()
            } else {
                body.to_string()
            }
        })
}
