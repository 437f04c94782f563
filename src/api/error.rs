//! API Error Types
//!
//! Normalized error shape for every backend call.

use thiserror::Error;

/// Errors that can occur when talking to the time-tracking backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Connection refused or host unreachable
    #[error("Backend unavailable at {0}")]
    Unavailable(String),

    /// No response within the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Any other transport failure
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response. `message` is the server-supplied `error` string,
    /// or `Request failed: <status>` when the server sent none.
    #[error("{message}")]
    Status { status: u16, message: String },

    /// 2xx response whose body is missing or has the wrong shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error from an optional server message
    pub fn from_status(status: u16, server_message: Option<&str>) -> Self {
        let message = match server_message.map(str::trim) {
            Some(msg) if !msg.is_empty() => msg.to_string(),
            _ => format!("Request failed: {}", status),
        };
        ApiError::Status { status, message }
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Message shown inline, falling back when the error carries no text
    pub fn message_or(&self, fallback: &str) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
