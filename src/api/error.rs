use reqwest::StatusCode;
use thiserror::Error;

use super::adapters::AdapterError;

/// Transport and backend failures. The UI treats every variant alike; the
/// detail is kept for logs.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Request timed out")]
    Timeout,
    #[error("Not signed in or session expired")]
    Unauthorized,
    #[error("Access denied")]
    Forbidden,
    #[error("Resource not found")]
    NotFound,
    #[error("Conflicts with an existing record: {0}")]
    Conflict(String),
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Could not decode response: {0}")]
    Decode(String),
    #[error("Client setup failed: {0}")]
    Setup(String),
    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

impl GatewayError {
    /// Whether retrying the same request might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Timeout | GatewayError::Network(_) | GatewayError::Server { .. }
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GatewayError::Timeout
        } else if let Some(status) = error.status() {
            map_status_code(status, error.to_string())
        } else if error.is_decode() {
            GatewayError::Decode(error.to_string())
        } else {
            GatewayError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(error: serde_json::Error) -> Self {
        GatewayError::Decode(error.to_string())
    }
}

pub(crate) fn map_status_code(code: StatusCode, message: String) -> GatewayError {
    match code {
        StatusCode::UNAUTHORIZED => GatewayError::Unauthorized,
        StatusCode::FORBIDDEN => GatewayError::Forbidden,
        StatusCode::NOT_FOUND => GatewayError::NotFound,
        StatusCode::CONFLICT => GatewayError::Conflict(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => GatewayError::Timeout,
        _ if code.is_server_error() => GatewayError::Server {
            status: code.as_u16(),
            message,
        },
        _ => GatewayError::Rejected {
            status: code.as_u16(),
            message,
        },
    }
}
