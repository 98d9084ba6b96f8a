use ghwf_util::http::{api_error_message, status_error_message};
use thiserror::Error;

/// Errors returned by [`crate::WorkflowsApi`] operations.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a usable response.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The file content returned by the contents API is not valid base64.
    #[error("failed to decode workflow file: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The response parsed but does not have the expected shape.
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Build a status error from a response body, appending a hint for well-known codes.
    pub fn status(status: u16, body: &str) -> Self {
        let message = api_error_message(body);
        let message = match status_error_message(status) {
            Some(hint) => format!("{message} ({hint})"),
            None => message,
        };
        Self::Status { status, message }
    }

    /// HTTP status code, when the error came from a response.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(error) => error.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}
