//! Error types for vesper-api

use thiserror::Error;

/// Result type alias using vesper-api Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the history store or the assistant
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed (connection refused, DNS, timeout, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Remote endpoint answered with a non-success status
    #[error("API error: status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Api {
        status: u16,
        /// The `error` field of the response body, when there was one
        message: Option<String>,
    },

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Invalid configuration (bad URL, client builder failure)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Create an API error from a status code and optional remote message
    pub fn api(status: u16, message: Option<String>) -> Self {
        Self::Api { status, message }
    }

    /// The message reported by the remote side, if any
    pub fn remote_message(&self) -> Option<&str> {
        match self {
            Error::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }
}
