//! Shared HTTP helpers for the history and assistant clients.

use std::time::Duration;

use crate::error::{Error, Result};

/// Build a reqwest client, optionally with a whole-request timeout.
///
/// Without a timeout the transport default applies.
pub fn build_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| Error::InvalidConfig(format!("Failed to build HTTP client: {}", e)))
}

/// Pull the `error` field out of a JSON error body, if there is one.
pub(crate) fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").cloned())
        .and_then(|e| match e {
            serde_json::Value::String(s) if !s.is_empty() => Some(s),
            serde_json::Value::Null | serde_json::Value::String(_) => None,
            other => Some(other.to_string()),
        })
}

/// Turn a non-success response into an [`Error::Api`].
pub(crate) async fn status_to_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    Error::api(status, extract_error_message(&body))
}

/// Pass success responses through, convert the rest into errors.
pub(crate) async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_to_error(response).await)
    }
}
