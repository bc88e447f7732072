//! Remote assistant endpoint

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    http::check_status,
};

/// Something that answers a user message with a single reply.
#[async_trait]
pub trait Assistant: Send + Sync {
    /// Send the user's text and wait for the full reply
    async fn complete(&self, message: &str) -> Result<String>;
}

/// Assistant reached over HTTP: `POST {"message": ...}` → `{"response": ...}`.
pub struct AssistantClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    response: Option<serde_json::Value>,
}

impl AssistantClient {
    /// Create a client for the assistant resource at `url`
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), url)
    }

    /// Create a client reusing an existing reqwest client
    pub fn with_client(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl Assistant for AssistantClient {
    async fn complete(&self, message: &str) -> Result<String> {
        tracing::debug!(url = %self.url, len = message.len(), "requesting completion");
        let response = self
            .client
            .post(&self.url)
            .json(&CompletionRequest { message })
            .send()
            .await?;
        let response = check_status(response).await?;
        let body = response.text().await?;
        let parsed: CompletionResponse = serde_json::from_str(&body)?;

        parsed
            .response
            .map(response_text)
            .ok_or_else(|| Error::UnexpectedResponse("missing `response` field".to_string()))
    }
}

/// Flatten the `response` value into reply text.
///
/// Plain strings pass through. The upstream model wraps its answer as
/// `{"ai_response": {"content": ...}}`; that shape is unwrapped. Anything
/// else is rendered as JSON text.
fn response_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => match other
            .get("ai_response")
            .and_then(|r| r.get("content"))
            .and_then(|c| c.as_str())
        {
            Some(content) => content.to_string(),
            None => other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> AssistantClient {
        AssistantClient::new(format!("{}/chat", server.uri()))
    }

    #[test]
    fn test_response_text_shapes() {
        assert_eq!(response_text(json!("plain")), "plain");
        assert_eq!(
            response_text(json!({"ai_response": {"content": "wrapped"}})),
            "wrapped"
        );
        assert_eq!(response_text(json!(42)), "42");
        assert_eq!(response_text(json!({"other": 1})), r#"{"other":1}"#);
    }

    #[tokio::test]
    async fn test_complete_sends_raw_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat"))
            .and(body_json(json!({"message": "  hi\n"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "response": "hello {meta}!",
                "request_id": "abc"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = client_for(&server).complete("  hi\n").await.unwrap();
        // Filtering is the caller's job
        assert_eq!(reply, "hello {meta}!");
    }

    #[tokio::test]
    async fn test_complete_remote_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(504).set_body_json(json!({"error": "AI API timeout"})))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 504, .. }));
        assert_eq!(err.remote_message(), Some("AI API timeout"));
    }

    #[tokio::test]
    async fn test_complete_remote_error_without_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
            .mount(&server)
            .await;

        let err = client_for(&server).complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 502, message: None }));
    }

    #[tokio::test]
    async fn test_complete_missing_response_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"request_id": "abc"})))
            .mount(&server)
            .await;

        assert!(matches!(
            client_for(&server).complete("hi").await,
            Err(Error::UnexpectedResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_complete_does_not_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "boom"})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).complete("hi").await.is_err());
    }

    #[tokio::test]
    async fn test_complete_connection_refused() {
        let client = AssistantClient::new("http://127.0.0.1:9/chat");
        let err = client.complete("hi").await.unwrap_err();
        assert!(matches!(err, Error::Http(_)));
    }
}
