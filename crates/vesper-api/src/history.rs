//! Remote conversation history store

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    http::check_status,
    types::{Message, Role},
};

/// The three operations the chat runtime needs from a history store.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Fetch every stored message, oldest first
    async fn load(&self) -> Result<Vec<Message>>;

    /// Persist one message
    async fn append(&self, role: Role, content: &str) -> Result<()>;

    /// Delete all stored messages
    async fn clear(&self) -> Result<()>;
}

/// History store reached over HTTP: `GET` lists, `POST` appends, `DELETE` clears.
pub struct HistoryClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    messages: Option<Vec<StoredMessage>>,
}

#[derive(Debug, Deserialize)]
struct StoredMessage {
    #[serde(default)]
    id: Option<String>,
    role: String,
    content: String,
    timestamp: String,
}

#[derive(Debug, Serialize)]
struct AppendRequest<'a> {
    role: Role,
    content: &'a str,
}

impl HistoryClient {
    /// Create a client for the history resource at `url`
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
impl HistoryStore for HistoryClient {
    async fn load(&self) -> Result<Vec<Message>> {
        tracing::debug!(url = %self.url, "loading history");
        let response = check_status(self.client.get(&self.url).send().await?).await?;
        let body = response.text().await?;
        let parsed: HistoryResponse = serde_json::from_str(&body)?;

        // Unreadable rows are dropped individually
        let messages = parsed
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|stored| match convert_stored(stored) {
                Ok(message) => Some(message),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable history record");
                    None
                }
            })
            .collect();
        Ok(messages)
    }

    async fn append(&self, role: Role, content: &str) -> Result<()> {
        tracing::debug!(%role, len = content.len(), "appending to history");
        let response = self
            .client
            .post(&self.url)
            .json(&AppendRequest { role, content })
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        tracing::debug!(url = %self.url, "clearing history");
        let response = self.client.delete(&self.url).send().await?;
        check_status(response).await?;
        Ok(())
    }
}

fn convert_stored(stored: StoredMessage) -> Result<Message> {
    let role: Role = stored
        .role
        .parse()
        .map_err(Error::UnexpectedResponse)?;
    let timestamp = parse_timestamp(&stored.timestamp).ok_or_else(|| {
        Error::UnexpectedResponse(format!("invalid timestamp: {}", stored.timestamp))
    })?;
    let id = stored
        .id
        .unwrap_or_else(|| timestamp.timestamp_millis().to_string());

    Ok(Message {
        id,
        role,
        content: stored.content,
        timestamp,
    })
}

/// Parse a stored timestamp.
///
/// Accepts RFC 3339 with an offset, or a naive ISO-8601 datetime which is taken
/// as local time (the store writes `created_at` without a zone).
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
