//! Core types shared by the history store, the assistant and the UI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// A single message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique within a session, increasing with creation time
    pub id: String,
    pub role: Role,
    /// Message text; assistant text has already been filtered
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with an explicit id and timestamp
    pub fn new(
        id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

/// Hands out message ids derived from creation time.
///
/// Ids are millisecond timestamps; a second id in the same millisecond (or a
/// clock that stepped backwards) gets the previous id plus one.
#[derive(Debug, Default)]
pub struct MessageIds {
    last: i64,
}

impl MessageIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id for a message created at `at`
    pub fn next_for(&mut self, at: DateTime<Utc>) -> String {
        let millis = at.timestamp_millis();
        self.last = if millis > self.last { millis } else { self.last + 1 };
        self.last.to_string()
    }

    /// Record an id that came from elsewhere so new ids stay above it
    pub fn observe(&mut self, id: &str) {
        if let Ok(n) = id.parse::<i64>() {
            self.last = self.last.max(n);
        }
    }

    /// Build a message stamped now
    pub fn message(&mut self, role: Role, content: impl Into<String>) -> Message {
        let now = Utc::now();
        let id = self.next_for(now);
        Message::new(id, role, content, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"assistant\"").unwrap(),
            Role::Assistant
        );
        assert_eq!("user".parse::<Role>(), Ok(Role::User));
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn test_ids_follow_timestamp() {
        let mut ids = MessageIds::new();
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(ids.next_for(t), "1700000000000");
    }

    #[test]
    fn test_ids_same_millisecond_are_bumped() {
        let mut ids = MessageIds::new();
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let a = ids.next_for(t);
        let b = ids.next_for(t);
        assert_eq!(a, "1700000000000");
        assert_eq!(b, "1700000000001");
    }

    #[test]
    fn test_ids_stay_above_observed() {
        let mut ids = MessageIds::new();
        ids.observe("1700000000500");
        ids.observe("not-a-number");
        let t = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        assert_eq!(ids.next_for(t), "1700000000501");
    }

    #[test]
    fn test_message_builder() {
        let mut ids = MessageIds::new();
        let m = ids.message(Role::User, "hi");
        assert!(m.is_user());
        assert!(!m.is_assistant());
        assert_eq!(m.content, "hi");
        assert_eq!(m.id, m.timestamp.timestamp_millis().to_string());
    }
}
