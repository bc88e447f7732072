//! Transient notifications shown to the user

use serde::{Deserialize, Serialize};

use crate::locale::Locale;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
}

/// A short message for the user (a toast in the TUI, a line in plain mode)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub text: String,
}

impl Notification {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NotificationLevel::Error
    }

    /// Notification for a failed assistant request.
    ///
    /// A status error shows the remote message (or a generic fallback); every
    /// other failure reads as a connection problem.
    pub fn for_assistant_error(locale: Locale, error: &vesper_api::Error) -> Self {
        match error {
            vesper_api::Error::Api { message, .. } => {
                Self::error(locale.assistant_error(message.as_deref()))
            }
            _ => Self::error(locale.connection_error()),
        }
    }
}
