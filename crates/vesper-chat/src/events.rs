//! Chat event types

use serde::{Deserialize, Serialize};
use vesper_api::Message;

use crate::notify::Notification;

/// Events emitted by the chat controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// History was (re)loaded from the store
    Loaded { count: usize },

    /// A message was appended to the conversation
    MessageAppended { message: Message },

    /// A send started waiting on the assistant
    SendStarted,

    /// The send finished, successfully or not
    SendFinished,

    /// Local and remote history were cleared
    Cleared,

    /// Something to show the user
    Notification { notification: Notification },
}
