//! Conversation state: messages, send status, input buffer.

use vesper_api::{Message, MessageIds, Role};

/// Process-local conversation state.
#[derive(Debug, Default)]
pub struct Conversation {
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// Whether a send is waiting on the assistant
    pub is_sending: bool,
    /// Current input buffer (untrimmed)
    pub input: String,
    /// Bumped on every successful clear
    pub generation: u64,
    ids: MessageIds,
}

impl Conversation {
    /// Append a new message stamped now and return a copy of it
    pub fn push(&mut self, role: Role, content: impl Into<String>) -> Message {
        let message = self.ids.message(role, content);
        self.messages.push(message.clone());
        message
    }

    /// Replace all messages (used when loading history)
    pub fn replace(&mut self, messages: Vec<Message>) {
        for m in &messages {
            self.ids.observe(&m.id);
        }
        self.messages = messages;
    }

    /// Drop every message and start a new generation
    pub fn clear(&mut self) {
        self.messages.clear();
        self.generation += 1;
    }
}
