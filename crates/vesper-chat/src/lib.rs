//! vesper-chat: chat runtime
//!
//! This crate owns the conversation state and sequences the send, load and
//! clear flows against the history store and the assistant. It also runs the
//! daily cleanup at local midnight.

pub mod controller;
pub mod conversation;
pub mod error;
pub mod events;
pub mod locale;
pub mod notify;
pub mod persist;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use controller::{ChatConfig, ChatController, SendOutcome};
pub use conversation::Conversation;
pub use error::{Error, Result};
pub use events::ChatEvent;
pub use locale::Locale;
pub use notify::{Notification, NotificationLevel};
pub use persist::PersistQueue;
pub use scheduler::{
    CleanupHandle, CleanupPolicy, CleanupScheduler, Clock, SystemClock, delay_until_next_midnight,
};
