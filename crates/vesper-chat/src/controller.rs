//! Chat controller: owns the conversation and sequences send, load and clear.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::broadcast;
use vesper_api::{Assistant, HistoryStore, Message, Role, filter};

use crate::{
    conversation::Conversation,
    error::Result,
    events::ChatEvent,
    locale::Locale,
    notify::Notification,
    persist::PersistQueue,
};

/// Controller configuration
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    /// Language for notifications
    pub locale: Locale,
}

/// What a call to [`ChatController::send`] ended up doing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or a send was already in flight
    Ignored,
    /// The assistant answered and its reply was appended
    Replied(Message),
    /// The assistant call failed; an error notification was emitted
    Failed,
    /// The assistant answered after the history was cleared; reply dropped
    Discarded,
}

struct Shared {
    config: ChatConfig,
    state: Mutex<Conversation>,
    history: Arc<dyn HistoryStore>,
    assistant: Arc<dyn Assistant>,
    persist: PersistQueue,
    event_tx: broadcast::Sender<ChatEvent>,
}

/// Orchestrates the conversation.
///
/// Cloning is cheap and every clone drives the same conversation, so the UI
/// loop and the cleanup scheduler can hold one each.
#[derive(Clone)]
pub struct ChatController {
    shared: Arc<Shared>,
}

impl ChatController {
    /// Create a controller. Must be called inside a tokio runtime.
    pub fn new(
        config: ChatConfig,
        history: Arc<dyn HistoryStore>,
        assistant: Arc<dyn Assistant>,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        let persist = PersistQueue::spawn(Arc::clone(&history));
        Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(Conversation::default()),
                history,
                assistant,
                persist,
                event_tx,
            }),
        }
    }

    /// Subscribe to chat events
    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.shared.event_tx.subscribe()
    }

    pub fn locale(&self) -> Locale {
        self.shared.config.locale
    }

    /// Snapshot of the messages
    pub fn messages(&self) -> Vec<Message> {
        self.shared.state.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.shared.state.lock().messages.len()
    }

    /// Whether a send is waiting on the assistant
    pub fn is_sending(&self) -> bool {
        self.shared.state.lock().is_sending
    }

    /// Current input buffer
    pub fn input(&self) -> String {
        self.shared.state.lock().input.clone()
    }

    /// Replace the input buffer
    pub fn set_input(&self, input: impl Into<String>) {
        self.shared.state.lock().input = input.into();
    }

    /// Load history from the store, replacing local messages.
    ///
    /// A failed load is logged and leaves the conversation empty.
    pub async fn load(&self) -> usize {
        let messages = match self.shared.history.load().await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load messages");
                Vec::new()
            }
        };
        let count = messages.len();
        self.shared.state.lock().replace(messages);
        tracing::info!(count, "history loaded");
        self.emit(ChatEvent::Loaded { count });
        count
    }

    /// Send the current input buffer
    pub async fn submit_input(&self) -> SendOutcome {
        let input = self.input();
        self.send(&input).await
    }

    /// Send a user message and wait for the assistant's reply.
    ///
    /// No-op when `text` is blank or another send is in flight. The user
    /// message is appended and queued for persistence before the assistant
    /// is asked.
    pub async fn send(&self, text: &str) -> SendOutcome {
        let (user_message, generation) = {
            let mut state = self.shared.state.lock();
            if text.trim().is_empty() || state.is_sending {
                return SendOutcome::Ignored;
            }
            let message = state.push(Role::User, text);
            self.shared.persist.enqueue(Role::User, text);
            state.input.clear();
            state.is_sending = true;
            (message, state.generation)
        };

        let _sending = SendingGuard { controller: self };
        self.emit(ChatEvent::MessageAppended {
            message: user_message,
        });
        self.emit(ChatEvent::SendStarted);

        match self.shared.assistant.complete(text).await {
            Ok(reply) => {
                let content = filter(&reply);
                let appended = {
                    let mut state = self.shared.state.lock();
                    if state.generation == generation {
                        self.shared.persist.enqueue(Role::Assistant, content.clone());
                        Some(state.push(Role::Assistant, content))
                    } else {
                        None
                    }
                };
                match appended {
                    Some(message) => {
                        self.emit(ChatEvent::MessageAppended {
                            message: message.clone(),
                        });
                        SendOutcome::Replied(message)
                    }
                    None => {
                        tracing::debug!("history cleared while waiting, dropping reply");
                        SendOutcome::Discarded
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "assistant request failed");
                self.notify(Notification::for_assistant_error(self.locale(), &e));
                SendOutcome::Failed
            }
        }
    }

    /// Clear remote and local history.
    ///
    /// Local messages are only dropped once the store confirms; on failure
    /// they stay and an error notification is emitted.
    pub async fn clear(&self) -> Result<()> {
        match self.shared.history.clear().await {
            Ok(()) => {
                self.shared.state.lock().clear();
                tracing::info!("history cleared");
                self.emit(ChatEvent::Cleared);
                self.notify(Notification::success(self.locale().history_cleared()));
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to clear history");
                self.notify(Notification::error(self.locale().clear_failed()));
                Err(e.into())
            }
        }
    }

    /// Wait for queued history writes to be attempted
    pub async fn flush(&self) {
        self.shared.persist.flush().await;
    }

    fn notify(&self, notification: Notification) {
        self.emit(ChatEvent::Notification { notification });
    }

    fn emit(&self, event: ChatEvent) {
        // No subscribers is fine
        let _ = self.shared.event_tx.send(event);
    }
}

/// Returns the controller to idle when a send ends, even if its future is dropped.
struct SendingGuard<'a> {
    controller: &'a ChatController,
}

impl Drop for SendingGuard<'_> {
    fn drop(&mut self) {
        self.controller.shared.state.lock().is_sending = false;
        self.controller.emit(ChatEvent::SendFinished);
    }
}
