//! Ordered, fire-and-forget history writes.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use vesper_api::{HistoryStore, Role};

enum Command {
    Append { role: Role, content: String },
    Flush(oneshot::Sender<()>),
}

/// Queue of pending history appends, drained by one worker task in order.
///
/// Enqueueing never waits on the network. A failed write is logged and
/// dropped; local state is never rolled back.
#[derive(Clone)]
pub struct PersistQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl PersistQueue {
    /// Start the worker. Must be called inside a tokio runtime.
    pub fn spawn(store: Arc<dyn HistoryStore>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(store, rx));
        Self { tx }
    }

    /// Queue one append
    pub fn enqueue(&self, role: Role, content: impl Into<String>) {
        let command = Command::Append {
            role,
            content: content.into(),
        };
        if self.tx.send(command).is_err() {
            tracing::warn!(%role, "history writer has stopped, message not persisted");
        }
    }

    /// Wait until every append queued before this call has been attempted
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Command::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_worker(store: Arc<dyn HistoryStore>, mut rx: mpsc::UnboundedReceiver<Command>) {
    while let Some(command) = rx.recv().await {
        match command {
            Command::Append { role, content } => {
                if let Err(e) = store.append(role, &content).await {
                    tracing::warn!(%role, error = %e, "Failed to save message");
                }
            }
            Command::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("history writer finished");
}
