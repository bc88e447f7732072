//! In-memory history store and scripted assistant for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Semaphore;
use vesper_api::{Assistant, Error, HistoryStore, Message, Result, Role};

#[derive(Default)]
pub struct MockStore {
    stored: Mutex<Vec<Message>>,
    appended: Mutex<Vec<(Role, String)>>,
    fail_load: AtomicBool,
    fail_append: AtomicBool,
    fail_clear: AtomicBool,
    clears: AtomicUsize,
}

impl MockStore {
    pub fn with_messages(messages: Vec<Message>) -> Self {
        let store = Self::default();
        *store.stored.lock() = messages;
        store
    }

    pub fn appended(&self) -> Vec<(Role, String)> {
        self.appended.lock().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn fail_load(&self, fail: bool) {
        self.fail_load.store(fail, Ordering::SeqCst);
    }

    pub fn fail_append(&self, fail: bool) {
        self.fail_append.store(fail, Ordering::SeqCst);
    }

    pub fn fail_clear(&self, fail: bool) {
        self.fail_clear.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl HistoryStore for MockStore {
    async fn load(&self) -> Result<Vec<Message>> {
        if self.fail_load.load(Ordering::SeqCst) {
            return Err(Error::api(500, Some("Database not configured".into())));
        }
        Ok(self.stored.lock().clone())
    }

    async fn append(&self, role: Role, content: &str) -> Result<()> {
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(Error::api(500, None));
        }
        self.appended.lock().push((role, content.to_string()));
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(Error::api(500, None));
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.stored.lock().clear();
        Ok(())
    }
}

/// Replies with canned results, in order. Falls back to "done".
///
/// When gated, each reply waits for one [`MockAssistant::release`].
#[derive(Default)]
pub struct MockAssistant {
    replies: Mutex<VecDeque<Result<String>>>,
    prompts: Mutex<Vec<String>>,
    gate: Option<Arc<Semaphore>>,
}

impl MockAssistant {
    pub fn new(replies: Vec<Result<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    pub fn gated(replies: Vec<Result<String>>) -> Self {
        Self {
            gate: Some(Arc::new(Semaphore::new(0))),
            ..Self::new(replies)
        }
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl Assistant for MockAssistant {
    async fn complete(&self, message: &str) -> Result<String> {
        self.prompts.lock().push(message.to_string());
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        self.replies
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok("done".to_string()))
    }
}
