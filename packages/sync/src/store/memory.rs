use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::broadcast;

use super::{DocumentStore, StoreChange, StoreError, StoreResult, CHANGE_CHANNEL_CAPACITY};

/// In-memory document, behaving like an open editor buffer
pub struct MemoryStore {
    name: String,
    text: Mutex<String>,
    writes: Mutex<Vec<String>>,
    fail_writes: AtomicBool,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            name: name.into(),
            text: Mutex::new(text.into()),
            writes: Mutex::new(Vec::new()),
            fail_writes: AtomicBool::new(false),
            changes,
        }
    }

    /// Simulate an edit made outside the controller
    pub fn set_external(&self, text: impl Into<String>) {
        *lock(&self.text) = text.into();
        let _ = self.changes.send(StoreChange::Modified);
    }

    /// Make subsequent `replace_all` calls fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Every successful `replace_all`, in order
    pub fn writes(&self) -> Vec<String> {
        lock(&self.writes).clone()
    }

    pub fn text(&self) -> String {
        lock(&self.text).clone()
    }
}

// A panic while holding these locks cannot leave the data half-written.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_text(&self) -> StoreResult<String> {
        Ok(self.text())
    }

    async fn replace_all(&self, text: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("writes disabled".to_string()));
        }
        *lock(&self.text) = text.to_string();
        lock(&self.writes).push(text.to_string());
        let _ = self.changes.send(StoreChange::Modified);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }
}
