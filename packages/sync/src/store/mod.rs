//! The authoritative copy of a document.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::watcher::WatcherError;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Watcher error: {0}")]
    Watcher(#[from] WatcherError),

    #[error("Write rejected: {0}")]
    Rejected(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Change notification. Carries no text; readers call [`DocumentStore::get_text`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreChange {
    Modified,
    Removed,
}

/// Capacity of each store's change broadcast
pub const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    async fn get_text(&self) -> StoreResult<String>;

    /// Replace the entire text in one write
    async fn replace_all(&self, text: &str) -> StoreResult<()>;

    /// Notifications for every change, including writes made through this store
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;

    fn display_name(&self) -> String;
}
