//! Keeps a document's persistent store and its live view in sync.
//!
//! Edits from the view are debounced into single whole-document writes;
//! changes from anywhere else are pushed to the view; the controller's own
//! writes echoing back through the store's change notifications are
//! recognized and dropped.

pub mod config;
pub mod controller;
pub mod format;
pub mod protocol;
pub mod state;
pub mod store;
pub mod templates;
pub mod watcher;

#[cfg(test)]
mod tests_controller;

pub use config::SyncConfig;
pub use controller::{spawn, ControllerHandle, ControllerOptions, SyncError, SyncEvent, SyncResult};
pub use format::{BoardFormat, MarkdownFormat, NoEdit, SyncFormat};
pub use protocol::{HostMessage, ViewMessage};
pub use state::{Effect, SyncMachine, SyncPhase, TimerId, TimerKind};
pub use store::{DocumentStore, FileStore, MemoryStore, StoreChange, StoreError, StoreResult};
pub use templates::{Template, TemplateError, TemplateLibrary, TemplateSnapshot};
pub use watcher::{FileWatcher, WatcherError, WatcherResult};
