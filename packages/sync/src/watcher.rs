use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::store::StoreChange;

#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to create watcher: {0}")]
    CreateError(#[from] notify::Error),

    #[error("Watch error: {0}")]
    WatchError(String),
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Watches a single file and forwards its changes to a broadcast channel.
///
/// The parent directory is watched instead of the file itself so that
/// editors which save by rename keep producing events.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FileWatcher {
    pub fn watch_file(path: &Path, changes: broadcast::Sender<StoreChange>) -> WatcherResult<Self> {
        let file_name = path
            .file_name()
            .map(|name| name.to_os_string())
            .ok_or_else(|| WatcherError::WatchError(format!("not a file: {}", path.display())))?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Some(change) = classify(&event, &file_name) {
                        let _ = changes.send(change);
                    }
                }
                Err(e) => warn!("file watcher error: {}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;
        debug!(path = %path.display(), "watching file");

        Ok(Self {
            _watcher: watcher,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn classify(event: &Event, file_name: &OsString) -> Option<StoreChange> {
    let ours = event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(file_name.as_os_str()));
    if !ours {
        return None;
    }

    match event.kind {
        EventKind::Remove(_) => Some(StoreChange::Removed),
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Any => {
            Some(StoreChange::Modified)
        }
        EventKind::Access(_) | EventKind::Other => None,
    }
}
