use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use super::{DocumentStore, StoreChange, StoreResult, CHANGE_CHANNEL_CAPACITY};
use crate::watcher::FileWatcher;

/// A document backed by a file on disk
pub struct FileStore {
    path: PathBuf,
    changes: broadcast::Sender<StoreChange>,
    _watcher: FileWatcher,
}

impl FileStore {
    /// Start watching `path`. The file does not need to exist yet.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        let watcher = FileWatcher::watch_file(&path, changes.clone())?;
        Ok(Self {
            path,
            changes,
            _watcher: watcher,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    async fn get_text(&self) -> StoreResult<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn replace_all(&self, text: &str) -> StoreResult<()> {
        tokio::fs::write(&self.path, text).await?;
        debug!(path = %self.path.display(), bytes = text.len(), "wrote document");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
