//! Board templates offered to views.
//!
//! One [`TemplateLibrary`] is created by the host, initialized with a
//! directory, and shared with every controller through an `Arc`. Readers get
//! immutable snapshots; a reload publishes a new snapshot to all subscribers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub name: String,
    pub content: String,
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read templates from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template library has no directory; call init first")]
    NotInitialized,

    #[error("Template library has been disposed")]
    Disposed,
}

pub type TemplateSnapshot = Arc<Vec<Template>>;

pub struct TemplateLibrary {
    dir: Mutex<Option<PathBuf>>,
    sender: Mutex<Option<watch::Sender<TemplateSnapshot>>>,
    receiver: watch::Receiver<TemplateSnapshot>,
}

impl Default for TemplateLibrary {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateLibrary {
    /// An empty library
    pub fn new() -> Self {
        let (sender, receiver) = watch::channel(Arc::new(Vec::new()));
        Self {
            dir: Mutex::new(None),
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// Load every `*.md` file in `dir`. Returns the number of templates.
    pub async fn init(&self, dir: impl AsRef<Path>) -> Result<usize, TemplateError> {
        let dir = dir.as_ref().to_path_buf();
        *lock(&self.dir) = Some(dir);
        self.reload().await
    }

    /// Re-read the directory given to [`init`](Self::init)
    pub async fn reload(&self) -> Result<usize, TemplateError> {
        let dir = lock(&self.dir).clone().ok_or(TemplateError::NotInitialized)?;
        let templates = load_dir(&dir).await?;
        let count = templates.len();

        let sender = lock(&self.sender);
        let sender = sender.as_ref().ok_or(TemplateError::Disposed)?;
        sender.send_replace(Arc::new(templates));
        info!(dir = %dir.display(), count, "loaded templates");
        Ok(count)
    }

    /// Current templates
    pub fn snapshot(&self) -> TemplateSnapshot {
        self.receiver.borrow().clone()
    }

    /// Receiver that wakes on every reload. Closed once the library is disposed.
    pub fn subscribe(&self) -> watch::Receiver<TemplateSnapshot> {
        match lock(&self.sender).as_ref() {
            Some(sender) => sender.subscribe(),
            None => {
                let (_, receiver) = watch::channel(Arc::new(Vec::new()));
                receiver
            }
        }
    }

    /// Drop all templates and close every subscription
    pub fn dispose(&self) {
        if let Some(sender) = lock(&self.sender).take() {
            sender.send_replace(Arc::new(Vec::new()));
            debug!("template library disposed");
        }
        *lock(&self.dir) = None;
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.sender).is_none()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn load_dir(dir: &Path) -> Result<Vec<Template>, TemplateError> {
    let io_error = |source| TemplateError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_error)?;
    let mut templates = Vec::new();

    while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
            continue;
        }
        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| TemplateError::Io {
                path: path.clone(),
                source,
            })?;
        templates.push(Template {
            name: name.to_string(),
            content,
        });
    }

    templates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(templates)
}
