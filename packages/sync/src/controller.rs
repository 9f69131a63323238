//! Async driver around [`SyncMachine`].
//!
//! Each controller is one tokio task owning one document. The task waits on
//! the view channel, the store's change broadcast, the single pending timer,
//! template reloads and the dispose signal, and handles whichever fires first
//! to completion before looking at the next one.

use std::collections::VecDeque;
use std::future::pending;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::SyncConfig;
use crate::format::SyncFormat;
use crate::protocol::{HostMessage, ViewMessage};
use crate::state::{Effect, SyncMachine, TimerId};
use crate::store::{DocumentStore, StoreChange, StoreError};
use crate::templates::{TemplateLibrary, TemplateSnapshot};

/// Capacity of the view → controller and controller → view channels
pub const VIEW_CHANNEL_CAPACITY: usize = 100;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Controller has shut down")]
    Closed,
}

pub type SyncResult<T> = Result<T, SyncError>;

/// Notifications for the host application
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Initialized {
        display_name: String,
    },
    Persisted {
        bytes: usize,
        at: DateTime<Utc>,
    },
    PersistFailed {
        error: String,
    },
    /// Store text changed outside the controller and was pushed to the view
    ExternalChange,
    /// A store notification was attributed to our own write
    EchoSuppressed,
    Passthrough {
        kind: String,
        payload: serde_json::Value,
    },
    Warning {
        message: String,
    },
    Disposed,
}

#[derive(Default)]
pub struct ControllerOptions {
    pub config: SyncConfig,
    /// Overrides [`DocumentStore::display_name`]
    pub display_name: Option<String>,
    pub templates: Option<Arc<TemplateLibrary>>,
    pub observer: Option<mpsc::UnboundedSender<SyncEvent>>,
}

/// Host side of a running controller
pub struct ControllerHandle<F: SyncFormat> {
    view_tx: mpsc::Sender<ViewMessage<F::Edit>>,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl<F: SyncFormat> ControllerHandle<F> {
    /// Deliver a message as if it came from the view
    pub async fn send(&self, message: ViewMessage<F::Edit>) -> SyncResult<()> {
        self.view_tx
            .send(message)
            .await
            .map_err(|_| SyncError::Closed)
    }

    pub fn sender(&self) -> mpsc::Sender<ViewMessage<F::Edit>> {
        self.view_tx.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the controller: the pending timer is cancelled, the store
    /// subscription dropped and an in-flight write left to finish on its own.
    pub async fn dispose(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            warn!("controller task failed: {}", e);
        }
    }
}

/// Start a controller for `store`.
///
/// Returns the handle and the receiver for messages addressed to the view.
/// Dropping the handle or every view sender also disposes the controller.
pub fn spawn<F, S>(
    format: F,
    store: Arc<S>,
    options: ControllerOptions,
) -> (ControllerHandle<F>, mpsc::Receiver<HostMessage<F::Model>>)
where
    F: SyncFormat,
    S: DocumentStore,
{
    let (view_tx, view_rx) = mpsc::channel(VIEW_CHANNEL_CAPACITY);
    let (host_tx, host_rx) = mpsc::channel(VIEW_CHANNEL_CAPACITY);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let display_name = options
        .display_name
        .unwrap_or_else(|| store.display_name());
    let span = info_span!("sync", document = %display_name);

    let controller = SyncController {
        format,
        store,
        machine: SyncMachine::new(options.config),
        model: None,
        display_name,
        templates: options.templates,
        observer: options.observer,
        to_view: host_tx,
        timer: None,
    };
    let task = tokio::spawn(controller.run(view_rx, shutdown_rx).instrument(span));

    (
        ControllerHandle {
            view_tx,
            shutdown: shutdown_tx,
            task,
        },
        host_rx,
    )
}

enum LoopEvent<E> {
    Shutdown,
    View(ViewMessage<E>),
    Store(Result<StoreChange, RecvError>),
    Timer(TimerId),
    Templates(Option<TemplateSnapshot>),
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

struct SyncController<F: SyncFormat, S> {
    format: F,
    store: Arc<S>,
    machine: SyncMachine,
    /// Model last pushed to (or derived for) the view; mutations apply here
    model: Option<F::Model>,
    display_name: String,
    templates: Option<Arc<TemplateLibrary>>,
    observer: Option<mpsc::UnboundedSender<SyncEvent>>,
    to_view: mpsc::Sender<HostMessage<F::Model>>,
    timer: Option<(TimerId, Instant)>,
}

impl<F: SyncFormat, S: DocumentStore> SyncController<F, S> {
    async fn run(
        mut self,
        mut view_rx: mpsc::Receiver<ViewMessage<F::Edit>>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut changes = Some(self.store.subscribe());
        let mut template_rx = self.templates.as_ref().map(|library| library.subscribe());
        debug!("controller started");

        loop {
            let event = tokio::select! {
                biased;
                _ = shutdown.changed() => LoopEvent::Shutdown,
                message = view_rx.recv() => match message {
                    Some(message) => LoopEvent::View(message),
                    None => LoopEvent::Shutdown,
                },
                timer = next_timer(self.timer) => LoopEvent::Timer(timer),
                change = next_change(&mut changes) => LoopEvent::Store(change),
                snapshot = next_templates(&mut template_rx) => LoopEvent::Templates(snapshot),
            };

            let flow = match event {
                LoopEvent::Shutdown => Flow::Stop,
                LoopEvent::View(message) => self.handle_view(message, &mut shutdown).await,
                LoopEvent::Timer(timer) => {
                    self.timer = None;
                    let effects = self.machine.on_timer(timer);
                    self.execute(effects, &mut shutdown).await
                }
                LoopEvent::Store(Ok(StoreChange::Modified)) => {
                    self.handle_store_change(&mut shutdown).await
                }
                LoopEvent::Store(Err(RecvError::Lagged(skipped))) => {
                    debug!(skipped, "store notifications lagged");
                    self.handle_store_change(&mut shutdown).await
                }
                LoopEvent::Store(Ok(StoreChange::Removed)) => {
                    debug!("document removed from store");
                    Flow::Continue
                }
                LoopEvent::Store(Err(RecvError::Closed)) => {
                    debug!("store stopped sending notifications");
                    changes = None;
                    Flow::Continue
                }
                LoopEvent::Templates(Some(snapshot)) => {
                    self.push(HostMessage::Templates {
                        templates: snapshot.to_vec(),
                    })
                    .await
                }
                LoopEvent::Templates(None) => {
                    template_rx = None;
                    Flow::Continue
                }
            };

            if flow == Flow::Stop {
                break;
            }
        }

        self.timer = None;
        drop(changes);
        debug!("controller disposed");
        self.emit(SyncEvent::Disposed);
    }

    async fn handle_view(
        &mut self,
        message: ViewMessage<F::Edit>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Flow {
        match message {
            ViewMessage::Ready => match self.read_store().await {
                Ok(text) => {
                    let effects = self.machine.on_ready(text);
                    self.emit(SyncEvent::Initialized {
                        display_name: self.display_name.clone(),
                    });
                    self.execute(effects, shutdown).await
                }
                Err(e) => {
                    self.warn(format!("Failed to read document: {}", e));
                    Flow::Continue
                }
            },

            ViewMessage::Update { content } => {
                let effects = self.machine.on_view_update(content);
                if !effects.is_empty() {
                    self.model = Some(self.format.parse(self.machine.last_view_text()));
                }
                self.execute(effects, shutdown).await
            }

            ViewMessage::Edit { mutation } => {
                let model = self
                    .model
                    .get_or_insert_with(|| self.format.parse(self.machine.last_known_text()));
                if !self.format.apply_edit(model, &mutation) {
                    return Flow::Continue;
                }
                let content = self.format.serialize(model);
                if content == self.machine.last_known_text() {
                    debug!(?mutation, "edit left the text unchanged");
                    return Flow::Continue;
                }
                let model = model.clone();

                let effects = self.machine.on_view_update(content.clone());
                if self.push(HostMessage::Update { content, model }).await == Flow::Stop {
                    return Flow::Stop;
                }
                self.execute(effects, shutdown).await
            }

            ViewMessage::RequestTemplates => {
                let templates = self
                    .templates
                    .as_ref()
                    .map(|library| library.snapshot().to_vec())
                    .unwrap_or_default();
                self.push(HostMessage::Templates { templates }).await
            }

            ViewMessage::Passthrough { kind, payload } => {
                debug!(kind = %kind, "passthrough request");
                self.emit(SyncEvent::Passthrough { kind, payload });
                Flow::Continue
            }
        }
    }

    async fn handle_store_change(&mut self, shutdown: &mut watch::Receiver<bool>) -> Flow {
        if self.machine.is_guarding() {
            debug!(phase = ?self.machine.phase(), "ignoring store change during write");
            self.emit(SyncEvent::EchoSuppressed);
            return Flow::Continue;
        }

        let text = match self.read_store().await {
            Ok(text) => text,
            Err(e) => {
                self.warn(format!("Failed to read document: {}", e));
                return Flow::Continue;
            }
        };

        let effects = self.machine.on_store_text(text);
        if effects.is_empty() {
            debug!("store change matches known content");
            self.emit(SyncEvent::EchoSuppressed);
            return Flow::Continue;
        }
        self.execute(effects, shutdown).await
    }

    async fn read_store(&self) -> SyncResult<String> {
        Ok(self.store.get_text().await?)
    }

    async fn execute(
        &mut self,
        effects: Vec<Effect>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Flow {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::PushInit { content } => {
                    let model = self.format.parse(&content);
                    self.model = Some(model.clone());
                    let message = HostMessage::Init {
                        content,
                        display_name: self.display_name.clone(),
                        model,
                    };
                    if self.push(message).await == Flow::Stop {
                        return Flow::Stop;
                    }
                }

                Effect::PushUpdate { content } => {
                    info!(bytes = content.len(), "external change");
                    let model = self.format.parse(&content);
                    self.model = Some(model.clone());
                    self.emit(SyncEvent::ExternalChange);
                    if self.push(HostMessage::Update { content, model }).await == Flow::Stop {
                        return Flow::Stop;
                    }
                }

                Effect::ArmTimer { timer, after } => {
                    debug!(?timer, ?after, "timer armed");
                    self.timer = Some((timer, Instant::now() + after));
                }

                Effect::Persist { content } => {
                    let bytes = content.len();
                    let store = Arc::clone(&self.store);
                    let write = tokio::spawn(async move { store.replace_all(&content).await });

                    let result = tokio::select! {
                        biased;
                        _ = shutdown.changed() => {
                            debug!("disposed while writing; result will be discarded");
                            return Flow::Stop;
                        }
                        joined = write => match joined {
                            Ok(result) => result.map_err(|e| e.to_string()),
                            Err(e) => Err(e.to_string()),
                        },
                    };

                    match &result {
                        Ok(()) => {
                            info!(bytes, "document saved");
                            self.emit(SyncEvent::Persisted {
                                bytes,
                                at: Utc::now(),
                            });
                        }
                        Err(error) => self.emit(SyncEvent::PersistFailed {
                            error: error.clone(),
                        }),
                    }
                    queue.extend(self.machine.on_persisted(result));
                }

                Effect::Warn { message } => self.warn(message),
            }
        }

        debug!(phase = ?self.machine.phase(), "state");
        Flow::Continue
    }

    async fn push(&self, message: HostMessage<F::Model>) -> Flow {
        match self.to_view.send(message).await {
            Ok(()) => Flow::Continue,
            Err(_) => {
                debug!("view receiver dropped");
                Flow::Stop
            }
        }
    }

    fn warn(&self, message: String) {
        warn!("{}", message);
        self.emit(SyncEvent::Warning { message });
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(observer) = &self.observer {
            let _ = observer.send(event);
        }
    }
}

async fn next_timer(timer: Option<(TimerId, Instant)>) -> TimerId {
    match timer {
        Some((id, deadline)) => {
            sleep_until(deadline).await;
            id
        }
        None => pending().await,
    }
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<StoreChange>>,
) -> Result<StoreChange, RecvError> {
    match changes {
        Some(receiver) => receiver.recv().await,
        None => pending().await,
    }
}

async fn next_templates(
    receiver: &mut Option<watch::Receiver<TemplateSnapshot>>,
) -> Option<TemplateSnapshot> {
    match receiver {
        Some(receiver) => match receiver.changed().await {
            Ok(()) => Some(receiver.borrow_and_update().clone()),
            Err(_) => None,
        },
        None => pending().await,
    }
}
