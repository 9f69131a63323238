//! Echo-suppression and debounce state machine.
//!
//! [`SyncMachine`] holds no timers and performs no I/O. Every input returns a
//! list of [`Effect`]s for the driver to execute, so the transitions can be
//! tested without a runtime.
//!
//! ```text
//!            view update (new content)
//!   Idle ───────────────────────────────► AwaitingPersist { debounce: Some }
//!    ▲                                        │ debounce timer fires
//!    │                                        ▼
//!    │                                  AwaitingPersist { debounce: None }
//!    │                                        │ write completes (ok or failed)
//!    │  settle timer fires                    ▼
//!    └──────────────────────────────── AwaitingEchoSettle { settle }
//! ```
//!
//! A view update in any phase re-arms the debounce timer. Store notifications
//! are only classified while `Idle`; in the other phases they are this
//! controller's own write reflecting back.

use std::time::Duration;

use crate::config::SyncConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerKind {
    Debounce,
    Settle,
}

/// Identifies one arming of a timer.
///
/// Re-arming produces a new id; a fired timer whose id is no longer current
/// is stale and ignored, which is how cancellation works.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId {
    pub kind: TimerKind,
    generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    /// No view edit pending
    Idle,
    /// Debounce armed (`Some`) or the write is in flight (`None`)
    AwaitingPersist { debounce: Option<TimerId> },
    /// Write finished, swallowing its change notifications
    AwaitingEchoSettle { settle: TimerId },
}

/// Work requested by the machine
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send the initial content to the view
    PushInit { content: String },
    /// Send externally changed content to the view
    PushUpdate { content: String },
    /// Start (or restart) the single pending timer
    ArmTimer { timer: TimerId, after: Duration },
    /// Replace the whole store text
    Persist { content: String },
    /// Report a non-fatal problem
    Warn { message: String },
}

#[derive(Debug, Clone)]
pub struct SyncMachine {
    config: SyncConfig,
    phase: SyncPhase,
    last_known_text: String,
    last_view_text: String,
    generation: u64,
}

impl SyncMachine {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            phase: SyncPhase::Idle,
            last_known_text: String::new(),
            last_view_text: String::new(),
            generation: 0,
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn last_known_text(&self) -> &str {
        &self.last_known_text
    }

    pub fn last_view_text(&self) -> &str {
        &self.last_view_text
    }

    /// True while store notifications are expected to be our own echo
    pub fn is_guarding(&self) -> bool {
        self.phase != SyncPhase::Idle
    }

    fn next_timer(&mut self, kind: TimerKind) -> TimerId {
        self.generation += 1;
        TimerId {
            kind,
            generation: self.generation,
        }
    }

    /// The view is ready; `current` is the store text read for it
    pub fn on_ready(&mut self, current: String) -> Vec<Effect> {
        self.last_known_text = current.clone();
        vec![Effect::PushInit { content: current }]
    }

    /// The view produced new full content
    pub fn on_view_update(&mut self, content: String) -> Vec<Effect> {
        if content == self.last_known_text {
            return Vec::new();
        }

        self.last_known_text = content.clone();
        self.last_view_text = content;

        let timer = self.next_timer(TimerKind::Debounce);
        self.phase = SyncPhase::AwaitingPersist {
            debounce: Some(timer),
        };
        vec![Effect::ArmTimer {
            timer,
            after: self.config.debounce,
        }]
    }

    pub fn on_timer(&mut self, timer: TimerId) -> Vec<Effect> {
        match self.phase {
            SyncPhase::AwaitingPersist {
                debounce: Some(current),
            } if current == timer => {
                self.phase = SyncPhase::AwaitingPersist { debounce: None };
                vec![Effect::Persist {
                    content: self.last_view_text.clone(),
                }]
            }
            SyncPhase::AwaitingEchoSettle { settle } if settle == timer => {
                self.phase = SyncPhase::Idle;
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    /// The write requested by [`Effect::Persist`] finished.
    ///
    /// Failures are not retried and nothing is rolled back: the view keeps
    /// what the user typed until the next external change or reopen.
    pub fn on_persisted(&mut self, result: Result<(), String>) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Err(error) = result {
            effects.push(Effect::Warn {
                message: format!("Failed to save document: {}", error),
            });
        }

        // A newer edit re-armed the debounce while the write was in flight;
        // its own write will close the window.
        if self.phase == (SyncPhase::AwaitingPersist { debounce: None }) {
            let settle = self.next_timer(TimerKind::Settle);
            self.phase = SyncPhase::AwaitingEchoSettle { settle };
            effects.push(Effect::ArmTimer {
                timer: settle,
                after: self.config.settle,
            });
        }
        effects
    }

    /// The store text after a change notification.
    ///
    /// Returns no effects when the change is classified as an echo. A genuine
    /// external edit that happens to equal our last write is indistinguishable
    /// from an echo and is dropped.
    pub fn on_store_text(&mut self, text: String) -> Vec<Effect> {
        if self.is_guarding() {
            return Vec::new();
        }
        if text == self.last_known_text || text == self.last_view_text {
            return Vec::new();
        }

        self.last_known_text = text.clone();
        vec![Effect::PushUpdate { content: text }]
    }
}
