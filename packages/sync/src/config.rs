use std::time::Duration;

/// Timing for one controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Quiet period after the last view edit before writing
    pub debounce: Duration,
    /// How long store notifications are treated as echo after a write
    pub settle: Duration,
}

impl SyncConfig {
    pub const DEFAULT_DEBOUNCE_MS: u64 = 150;
    pub const DEFAULT_SETTLE_MS: u64 = 100;

    pub fn from_millis(debounce_ms: u64, settle_ms: u64) -> Self {
        Self {
            debounce: Duration::from_millis(debounce_ms),
            settle: Duration::from_millis(settle_ms),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::from_millis(Self::DEFAULT_DEBOUNCE_MS, Self::DEFAULT_SETTLE_MS)
    }
}
