use markban_sync::SyncConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "markban.config.json";

/// Markban configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Quiet period before a view edit is saved
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long after a save change notifications are treated as our own
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Directory of `*.md` board templates
    #[serde(default = "default_templates_dir")]
    pub templates_dir: String,

    /// Board opened when no file is given
    #[serde(default = "default_board")]
    pub default_board: String,
}

fn default_debounce_ms() -> u64 {
    SyncConfig::DEFAULT_DEBOUNCE_MS
}

fn default_settle_ms() -> u64 {
    SyncConfig::DEFAULT_SETTLE_MS
}

fn default_templates_dir() -> String {
    ".markban/templates".to_string()
}

fn default_board() -> String {
    "board.md".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::from_millis(self.debounce_ms, self.settle_ms)
    }

    pub fn get_templates_dir(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.templates_dir)
    }

    pub fn get_default_board(&self, cwd: &Path) -> PathBuf {
        cwd.join(&self.default_board)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            settle_ms: default_settle_ms(),
            templates_dir: default_templates_dir(),
            default_board: default_board(),
        }
    }
}
