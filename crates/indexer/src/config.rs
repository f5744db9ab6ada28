use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = ".keyscope.toml";

const DEFAULT_IGNORED_DIRS: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "target",
    "node_modules",
    "dist",
    "build",
    "out",
];

/// Project configuration (`.keyscope.toml`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyscopeConfig {
    /// File extensions indexed as structured documents.
    pub extensions: Vec<String>,
    /// Directory names never scanned or watched.
    pub ignored_dirs: Vec<String>,
    /// Glob patterns matched against root-relative identities.
    pub exclude: Vec<String>,
    pub watcher: WatcherSection,
}

impl Default for KeyscopeConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["yaml".to_string()],
            ignored_dirs: DEFAULT_IGNORED_DIRS.iter().map(ToString::to_string).collect(),
            exclude: Vec::new(),
            watcher: WatcherSection::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatcherSection {
    pub debounce_ms: u64,
    pub max_batch_wait_ms: u64,
    pub poll_interval_ms: u64,
}

impl Default for WatcherSection {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_batch_wait_ms: 2_000,
            poll_interval_ms: 2_000,
        }
    }
}

impl WatcherSection {
    #[must_use]
    pub const fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub const fn max_batch_wait(&self) -> Duration {
        Duration::from_millis(self.max_batch_wait_ms)
    }

    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl KeyscopeConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Read an explicit config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Read `<root>/.keyscope.toml`, falling back to defaults when absent.
    pub fn load_for_root(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            log::debug!("No {CONFIG_FILE_NAME} under {}, using defaults", root.display());
            return Ok(Self::default());
        }
        log::info!("Loading config from {}", path.display());
        Self::load(&path)
    }
}
