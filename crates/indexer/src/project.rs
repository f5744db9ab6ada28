use crate::config::KeyscopeConfig;
use crate::error::{KeyIndexError, Result};
use crate::event::FileEvent;
use crate::filter::{ExtensionFilter, PathFilter};
use crate::indexer::FileIndexer;
use crate::key_index::{IndexOutcome, KeyIndex};
use crate::scanner::{relative_identity, FileScanner};
use crate::stats::IndexStats;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Key index bound to a project root on disk.
pub struct ProjectIndexer {
    root: PathBuf,
    config: KeyscopeConfig,
    filter: PathFilter,
    keys: Arc<KeyIndex>,
}

impl ProjectIndexer {
    /// Open a project, reading `.keyscope.toml` from the root if present.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = canonical_root(root.as_ref())?;
        let config = KeyscopeConfig::load_for_root(&root)?;
        Self::from_canonical(root, config)
    }

    pub fn with_config(root: impl AsRef<Path>, config: KeyscopeConfig) -> Result<Self> {
        Self::from_canonical(canonical_root(root.as_ref())?, config)
    }

    fn from_canonical(root: PathBuf, config: KeyscopeConfig) -> Result<Self> {
        let filter = PathFilter::from_config(&config)?;
        let indexer = FileIndexer::new(ExtensionFilter::new(&config.extensions));
        Ok(Self {
            root,
            config,
            filter,
            keys: Arc::new(KeyIndex::new(indexer)),
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub const fn config(&self) -> &KeyscopeConfig {
        &self.config
    }

    #[must_use]
    pub const fn filter(&self) -> &PathFilter {
        &self.filter
    }

    #[must_use]
    pub fn keys(&self) -> &Arc<KeyIndex> {
        &self.keys
    }

    #[must_use]
    pub fn scanner(&self) -> FileScanner {
        FileScanner::new(&self.root, self.filter.clone())
    }

    /// Identity of an absolute path, or `None` outside the root.
    #[must_use]
    pub fn identity_for(&self, path: &Path) -> Option<String> {
        relative_identity(&self.root, path)
    }

    /// Index every matching file under the root.
    pub async fn index(&self) -> Result<IndexStats> {
        let start = Instant::now();
        log::info!("Indexing project at {}", self.root.display());

        let files = self.scanner().scan();
        let mut stats = self.index_paths(&files).await;
        stats.files = files.len();

        #[allow(clippy::cast_possible_truncation)]
        {
            stats.time_ms = start.elapsed().as_millis() as u64;
        }
        log::info!(
            "Indexed {} of {} files ({} entries, {} parse failures) in {}ms",
            stats.indexed,
            stats.files,
            stats.entries,
            stats.parse_failures,
            stats.time_ms
        );
        Ok(stats)
    }

    /// Read and index each path; failures are counted, never propagated.
    pub async fn index_paths(&self, paths: &[PathBuf]) -> IndexStats {
        let mut stats = IndexStats::new();
        for path in paths {
            match self.index_path(path).await {
                Some(IndexOutcome::Indexed { entries }) => {
                    stats.indexed += 1;
                    stats.entries += entries;
                }
                Some(IndexOutcome::ParseFailed) => {
                    stats.indexed += 1;
                    stats.parse_failures += 1;
                }
                Some(IndexOutcome::Skipped) | None => stats.skipped += 1,
            }
        }
        stats
    }

    /// Read one file and index it. `None` if it is outside the root,
    /// vanished, or unreadable.
    pub async fn index_path(&self, path: &Path) -> Option<IndexOutcome> {
        let identity = self.identity_for(path)?;
        if !self.keys.indexer().accepts(&identity) {
            return Some(IndexOutcome::Skipped);
        }
        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("{identity} vanished before it could be read");
                return None;
            }
            Err(err) => {
                log::warn!("Failed to read {identity}: {err}");
                return None;
            }
        };
        Some(self.keys.index_file(&identity, &contents))
    }

    /// Apply a host-provided event.
    pub fn apply(&self, event: FileEvent) -> bool {
        self.keys.apply(event)
    }
}

fn canonical_root(root: &Path) -> Result<PathBuf> {
    if !root.exists() {
        return Err(KeyIndexError::InvalidPath(format!(
            "Path does not exist: {}",
            root.display()
        )));
    }
    Ok(std::fs::canonicalize(root)?)
}
