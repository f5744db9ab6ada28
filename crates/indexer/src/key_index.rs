use crate::entry::{ConfigEntry, FileIndex};
use crate::event::FileEvent;
use crate::filter::ExtensionFilter;
use crate::indexer::FileIndexer;
use crate::merge::expand_and_merge;
use crate::path::{canonical_path, normalize_path_standard, MERGED_SEPARATOR, PATH_SEPARATOR};
use crate::store::IndexStore;
use std::sync::{Arc, Mutex, PoisonError};

/// Result of feeding one file to [`KeyIndex::index_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    Indexed { entries: usize },
    /// Stored as an empty index.
    ParseFailed,
    /// Not a structured document; the store is untouched.
    Skipped,
}

/// Live key index for one project.
///
/// Mutations go through the lifecycle hooks; [`KeyIndex::keys`] answers from
/// the latest completed state and caches the answer set per store generation.
#[derive(Debug)]
pub struct KeyIndex {
    indexer: FileIndexer,
    store: IndexStore,
    cache: Mutex<Option<CachedKeys>>,
}

#[derive(Debug)]
struct CachedKeys {
    generation: u64,
    keys: Arc<[ConfigEntry]>,
}

impl KeyIndex {
    #[must_use]
    pub fn new(indexer: FileIndexer) -> Self {
        Self {
            indexer,
            store: IndexStore::new(),
            cache: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn with_extensions<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        Self::new(FileIndexer::new(ExtensionFilter::new(extensions)))
    }

    #[must_use]
    pub const fn store(&self) -> &IndexStore {
        &self.store
    }

    #[must_use]
    pub const fn indexer(&self) -> &FileIndexer {
        &self.indexer
    }

    pub fn index_file(&self, identity: &str, contents: &[u8]) -> IndexOutcome {
        let (index, outcome) = match self.indexer.try_index(identity, contents) {
            None => return IndexOutcome::Skipped,
            Some(Ok(index)) => {
                let entries = index.len();
                (index, IndexOutcome::Indexed { entries })
            }
            Some(Err(err)) => {
                log::warn!("Unable to parse {identity}: {err}");
                (FileIndex::empty(), IndexOutcome::ParseFailed)
            }
        };
        self.store.put(identity, index);
        outcome
    }

    /// Removes the identity and, if it names a directory, everything below.
    pub fn remove_file(&self, identity: &str) -> bool {
        let removed = self.store.remove(identity).is_some();
        let nested = self.store.remove_under(identity);
        if nested > 0 {
            log::debug!("Dropped {nested} indexed files under {identity}");
        }
        removed || nested > 0
    }

    /// Rekeys `from` under `to`. A target the extension filter rejects
    /// drops `from` instead.
    pub fn rename_file(&self, from: &str, to: &str) -> bool {
        if from == to {
            return self.store.contains(from);
        }
        if !self.indexer.accepts(to) {
            let removed = self.store.remove(from).is_some();
            if removed {
                log::debug!("{from} renamed to non-indexed {to}, dropped");
            }
            return removed;
        }
        let moved = self.store.rename(from, to);
        if !moved {
            log::debug!("Rename of unindexed {from} ignored");
        }
        moved
    }

    /// Apply one change; returns whether the store changed.
    pub fn apply(&self, event: FileEvent) -> bool {
        match event {
            FileEvent::Created { identity, contents }
            | FileEvent::Modified { identity, contents } => {
                !matches!(self.index_file(&identity, &contents), IndexOutcome::Skipped)
            }
            FileEvent::Deleted { identity } => self.remove_file(&identity),
            FileEvent::Renamed { from, to } => self.rename_file(&from, &to),
        }
    }

    /// Merged, expanded answer set.
    #[must_use]
    pub fn keys(&self) -> Arc<[ConfigEntry]> {
        let snapshot = self.store.snapshot();
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if cached.generation == snapshot.generation {
                return Arc::clone(&cached.keys);
            }
        }
        let keys: Arc<[ConfigEntry]> = expand_and_merge(snapshot.indexes()).into();
        log::debug!(
            "Merged {} files into {} keys (generation {})",
            snapshot.files.len(),
            keys.len(),
            snapshot.generation
        );
        *cache = Some(CachedKeys {
            generation: snapshot.generation,
            keys: Arc::clone(&keys),
        });
        keys
    }

    /// Keys at or below `prefix` (`/` or `.` separated).
    ///
    /// A trailing separator selects descendants only.
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<ConfigEntry> {
        let slashed = prefix.replace(MERGED_SEPARATOR, &PATH_SEPARATOR.to_string());
        let descendants_only = slashed.ends_with(PATH_SEPARATOR);
        let prefix = canonical_path(&normalize_path_standard(&slashed));
        self.keys()
            .iter()
            .filter(|entry| {
                if prefix.is_empty() {
                    return true;
                }
                entry.path.strip_prefix(prefix.as_str()).is_some_and(|rest| {
                    (rest.is_empty() && !descendants_only) || rest.starts_with(MERGED_SEPARATOR)
                })
            })
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn file_index(&self, identity: &str) -> Option<Arc<FileIndex>> {
        self.store.get(identity)
    }
}

impl Default for KeyIndex {
    fn default() -> Self {
        Self::new(FileIndexer::default())
    }
}
