use crate::entry::FileIndex;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// File identity -> [`FileIndex`] for one project.
///
/// Indexes are swapped as whole `Arc`s, so a snapshot never observes a
/// partially written index. Every effective mutation bumps the generation.
#[derive(Debug, Default)]
pub struct IndexStore {
    inner: RwLock<StoreInner>,
}

#[derive(Debug, Default)]
struct StoreInner {
    files: BTreeMap<String, Arc<FileIndex>>,
    generation: u64,
}

/// Consistent view of the store at one generation.
#[derive(Debug, Clone)]
pub struct StoreSnapshot {
    pub generation: u64,
    pub files: Vec<(String, Arc<FileIndex>)>,
}

impl StoreSnapshot {
    pub fn indexes(&self) -> impl Iterator<Item = &FileIndex> {
        self.files.iter().map(|(_, index)| index.as_ref())
    }
}

impl IndexStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Unconditional overwrite.
    pub fn put(&self, identity: impl Into<String>, index: FileIndex) {
        let mut inner = self.write();
        inner.files.insert(identity.into(), Arc::new(index));
        inner.generation += 1;
    }

    pub fn remove(&self, identity: &str) -> Option<Arc<FileIndex>> {
        let mut inner = self.write();
        let removed = inner.files.remove(identity);
        if removed.is_some() {
            inner.generation += 1;
        }
        removed
    }

    /// Remove every identity below the directory identity `dir`.
    pub fn remove_under(&self, dir: &str) -> usize {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        let mut inner = self.write();
        let before = inner.files.len();
        inner.files.retain(|identity, _| !identity.starts_with(&prefix));
        let removed = before - inner.files.len();
        if removed > 0 {
            inner.generation += 1;
        }
        removed
    }

    /// Move `from` to `to`. Returns `false` (and changes nothing) if `from`
    /// is not indexed.
    pub fn rename(&self, from: &str, to: impl Into<String>) -> bool {
        let mut inner = self.write();
        let Some(index) = inner.files.remove(from) else {
            return false;
        };
        inner.files.insert(to.into(), index);
        inner.generation += 1;
        true
    }

    #[must_use]
    pub fn get(&self, identity: &str) -> Option<Arc<FileIndex>> {
        self.read().files.get(identity).cloned()
    }

    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        self.read().files.contains_key(identity)
    }

    /// Every index, in identity order.
    #[must_use]
    pub fn all(&self) -> Vec<Arc<FileIndex>> {
        self.read().files.values().cloned().collect()
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        let inner = self.read();
        StoreSnapshot {
            generation: inner.generation,
            files: inner
                .files
                .iter()
                .map(|(identity, index)| (identity.clone(), Arc::clone(index)))
                .collect(),
        }
    }

    #[must_use]
    pub fn identities(&self) -> Vec<String> {
        self.read().files.keys().cloned().collect()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.read().generation
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.read().files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ConfigEntry;

    fn index(path: &str, item: &str) -> FileIndex {
        FileIndex::new(vec![ConfigEntry::new(path, item)])
    }

    #[test]
    fn put_overwrites() {
        let store = IndexStore::new();
        store.put("a.yaml", index("a", "1"));
        store.put("a.yaml", index("a", "2"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a.yaml").unwrap().entries()[0].item, "2");
    }

    #[test]
    fn remove_unknown_is_noop() {
        let store = IndexStore::new();
        store.put("a.yaml", index("a", "1"));
        let generation = store.generation();
        assert!(store.remove("missing.yaml").is_none());
        assert_eq!(store.generation(), generation);
        assert!(store.remove("a.yaml").is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn rename_moves_content() {
        let store = IndexStore::new();
        store.put("f.yaml", index("a", "1"));
        let before = store.get("f.yaml").unwrap();
        assert!(store.rename("f.yaml", "g.yaml"));
        assert!(!store.contains("f.yaml"));
        assert_eq!(store.get("g.yaml").unwrap(), before);
    }

    #[test]
    fn rename_of_unknown_creates_nothing() {
        let store = IndexStore::new();
        assert!(!store.rename("f.yaml", "g.yaml"));
        assert!(!store.contains("g.yaml"));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn remove_under_only_hits_children() {
        let store = IndexStore::new();
        store.put("conf/a.yaml", index("a", "1"));
        store.put("conf/sub/b.yaml", index("b", "1"));
        store.put("conf.yaml", index("c", "1"));
        store.put("config/d.yaml", index("d", "1"));
        assert_eq!(store.remove_under("conf"), 2);
        assert_eq!(store.identities(), vec!["conf.yaml", "config/d.yaml"]);
    }

    #[test]
    fn snapshot_is_ordered_and_stable() {
        let store = IndexStore::new();
        store.put("b.yaml", index("b", "1"));
        store.put("a.yaml", index("a", "1"));
        let snapshot = store.snapshot();
        store.remove("a.yaml");
        let ids: Vec<&str> = snapshot.files.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a.yaml", "b.yaml"]);
        assert_eq!(snapshot.generation, 2);
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn concurrent_readers_see_whole_indexes() {
        let store = Arc::new(IndexStore::new());
        let writer = {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let entries = (0..10)
                        .map(|n| ConfigEntry::new(format!("k{n}"), i.to_string()))
                        .collect();
                    store.put("a.yaml", FileIndex::new(entries));
                }
            })
        };
        for _ in 0..200 {
            for index in store.all() {
                assert_eq!(index.len(), 10);
                let first = &index.entries()[0].item;
                assert!(index.iter().all(|e| &e.item == first));
            }
        }
        writer.join().unwrap();
    }
}
