use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A `(path, item)` pair.
///
/// `item` is empty for containers, the scalar for leaves, and an annotation
/// such as `port: 8080` for synthesized prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub path: String,
    pub item: String,
}

impl ConfigEntry {
    pub fn new(path: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            item: item.into(),
        }
    }

    pub fn container(path: impl Into<String>) -> Self {
        Self::new(path, String::new())
    }

    #[must_use]
    pub fn is_container(&self) -> bool {
        self.item.is_empty()
    }
}

/// Entries derived from one source file, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileIndex {
    entries: Vec<ConfigEntry>,
}

impl FileIndex {
    #[must_use]
    pub const fn new(entries: Vec<ConfigEntry>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigEntry> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Set equality, ignoring order and duplicates.
    #[must_use]
    pub fn same_entries(&self, other: &Self) -> bool {
        let lhs: HashSet<&ConfigEntry> = self.entries.iter().collect();
        let rhs: HashSet<&ConfigEntry> = other.entries.iter().collect();
        lhs == rhs
    }
}

impl FromIterator<ConfigEntry> for FileIndex {
    fn from_iter<I: IntoIterator<Item = ConfigEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a FileIndex {
    type Item = &'a ConfigEntry;
    type IntoIter = std::slice::Iter<'a, ConfigEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
