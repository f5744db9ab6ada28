use crate::entry::FileIndex;
use crate::error::Result;
use crate::filter::ExtensionFilter;
use crate::flatten::flatten;
use crate::parser::{DocumentParser, YamlParser};
use std::sync::Arc;

/// Parses and flattens one file into a [`FileIndex`].
#[derive(Clone)]
pub struct FileIndexer {
    filter: ExtensionFilter,
    parser: Arc<dyn DocumentParser>,
}

impl FileIndexer {
    #[must_use]
    pub fn new(filter: ExtensionFilter) -> Self {
        Self::with_parser(filter, Arc::new(YamlParser))
    }

    #[must_use]
    pub fn with_parser(filter: ExtensionFilter, parser: Arc<dyn DocumentParser>) -> Self {
        Self { filter, parser }
    }

    #[must_use]
    pub fn accepts(&self, identity: &str) -> bool {
        self.filter.matches(identity)
    }

    /// `None` when the identity is not a structured document.
    ///
    /// A parse failure yields an empty index so stale keys disappear.
    #[must_use]
    pub fn index(&self, identity: &str, contents: &[u8]) -> Option<FileIndex> {
        self.try_index(identity, contents).map(|parsed| {
            parsed.unwrap_or_else(|err| {
                log::warn!("Unable to parse {identity}: {err}");
                FileIndex::empty()
            })
        })
    }

    /// Like [`FileIndexer::index`], but hands the parse error to the caller.
    pub fn try_index(&self, identity: &str, contents: &[u8]) -> Option<Result<FileIndex>> {
        if !self.accepts(identity) {
            return None;
        }
        Some(self.parser.parse(contents).map(|document| {
            let entries = flatten("", document.as_ref());
            log::debug!("Indexed {identity}: {} entries", entries.len());
            FileIndex::new(entries)
        }))
    }
}

impl Default for FileIndexer {
    fn default() -> Self {
        Self::new(ExtensionFilter::default())
    }
}

impl std::fmt::Debug for FileIndexer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileIndexer")
            .field("filter", &self.filter)
            .finish_non_exhaustive()
    }
}
