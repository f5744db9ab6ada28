use serde::{Deserialize, Serialize};

/// Summary of a full project scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Regular files seen under the root.
    pub files: usize,
    /// Files stored in the index (including parse failures).
    pub indexed: usize,
    /// Files whose contents failed to parse.
    pub parse_failures: usize,
    /// Non-matching, vanished or unreadable files.
    pub skipped: usize,
    /// Entries across all indexed files, before expansion.
    pub entries: usize,
    pub time_ms: u64,
}

impl IndexStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
