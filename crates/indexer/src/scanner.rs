use crate::filter::PathFilter;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Recursive enumeration of regular files under a root.
pub struct FileScanner {
    root: PathBuf,
    filter: PathFilter,
}

impl FileScanner {
    pub fn new(root: impl AsRef<Path>, filter: PathFilter) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            filter,
        }
    }

    /// Every relevant regular file under the root, sorted by path.
    #[must_use]
    pub fn scan(&self) -> Vec<PathBuf> {
        self.scan_dir(&self.root)
    }

    /// Every relevant regular file under `dir`, which must lie inside the root.
    #[must_use]
    pub fn scan_dir(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        let walker = WalkDir::new(dir)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored_dir(entry));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    log::warn!("Skipping unreadable entry during scan: {err}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.into_path();
            let Some(relative) = relative_identity(&self.root, &path) else {
                continue;
            };
            if self.filter.is_relevant(&relative) {
                files.push(path);
            }
        }

        log::debug!("Scanned {}: {} files", dir.display(), files.len());
        files
    }

    fn is_ignored_dir(&self, entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| self.filter.is_ignored_dir(name))
    }
}

/// Root-relative, `/`-separated identity for `path`.
#[must_use]
pub fn relative_identity(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    if relative.as_os_str().is_empty() {
        return None;
    }
    let mut normalized = relative.to_string_lossy().to_string();
    if normalized.contains('\\') {
        normalized = normalized.replace('\\', "/");
    }
    Some(normalized)
}
