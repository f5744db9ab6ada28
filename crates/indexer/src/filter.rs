use crate::config::KeyscopeConfig;
use crate::error::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Decides which file identities are structured documents.
#[derive(Debug, Clone)]
pub struct ExtensionFilter {
    extensions: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    #[must_use]
    pub fn matches(&self, identity: &str) -> bool {
        Path::new(identity)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .is_some_and(|ext| self.extensions.iter().any(|allowed| *allowed == ext))
    }

    #[must_use]
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }
}

impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(["yaml"])
    }
}

/// Directory and glob exclusions shared by the scanner and the watcher.
#[derive(Debug, Clone)]
pub struct PathFilter {
    ignored_dirs: Vec<String>,
    exclude: GlobSet,
}

impl PathFilter {
    pub fn from_config(config: &KeyscopeConfig) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &config.exclude {
            builder.add(Glob::new(pattern)?);
        }
        Ok(Self {
            ignored_dirs: config
                .ignored_dirs
                .iter()
                .map(|d| d.trim_matches('/').to_lowercase())
                .collect(),
            exclude: builder.build()?,
        })
    }

    /// True if a directory component (relative to the root) is ignored.
    #[must_use]
    pub fn is_ignored_dir(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.ignored_dirs.iter().any(|ignored| *ignored == name)
    }

    /// `relative` is a root-relative identity with `/` separators.
    #[must_use]
    pub fn is_relevant(&self, relative: &str) -> bool {
        let mut components: Vec<&str> = relative.split('/').filter(|c| !c.is_empty()).collect();
        // the last component is the file itself
        components.pop();
        if components.iter().any(|c| self.is_ignored_dir(c)) {
            return false;
        }
        !self.exclude.is_match(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_match_is_case_insensitive() {
        let filter = ExtensionFilter::default();
        assert!(filter.matches("config/app.yaml"));
        assert!(filter.matches("config/APP.YAML"));
        assert!(!filter.matches("config/app.yml"));
        assert!(!filter.matches("config/yaml"));
        assert!(!filter.matches("notes.txt"));
    }

    #[test]
    fn extensions_are_normalized() {
        let filter = ExtensionFilter::new([".YML", "yaml", ""]);
        assert_eq!(filter.extensions(), ["yml".to_string(), "yaml".to_string()]);
        assert!(filter.matches("a.yml"));
    }

    #[test]
    fn ignored_dirs_and_globs_are_excluded() {
        let config = KeyscopeConfig {
            exclude: vec!["fixtures/**".to_string()],
            ..KeyscopeConfig::default()
        };
        let filter = PathFilter::from_config(&config).unwrap();
        assert!(filter.is_relevant("config/app.yaml"));
        assert!(!filter.is_relevant("target/debug/app.yaml"));
        assert!(!filter.is_relevant("web/node_modules/pkg/app.yaml"));
        assert!(!filter.is_relevant("fixtures/broken.yaml"));
        assert!(filter.is_relevant("target.yaml"));
    }

    #[test]
    fn invalid_glob_is_an_error() {
        let config = KeyscopeConfig {
            exclude: vec!["[".to_string()],
            ..KeyscopeConfig::default()
        };
        assert!(PathFilter::from_config(&config).is_err());
    }
}
