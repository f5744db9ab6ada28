use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyIndexError>;

#[derive(Error, Debug)]
pub enum KeyIndexError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("document root is not a mapping (found {0})")]
    RootNotMapping(&'static str),

    #[error("config error: {0}")]
    ConfigError(#[from] toml::de::Error),

    #[error("invalid glob pattern: {0}")]
    GlobError(#[from] globset::Error),

    #[error("Invalid project path: {0}")]
    InvalidPath(String),

    #[error("watcher error: {0}")]
    WatcherError(#[from] notify::Error),

    #[error("{0}")]
    Other(String),
}

impl KeyIndexError {
    /// Parse failures leave an empty index behind instead of aborting.
    #[must_use]
    pub const fn is_parse_failure(&self) -> bool {
        matches!(self, Self::YamlError(_) | Self::RootNotMapping(_))
    }
}
