//! # Keyscope Indexer
//!
//! Live index of the key paths found in a project's YAML documents.
//!
//! ## Pipeline
//!
//! ```text
//! Directory
//!     │
//!     ├──> File Scanner (ignored dirs, exclude globs)
//!     │      └─> YAML files
//!     │
//!     ├──> File Indexer (parse + flatten)
//!     │      └─> FileIndex per file
//!     │
//!     ├──> Index Store (identity -> FileIndex)
//!     │      └─> put / remove / rename on file events
//!     │
//!     └──> Expand & Merge
//!            └─> Queryable key set
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use keyscope_indexer::ProjectIndexer;
//!
//! #[tokio::main]
//! async fn main() -> keyscope_indexer::Result<()> {
//!     let project = ProjectIndexer::open("/path/to/project")?;
//!     let stats = project.index().await?;
//!     println!("Indexed {} files", stats.indexed);
//!
//!     for entry in project.keys().keys().iter() {
//!         println!("{}\t{}", entry.path, entry.item);
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod entry;
mod error;
mod event;
mod filter;
mod flatten;
mod indexer;
mod key_index;
pub mod merge;
mod node;
mod parser;
pub mod path;
mod project;
mod scanner;
mod stats;
mod store;
mod watcher;

pub use config::{KeyscopeConfig, WatcherSection, CONFIG_FILE_NAME};
pub use entry::{ConfigEntry, FileIndex};
pub use error::{KeyIndexError, Result};
pub use event::FileEvent;
pub use filter::{ExtensionFilter, PathFilter};
pub use flatten::flatten;
pub use indexer::FileIndexer;
pub use key_index::{IndexOutcome, KeyIndex};
pub use merge::{expand, expand_and_merge, merge};
pub use node::{Node, NodeKind};
pub use parser::{DocumentParser, YamlParser};
pub use path::{normalize_path, normalize_path_standard};
pub use project::ProjectIndexer;
pub use scanner::{relative_identity, FileScanner};
pub use stats::IndexStats;
pub use store::{IndexStore, StoreSnapshot};
pub use watcher::{IndexUpdate, StreamingIndexer, StreamingIndexerConfig, WatcherHealth};
