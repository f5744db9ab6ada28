pub mod files;
pub mod keys;
pub mod watch;

use anyhow::{Context, Result};
use keyscope_indexer::{IndexStats, KeyscopeConfig, ProjectIndexer};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Indexed project plus the stats of its initial scan.
pub struct OpenProject {
    pub project: ProjectIndexer,
    pub stats: IndexStats,
}

pub async fn open_project(root: &Path, config: Option<&Path>) -> Result<OpenProject> {
    let project = match config {
        Some(path) => {
            let config = KeyscopeConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?;
            ProjectIndexer::with_config(root, config)
        }
        None => ProjectIndexer::open(root),
    }
    .with_context(|| format!("failed to open project {}", root.display()))?;

    let stats = project
        .index()
        .await
        .with_context(|| format!("failed to index {}", root.display()))?;
    log::info!(
        "Indexed {} files ({} parse failures) in {}ms",
        stats.indexed,
        stats.parse_failures,
        stats.time_ms
    );
    Ok(OpenProject { project, stats })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandStatus {
    Ok,
}

#[derive(Debug, Serialize)]
pub struct CommandResponse<T> {
    pub status: CommandStatus,
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub root: String,
    pub stats: IndexStats,
}

impl<T: Serialize> CommandResponse<T> {
    pub fn ok(open: &OpenProject, data: T) -> Self {
        Self {
            status: CommandStatus::Ok,
            data,
            meta: ResponseMeta {
                root: open.project.root().display().to_string(),
                stats: open.stats.clone(),
            },
        }
    }

    pub fn print(&self) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, self)?;
        writeln!(stdout)?;
        Ok(())
    }
}
