use super::OpenProject;
use anyhow::{Context, Result};
use keyscope_indexer::{ProjectIndexer, StreamingIndexer, StreamingIndexerConfig};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

pub async fn run(open: OpenProject, prefix: Option<String>) -> Result<()> {
    let OpenProject { project, stats } = open;
    let project = Arc::new(project);
    let config = StreamingIndexerConfig::from(&project.config().watcher);
    let streaming = StreamingIndexer::start(Arc::clone(&project), config)
        .with_context(|| format!("failed to watch {}", project.root().display()))?;
    let mut updates = streaming.subscribe_updates();

    println!(
        "watching {} ({} files, {} keys)",
        project.root().display(),
        stats.indexed,
        count_keys(&project, prefix.as_deref())
    );

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            update = updates.recv() => match update {
                Ok(update) => println!(
                    "{}: {} of {} changes applied, {} files, {} keys ({}ms)",
                    update.reason,
                    update.applied,
                    update.changes,
                    update.files,
                    count_keys(&project, prefix.as_deref()),
                    update.duration_ms
                ),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Missed {skipped} index updates");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    log::info!("Watcher health: {:?}", streaming.health_snapshot());
    Ok(())
}

fn count_keys(project: &ProjectIndexer, prefix: Option<&str>) -> usize {
    match prefix {
        Some(prefix) => project.keys().keys_with_prefix(prefix).len(),
        None => project.keys().keys().len(),
    }
}
