use super::{CommandResponse, OpenProject};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct IndexedFile {
    pub identity: String,
    pub entries: usize,
}

pub fn run(open: &OpenProject, json: bool) -> Result<()> {
    let files: Vec<IndexedFile> = open
        .project
        .keys()
        .store()
        .snapshot()
        .files
        .into_iter()
        .map(|(identity, index)| IndexedFile {
            identity,
            entries: index.len(),
        })
        .collect();

    if json {
        return CommandResponse::ok(open, files).print();
    }

    let mut stdout = std::io::stdout().lock();
    for file in &files {
        writeln!(stdout, "{}\t{}", file.identity, file.entries)?;
    }
    let stats = &open.stats;
    writeln!(
        stdout,
        "{} files indexed, {} parse failures, {} skipped, {} entries ({}ms)",
        stats.indexed, stats.parse_failures, stats.skipped, stats.entries, stats.time_ms
    )?;
    Ok(())
}
