use super::{CommandResponse, OpenProject};
use anyhow::Result;
use keyscope_indexer::ConfigEntry;
use std::io::Write;

pub fn run(open: &OpenProject, prefix: Option<&str>, json: bool) -> Result<()> {
    let keys: Vec<ConfigEntry> = match prefix {
        Some(prefix) => open.project.keys().keys_with_prefix(prefix),
        None => open.project.keys().keys().to_vec(),
    };

    if json {
        return CommandResponse::ok(open, keys).print();
    }

    let mut stdout = std::io::stdout().lock();
    for entry in &keys {
        if entry.item.is_empty() {
            writeln!(stdout, "{}", entry.path)?;
        } else {
            writeln!(stdout, "{}\t{}", entry.path, entry.item)?;
        }
    }
    Ok(())
}
