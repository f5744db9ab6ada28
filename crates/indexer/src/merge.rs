//! Prefix expansion and cross-file merge.

use crate::entry::{ConfigEntry, FileIndex};
use crate::path::{canonical_path, PATH_SEPARATOR};
use std::collections::BTreeMap;

pub const ITEM_SEPARATOR: &str = " | ";

/// Keep every entry and synthesize one entry per strict path prefix,
/// annotated with `<lastSegment>: <item>` (empty if the item is empty).
#[must_use]
pub fn expand<'a>(entries: impl IntoIterator<Item = &'a ConfigEntry>) -> Vec<ConfigEntry> {
    let mut expanded = Vec::new();
    for entry in entries {
        expanded.push(entry.clone());

        let Some(last_sep) = entry.path.rfind(PATH_SEPARATOR) else {
            continue;
        };
        let last_segment = &entry.path[last_sep + PATH_SEPARATOR.len_utf8()..];
        let annotation = if entry.item.is_empty() {
            String::new()
        } else {
            format!("{last_segment}: {}", entry.item)
        };

        for (idx, _) in entry.path.match_indices(PATH_SEPARATOR) {
            if idx == 0 {
                continue;
            }
            expanded.push(ConfigEntry::new(&entry.path[..idx], annotation.clone()));
        }
    }
    expanded
}

/// Group by canonical path and join distinct non-empty items.
///
/// Output is sorted by canonical path; items keep first-seen order.
#[must_use]
pub fn merge(entries: impl IntoIterator<Item = ConfigEntry>) -> Vec<ConfigEntry> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in entries {
        let items = groups.entry(canonical_path(&entry.path)).or_default();
        if !entry.item.is_empty() && !items.contains(&entry.item) {
            items.push(entry.item);
        }
    }
    groups
        .into_iter()
        .map(|(path, items)| ConfigEntry::new(path, items.join(ITEM_SEPARATOR)))
        .collect()
}

/// Expand every index and merge the union.
#[must_use]
pub fn expand_and_merge<'a>(indexes: impl IntoIterator<Item = &'a FileIndex>) -> Vec<ConfigEntry> {
    merge(expand(indexes.into_iter().flat_map(FileIndex::iter)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expands_prefixes_with_annotation() {
        let entries = [ConfigEntry::new("a/b/c", "v")];
        assert_eq!(
            expand(&entries),
            vec![
                ConfigEntry::new("a/b/c", "v"),
                ConfigEntry::new("a", "c: v"),
                ConfigEntry::new("a/b", "c: v"),
            ]
        );
    }

    #[test]
    fn container_prefixes_stay_empty() {
        let entries = [ConfigEntry::container("a/b")];
        assert_eq!(
            expand(&entries),
            vec![ConfigEntry::container("a/b"), ConfigEntry::container("a")]
        );
    }

    #[test]
    fn top_level_entries_have_no_prefixes() {
        let entries = [ConfigEntry::new("name", "app")];
        assert_eq!(expand(&entries), vec![ConfigEntry::new("name", "app")]);
    }

    #[test]
    fn merge_joins_distinct_values() {
        let merged = merge(vec![
            ConfigEntry::new("db/host", "x"),
            ConfigEntry::new("db/host", "y"),
            ConfigEntry::new("db/host", "x"),
            ConfigEntry::container("db/host"),
        ]);
        assert_eq!(merged, vec![ConfigEntry::new("db.host", "x | y")]);
    }

    #[test]
    fn merge_of_only_empty_items_is_empty() {
        let merged = merge(vec![ConfigEntry::container("db"), ConfigEntry::container("db")]);
        assert_eq!(merged, vec![ConfigEntry::container("db")]);
    }

    #[test]
    fn end_to_end_server_example() {
        let index = FileIndex::new(vec![
            ConfigEntry::container("server"),
            ConfigEntry::new("server/port", "8080"),
            ConfigEntry::new("server/name", "prod"),
        ]);
        assert_eq!(
            expand_and_merge([&index]),
            vec![
                ConfigEntry::new("server", "port: 8080 | name: prod"),
                ConfigEntry::new("server.name", "prod"),
                ConfigEntry::new("server.port", "8080"),
            ]
        );
    }

    #[test]
    fn merge_across_files_is_deterministic() {
        let a = FileIndex::new(vec![
            ConfigEntry::container("db"),
            ConfigEntry::new("db/host", "x"),
        ]);
        let b = FileIndex::new(vec![
            ConfigEntry::container("db"),
            ConfigEntry::new("db/host", "y"),
        ]);
        let merged = expand_and_merge([&a, &b]);
        assert_eq!(
            merged,
            vec![
                ConfigEntry::new("db", "host: x | host: y"),
                ConfigEntry::new("db.host", "x | y"),
            ]
        );
        assert_eq!(merged, expand_and_merge([&a, &b]));
    }
}
