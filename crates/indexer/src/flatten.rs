use crate::entry::ConfigEntry;
use crate::node::Node;
use crate::path::join_key;

/// Flatten a document tree into one entry per container and per scalar.
///
/// Containers come before their children; order follows the document.
/// Unsupported values are skipped with a warning and never stop the walk.
#[must_use]
pub fn flatten(base: &str, node: Option<&Node>) -> Vec<ConfigEntry> {
    let mut out = Vec::new();
    match node {
        None => {}
        Some(Node::Mapping(children)) => walk(base, children, &mut out),
        Some(other) => {
            log::warn!(
                "Expected a mapping at '{base}', found {}; nothing indexed",
                other.kind_name()
            );
        }
    }
    out
}

fn walk(base: &str, children: &[(String, Node)], out: &mut Vec<ConfigEntry>) {
    for (key, value) in children {
        let path = join_key(base, key);
        if path.is_empty() {
            log::warn!("Key {key:?} normalizes to an empty path, skipping");
            continue;
        }
        match value {
            Node::Mapping(grandchildren) => {
                out.push(ConfigEntry::container(path.clone()));
                walk(&path, grandchildren, out);
            }
            Node::Scalar(scalar) => out.push(ConfigEntry::new(path, scalar.clone())),
            Node::Unsupported(kind) => {
                log::warn!("Unsupported {kind} value at '{path}', skipping");
            }
        }
    }
}
