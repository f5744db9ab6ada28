use crate::error::{KeyIndexError, Result};
use crate::node::{Node, NodeKind};
use serde_yaml::Value;

/// Turns file bytes into a document tree.
///
/// `Ok(None)` means the document is empty.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<Option<Node>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct YamlParser;

impl DocumentParser for YamlParser {
    fn parse(&self, bytes: &[u8]) -> Result<Option<Node>> {
        let value: Value = serde_yaml::from_slice(bytes)?;
        match value {
            Value::Null => Ok(None),
            Value::Mapping(_) | Value::Tagged(_) => match convert_value(value) {
                Some(node @ Node::Mapping(_)) => Ok(Some(node)),
                Some(other) => Err(KeyIndexError::RootNotMapping(other.kind_name())),
                None => Ok(None),
            },
            other => Err(KeyIndexError::RootNotMapping(value_kind(&other))),
        }
    }
}

fn convert_value(value: Value) -> Option<Node> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Node::Scalar(s)),
        Value::Number(n) => Some(Node::Scalar(n.to_string())),
        Value::Bool(_) => Some(Node::Unsupported(NodeKind::Boolean)),
        Value::Sequence(_) => Some(Node::Unsupported(NodeKind::Sequence)),
        Value::Tagged(tagged) => convert_value(tagged.value),
        Value::Mapping(map) => {
            let mut entries = Vec::with_capacity(map.len());
            for (key, value) in map {
                match key_string(&key) {
                    Some(key) => {
                        if let Some(node) = convert_value(value) {
                            entries.push((key, node));
                        }
                    }
                    None => entries.push((
                        format!("<{}>", value_kind(&key)),
                        Node::Unsupported(NodeKind::ComplexKey),
                    )),
                }
            }
            Some(Node::Mapping(entries))
        }
    }
}

fn key_string(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => key_string(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<Option<Node>> {
        YamlParser.parse(src.as_bytes())
    }

    #[test]
    fn parses_nested_mapping_in_document_order() {
        let node = parse("server:\n  port: 8080\n  name: prod\n").unwrap();
        assert_eq!(
            node,
            Some(Node::mapping([(
                "server",
                Node::mapping([("port", Node::scalar(8080)), ("name", Node::scalar("prod"))]),
            )]))
        );
    }

    #[test]
    fn empty_document_is_none() {
        assert_eq!(parse("~\n").unwrap(), None);
    }

    #[test]
    fn scalar_root_is_rejected() {
        let err = parse("just a string\n").unwrap_err();
        assert!(matches!(err, KeyIndexError::RootNotMapping("string")));
        assert!(err.is_parse_failure());
    }

    #[test]
    fn malformed_document_is_a_parse_failure() {
        let err = parse("a: [1, 2\nb: c\n").unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[test]
    fn unsupported_shapes_are_marked() {
        let node = parse("list: [1, 2]\nflag: true\nempty:\nratio: 1.5\n").unwrap();
        assert_eq!(
            node,
            Some(Node::mapping([
                ("list", Node::Unsupported(NodeKind::Sequence)),
                ("flag", Node::Unsupported(NodeKind::Boolean)),
                ("ratio", Node::scalar("1.5")),
            ]))
        );
    }

    #[test]
    fn non_string_keys_are_stringified() {
        let node = parse("1: one\ntrue: yes-ish\n").unwrap();
        assert_eq!(
            node,
            Some(Node::mapping([
                ("1", Node::scalar("one")),
                ("true", Node::scalar("yes-ish")),
            ]))
        );
    }

    #[test]
    fn tags_are_unwrapped() {
        let node = parse("port: !env 8080\n").unwrap();
        assert_eq!(node, Some(Node::mapping([("port", Node::scalar(8080))])));
    }
}
