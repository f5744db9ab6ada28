use std::fmt;

/// A parsed document node.
///
/// Only mappings and scalars carry keys; every other shape is kept as
/// [`Node::Unsupported`] so callers decide explicitly what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Mapping(Vec<(String, Node)>),
    /// Stringified string or number.
    Scalar(String),
    Unsupported(NodeKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Sequence,
    Boolean,
    ComplexKey,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sequence => "sequence",
            Self::Boolean => "boolean",
            Self::ComplexKey => "complex key",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Node {
    #[must_use]
    pub fn mapping<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Mapping(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    #[must_use]
    pub fn scalar(value: impl ToString) -> Self {
        Self::Scalar(value.to_string())
    }

    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Mapping(_) => "mapping",
            Self::Scalar(_) => "scalar",
            Self::Unsupported(kind) => kind.as_str(),
        }
    }
}
