//! Loosely-typed document tree
//!
//! Source documents are parsed into [`DocNode`] once and then read through
//! typed accessors that return `Option`, so shape mismatches surface as
//! `None` instead of panics or casts.

use std::collections::BTreeMap;

use serde_json::Value;

/// A node in a parsed document: scalar, sequence, or mapping.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DocNode {
    #[default]
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Sequence(Vec<DocNode>),
    Mapping(BTreeMap<String, DocNode>),
}

impl DocNode {
    /// Parse a JSON document
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Value>(text).map(Self::from)
    }

    /// Parse a JSON document from raw bytes
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice::<Value>(bytes).map(Self::from)
    }

    /// Short name of the node's shape, for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            DocNode::Null => "null",
            DocNode::Bool(_) => "bool",
            DocNode::Number(_) => "number",
            DocNode::String(_) => "string",
            DocNode::Sequence(_) => "sequence",
            DocNode::Mapping(_) => "mapping",
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DocNode::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|n| n as f32)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocNode::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DocNode]> {
        match self {
            DocNode::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&BTreeMap<String, DocNode>> {
        match self {
            DocNode::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key in a mapping node. `None` for missing keys and for
    /// nodes that are not mappings.
    pub fn get(&self, key: &str) -> Option<&DocNode> {
        self.as_mapping().and_then(|map| map.get(key))
    }

    /// Read a fixed-length numeric sequence such as `[x, y, z]`.
    ///
    /// Fails when the node is not a sequence, has the wrong length, or
    /// holds a non-numeric entry.
    pub fn as_f32_array<const N: usize>(&self) -> Option<[f32; N]> {
        let items = self.as_sequence()?;
        if items.len() != N {
            return None;
        }
        let mut out = [0.0; N];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f32()?;
        }
        Some(out)
    }
}

impl From<Value> for DocNode {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => DocNode::Null,
            Value::Bool(b) => DocNode::Bool(b),
            Value::Number(n) => n.as_f64().map(DocNode::Number).unwrap_or(DocNode::Null),
            Value::String(s) => DocNode::String(s),
            Value::Array(items) => {
                DocNode::Sequence(items.into_iter().map(DocNode::from).collect())
            }
            Value::Object(map) => DocNode::Mapping(
                map.into_iter()
                    .map(|(key, value)| (key, DocNode::from(value)))
                    .collect(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_access() {
        let node = DocNode::from_json_str(
            r#"{"parent": "item/handheld", "elements": [{"from": [0, 1.5, 2]}]}"#,
        )
        .unwrap();

        assert_eq!(node.get("parent").and_then(DocNode::as_str), Some("item/handheld"));

        let elements = node.get("elements").and_then(DocNode::as_sequence).unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(
            elements[0].get("from").and_then(DocNode::as_f32_array::<3>),
            Some([0.0, 1.5, 2.0])
        );
    }

    #[test]
    fn test_shape_mismatch_is_none() {
        let node = DocNode::from_json_str(r#"{"from": [0, "x", 2], "to": [1, 2]}"#).unwrap();
        assert_eq!(node.get("from").and_then(DocNode::as_f32_array::<3>), None);
        assert_eq!(node.get("to").and_then(DocNode::as_f32_array::<3>), None);
        assert!(node.get("missing").is_none());
        assert!(DocNode::String("a".into()).get("key").is_none());
    }

    #[test]
    fn test_malformed_json_is_error() {
        assert!(DocNode::from_json_str("{ not json").is_err());
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(DocNode::Null.kind_name(), "null");
        assert_eq!(DocNode::Sequence(Vec::new()).kind_name(), "sequence");
    }
}
