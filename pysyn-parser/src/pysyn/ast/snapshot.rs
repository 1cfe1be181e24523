//! AST Snapshot - a normalized, serializable view of the tree
//!
//! The snapshot keeps what a reader of the tree cares about (node type, a short
//! label, attributes, range, attached comments and children) and drops leaves and
//! trivia. Serializers (JSON, YAML, treeviz) consume snapshots instead of walking
//! nodes themselves.

use super::node::{Node, NodeKind, ParamKind};
use super::range::Range;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstSnapshot {
    /// The kind of node ("FunctionDef", "Name", ...)
    pub node_type: String,

    /// Identifier, operator or literal text, empty when the kind has none
    pub label: String,

    pub range: Range,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    /// Comments attached in front of the node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub before: Vec<String>,

    /// Comments attached after the node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub after: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<AstSnapshot>,
}

impl AstSnapshot {
    pub fn new(node_type: impl Into<String>, label: impl Into<String>, range: Range) -> Self {
        Self {
            node_type: node_type.into(),
            label: label.into(),
            range,
            attributes: BTreeMap::new(),
            before: Vec::new(),
            after: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_children(mut self, children: Vec<AstSnapshot>) -> Self {
        self.children.extend(children);
        self
    }

    /// Number of nodes in this snapshot, itself included.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(AstSnapshot::count).sum::<usize>()
    }
}

fn param_kind_name(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::Positional => "positional",
        ParamKind::VarArgs => "varargs",
        ParamKind::KwArgs => "kwargs",
        ParamKind::Tuple => "tuple",
        ParamKind::KeywordOnlyMarker => "keyword-only-marker",
    }
}

/// Build a snapshot of `node` and everything below it.
pub fn snapshot_from_node(node: &Node) -> AstSnapshot {
    let label = match &node.kind {
        NodeKind::Name { id } => id.clone(),
        NodeKind::Num { text } | NodeKind::Str { text } => text.clone(),
        NodeKind::FunctionDef { name }
        | NodeKind::ClassDef { name }
        | NodeKind::Decorator { name }
        | NodeKind::Param { name, .. }
        | NodeKind::Alias { name, .. } => name.clone(),
        NodeKind::ImportFrom { module, .. } => module.clone(),
        NodeKind::AugAssign { op }
        | NodeKind::BoolOp { op }
        | NodeKind::BinOp { op }
        | NodeKind::UnaryOp { op } => op.clone(),
        NodeKind::Compare { ops } => ops.join(" "),
        NodeKind::Global { names } | NodeKind::Nonlocal { names } => names.join(", "),
        NodeKind::Attribute { attr } => attr.clone(),
        NodeKind::Keyword { arg } => arg.clone(),
        NodeKind::Starred { double: true } => "**".to_string(),
        NodeKind::Starred { double: false } => "*".to_string(),
        NodeKind::Error => node.code(),
        _ => String::new(),
    };

    let mut snapshot = AstSnapshot::new(node.kind_name(), label, node.range.clone());
    match &node.kind {
        NodeKind::Param { kind, .. } => {
            snapshot = snapshot.with_attribute("kind", param_kind_name(*kind));
        }
        NodeKind::Alias {
            asname: Some(asname),
            ..
        } => {
            snapshot = snapshot.with_attribute("asname", asname.clone());
        }
        NodeKind::ImportFrom { level, .. } if *level > 0 => {
            snapshot = snapshot.with_attribute("level", level.to_string());
        }
        _ => {}
    }
    snapshot.before = node.before.iter().map(|special| special.text.clone()).collect();
    snapshot.after = node.after.iter().map(|special| special.text.clone()).collect();
    snapshot.with_children(node.children().map(snapshot_from_node).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyn::ast::node::Element;

    #[test]
    fn test_snapshot_labels_and_attributes() {
        let alias = Node::new(
            NodeKind::Alias {
                name: "os.path".into(),
                asname: Some("p".into()),
            },
            Range::default(),
            Vec::new(),
        );
        let import = Node::new(NodeKind::Import, Range::default(), vec![Element::Node(alias)]);
        let snapshot = snapshot_from_node(&import);

        assert_eq!(snapshot.node_type, "Import");
        assert_eq!(snapshot.count(), 2);
        assert_eq!(snapshot.children[0].label, "os.path");
        assert_eq!(snapshot.children[0].attributes["asname"], "p");
    }

    #[test]
    fn test_snapshot_serializes_without_empty_fields() {
        let node = Node::new(NodeKind::Pass, Range::default(), Vec::new());
        let json = serde_json::to_value(snapshot_from_node(&node)).unwrap();
        assert_eq!(json["node_type"], "Pass");
        assert!(json.get("children").is_none());
        assert!(json.get("attributes").is_none());
    }
}
