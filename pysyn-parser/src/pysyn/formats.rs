//! Output formats for parsed trees
//!
//!     [prettyprinter] writes a tree back as source text and is the half of the
//!     round-trip law that the parser does not own. [treeviz] draws one line per node
//!     for humans; JSON goes through the serde-enabled [AstSnapshot].

pub mod prettyprinter;
pub mod treeviz;

pub use prettyprinter::{print_tree, PrettyPrinter, PrettyPrinterPrefs};
pub use treeviz::to_treeviz_str;

use super::ast::{snapshot_from_node, AstSnapshot, Node};

/// Pretty JSON rendering of the tree snapshot.
pub fn to_json_str(node: &Node) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&snapshot_from_node(node))
}

/// Snapshot for callers that bring their own serializer.
pub fn to_snapshot(node: &Node) -> AstSnapshot {
    snapshot_from_node(node)
}
