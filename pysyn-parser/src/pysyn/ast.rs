//! AST definitions and utilities
//!
//!     The tree is concrete enough to print the source back: every [Node] keeps its
//!     surface tokens as leaves, interleaved with its child nodes in source order.
//!     Comments live either on the leaves (as token specials) or on a node's
//!     `before`/`after` lists when the parser attached them to a statement.
//!
//! Node Kinds
//!
//!     [NodeKind] is a closed enum over the constructs of all supported grammar
//!     versions. Variants carry the small amount of data worth reading without walking
//!     the leaves: identifiers, operators, import levels. Malformed input that could
//!     not be matched at all is kept in `Error` nodes so no token is ever lost.
//!
//! Ranges
//!
//!     A node's range is the bounding box of its non-empty children and of its
//!     non-layout leaves. Indent, Dedent, Newline and EndMarker tokens are excluded so a
//!     statement's range ends at its last significant token. The module always spans
//!     the whole text.
//!
//! Traversal
//!
//!     [traits::Visitor] has one method per node kind and no defaults, so adding a
//!     kind is a compile error in every visitor. [traits::walk] covers the common
//!     "call me for every node" case.

pub mod node;
pub mod range;
pub mod snapshot;
pub mod traits;

pub use node::{Element, Node, NodeKind, ParamKind};
pub use range::{Position, Range, SourceLocation};
pub use snapshot::{snapshot_from_node, AstSnapshot};
pub use traits::{walk, Visitor};
