//! Bottom-up node construction and failure propagation.
//!
//! Productions collect their leaves and finished children in a [NodeBuilder] and
//! close it with [NodeBuilder::finish], which computes the node range from what
//! was collected. When a production gives up it returns a [Failure] carrying
//! every element consumed so far; [Salvage] moves the caller's elements into that
//! failure on the way up, so whoever finally handles it can keep all of them in
//! an `Error` node.

use crate::pysyn::ast::{Element, Node, NodeKind, Range};
use crate::pysyn::stream::TokenId;
use crate::pysyn::token::Token;

/// A production that did not match.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    /// The token that could not be matched.
    pub found: TokenId,
    /// What the production was looking for, for diagnostics.
    pub expected: String,
    /// Everything consumed before giving up, in source order.
    pub partial: Vec<Element>,
}

pub type PResult<T> = Result<T, Failure>;

pub trait Salvage<T> {
    /// On failure, put the builder's elements in front of the failure's partial
    /// elements.
    fn salvage(self, builder: &mut NodeBuilder) -> PResult<T>;
}

impl<T> Salvage<T> for PResult<T> {
    fn salvage(self, builder: &mut NodeBuilder) -> PResult<T> {
        self.map_err(|mut failure| {
            let mut elements = builder.take();
            elements.append(&mut failure.partial);
            failure.partial = elements;
            failure
        })
    }
}

pub trait Attach {
    /// Salvage into `builder`, then push the node on success.
    fn attach(self, builder: &mut NodeBuilder) -> PResult<()>;
}

impl Attach for PResult<Node> {
    fn attach(self, builder: &mut NodeBuilder) -> PResult<()> {
        let node = self.salvage(builder)?;
        builder.node(node);
        Ok(())
    }
}

#[derive(Debug)]
pub struct NodeBuilder {
    elements: Vec<Element>,
    /// Range used when nothing collected has a range of its own.
    anchor: Range,
}

impl NodeBuilder {
    pub fn new(anchor: Range) -> Self {
        Self {
            elements: Vec::new(),
            anchor,
        }
    }

    pub fn token(&mut self, token: Token) {
        self.elements.push(Element::Token(token));
    }

    pub fn node(&mut self, node: Node) {
        self.elements.push(Element::Node(node));
    }

    pub fn extend(&mut self, elements: Vec<Element>) {
        self.elements.extend(elements);
    }

    pub fn take(&mut self) -> Vec<Element> {
        std::mem::take(&mut self.elements)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn has_nodes(&self) -> bool {
        self.elements
            .iter()
            .any(|element| matches!(element, Element::Node(_)))
    }

    pub fn last_node_mut(&mut self) -> Option<&mut Node> {
        self.elements.iter_mut().rev().find_map(|element| match element {
            Element::Node(node) => Some(node),
            Element::Token(_) => None,
        })
    }

    pub fn finish(self, kind: NodeKind) -> Node {
        let range = compute_range(&self.elements).unwrap_or(self.anchor);
        Node::new(kind, range, self.elements)
    }
}

/// Bounding box of the non-empty child nodes and the non-layout leaves.
pub fn compute_range(elements: &[Element]) -> Option<Range> {
    let ranges = elements.iter().filter_map(|element| match element {
        Element::Node(node) if !node.range.is_empty() => Some(&node.range),
        Element::Token(token) if !token.kind.is_layout() => Some(&token.range),
        _ => None,
    });
    Range::bounding_box(ranges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyn::ast::Position;
    use crate::pysyn::grammar::GrammarVersion;
    use crate::pysyn::stream::TokenStream;
    use crate::pysyn::token::TokenKind;

    fn token(kind: TokenKind, text: &str, line: usize, column: usize, offset: usize) -> Token {
        let start = Position::new(line, column);
        let end = Position::new(line, column + text.len());
        Token::new(kind, text, Range::new(offset..offset + text.len(), start, end))
    }

    #[test]
    fn test_range_skips_layout_tokens() {
        let mut builder = NodeBuilder::new(Range::default());
        builder.token(token(TokenKind::Pass, "pass", 2, 5, 10));
        builder.token(token(TokenKind::Newline, "\n", 2, 9, 14));
        let node = builder.finish(NodeKind::Pass);
        assert_eq!(node.range.start, Position::new(2, 5));
        assert_eq!(node.range.end, Position::new(2, 9));
        assert_eq!(node.range.span, 10..14);
    }

    #[test]
    fn test_empty_builder_uses_anchor() {
        let anchor = Range::empty_at(7, Position::new(3, 1));
        let node = NodeBuilder::new(anchor.clone()).finish(NodeKind::Suite);
        assert_eq!(node.range, anchor);
    }

    #[test]
    fn test_salvage_keeps_consumed_elements_in_order() {
        let mut builder = NodeBuilder::new(Range::default());
        builder.token(token(TokenKind::Name, "a", 1, 1, 0));
        let stream = TokenStream::from_tokens(Vec::new(), GrammarVersion::LATEST).unwrap();
        let failed: PResult<Node> = Err(Failure {
            found: stream.current_id(),
            expected: "expression".into(),
            partial: vec![Element::Token(token(TokenKind::Plus, "+", 1, 3, 2))],
        });
        let failure = failed.salvage(&mut builder).unwrap_err();
        let texts: Vec<_> = failure
            .partial
            .iter()
            .filter_map(Element::as_token)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(texts, vec!["a", "+"]);
        assert!(builder.is_empty());
    }
}
