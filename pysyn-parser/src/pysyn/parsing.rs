//! Parsing module
//!
//!     A hand-written recursive descent parser, one method per grammar production, that
//!     turns a [TokenStream] into a `Module` tree. Productions build nodes bottom-up with
//!     a [NodeBuilder](builder::NodeBuilder) and return `Result<Node, Failure>`; the
//!     failure carries the elements consumed so far so nothing read from the stream is
//!     ever dropped.
//!
//! Statements
//!
//!     Each statement goes through the same states: scanning for its first token, an
//!     attempt to match, then success, or a mismatch that is either repaired by the
//!     [RecoveryEngine] or recorded as a soft failure. Failures never travel past the
//!     innermost statement or suite: a broken simple statement turns into an `Error`
//!     node covering the rest of its line, a broken compound header keeps whatever did
//!     match. The module is always built.
//!
//!     See [statements] for the statement productions and suites, [expressions] for the
//!     expression grammar.
//!
//! Grammar Versions
//!
//!     Version differences reach the parser in two ways. Keywords and operators missing
//!     from a version never show up as their own kinds (the lexer produces names or error
//!     tokens instead), and the remaining switches are read from the grammar's
//!     [Features](crate::pysyn::grammar::Features). Constructs a version does not have
//!     are still parsed where that is unambiguous, with an error recorded, so the tree
//!     keeps its shape.
//!
//! Comments
//!
//!     Comments travel as specials on tokens. The parser moves them onto nodes in three
//!     places: a statement takes the comments in front of its first token as `before`,
//!     the inline comment at the end of a line becomes the `after` of the last statement
//!     on it, and comments in front of the Dedent closing a suite go to the compound
//!     statement owning the suite (or to its next clause keyword).

pub mod builder;
mod expressions;
mod statements;

use self::builder::{Failure, NodeBuilder, PResult};
use super::ast::{Element, Node, NodeKind, Position, Range};
use super::grammar::Features;
use super::recovery::{ErrorKind, FatalError, ParseError, RecoveryEngine};
use super::stream::TokenStream;
use super::token::{Special, Token, TokenKind};

/// Brackets, unary operators, lambdas and compound statements a parse may nest.
pub const DEFAULT_MAX_NESTING: usize = 50;

pub struct Parser<'src> {
    stream: TokenStream<'src>,
    recovery: RecoveryEngine,
    features: Features,
    depth: usize,
    max_nesting: usize,
}

/// What a finished parse hands back to the session.
pub struct ParseOutput {
    pub tree: Node,
    pub errors: Vec<ParseError>,
    pub fatal: Option<FatalError>,
}

impl<'src> Parser<'src> {
    pub fn new(stream: TokenStream<'src>, recovery: RecoveryEngine) -> Self {
        let features = *stream.grammar().features();
        Self {
            stream,
            recovery,
            features,
            depth: 0,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }

    pub fn with_max_nesting(mut self, max_nesting: usize) -> Self {
        self.max_nesting = max_nesting;
        self
    }

    /// Parse the whole stream into a `Module`.
    pub fn parse_module(mut self) -> ParseOutput {
        let mut b = self.builder();
        loop {
            if self.stream.is_poisoned() {
                break;
            }
            match self.kind() {
                TokenKind::EndMarker => break,
                TokenKind::Newline => b.token(self.bump()),
                TokenKind::Indent => b.node(self.unexpected_indent()),
                TokenKind::Dedent => {
                    self.recovery
                        .report(&self.stream, ErrorKind::EofExpected, "unexpected dedent");
                    let dedent = self.bump();
                    b.node(self.error_node(vec![Element::Token(dedent)]));
                }
                _ => b.extend(self.statement()),
            }
        }

        let before = if b.has_nodes() {
            Vec::new()
        } else {
            self.stream.take_specials(self.stream.current_id())
        };
        let end_marker = self.bump();
        let range = Range::new(0..end_marker.range.span.end, Position::default(), end_marker.range.end);
        b.token(end_marker);

        let mut tree = b.finish(NodeKind::Module);
        tree.range = range;
        tree.before = before;

        let fatal = self.stream.take_fatal();
        ParseOutput {
            tree,
            errors: self.recovery.into_errors(),
            fatal,
        }
    }

    fn kind(&self) -> TokenKind {
        self.stream.kind()
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.stream.kind() == kind
    }

    fn peek(&mut self, offset: usize) -> TokenKind {
        self.stream.peek_kind(offset)
    }

    /// Consume the current token and hand back a copy of it.
    fn bump(&mut self) -> Token {
        let id = self.stream.advance();
        self.stream.token(id).clone()
    }

    /// A builder anchored at the start of the current token.
    fn builder(&self) -> NodeBuilder {
        let range = &self.stream.current().range;
        NodeBuilder::new(Range::empty_at(range.span.start, range.start))
    }

    fn column(&self) -> usize {
        self.stream.current().range.start.column
    }

    /// Consume `kind` into `b` if it is the current token.
    fn eat(&mut self, b: &mut NodeBuilder, kind: TokenKind) -> bool {
        if self.at(kind) {
            b.token(self.bump());
            true
        } else {
            false
        }
    }

    fn expect(&mut self, b: &mut NodeBuilder, kind: TokenKind) -> PResult<()> {
        if self.eat(b, kind) {
            Ok(())
        } else {
            self.fail(b, kind.to_string())
        }
    }

    /// Give up on the current production, handing over what `b` collected.
    fn fail<T>(&self, b: &mut NodeBuilder, expected: impl Into<String>) -> PResult<T> {
        Err(Failure {
            found: self.stream.current_id(),
            expected: expected.into(),
            partial: b.take(),
        })
    }

    /// Run `production` one nesting level deeper.
    ///
    /// Past `max_nesting` levels it fails without consuming anything, leaving the
    /// rest of the construct to the statement backstops.
    fn nested<T>(&mut self, production: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.too_deep() {
            let mut b = self.builder();
            return self.fail(&mut b, format!("at most {} levels of nesting", self.max_nesting));
        }
        self.depth += 1;
        let result = production(self);
        self.depth -= 1;
        result
    }

    fn too_deep(&self) -> bool {
        self.depth >= self.max_nesting
    }

    fn failure_message(&self, failure: &Failure) -> String {
        format!(
            "expected {}, found {}",
            failure.expected,
            self.stream.token(failure.found).describe()
        )
    }

    /// Record a failure that was handled where it happened.
    fn record_failure(&mut self, kind: ErrorKind, failure: &Failure) {
        let message = self.failure_message(failure);
        self.recovery
            .report_at(&self.stream, failure.found, kind, message);
    }

    /// Record an error when the active grammar lacks a construct that was found.
    fn gate(&mut self, allowed: bool, kind: ErrorKind, construct: &str) {
        if !allowed {
            let message = format!(
                "{construct} is not supported by the {} grammar",
                self.stream.version()
            );
            self.recovery.report(&self.stream, kind, message);
        }
    }

    fn error_node(&self, elements: Vec<Element>) -> Node {
        let mut b = self.builder();
        b.extend(elements);
        b.finish(NodeKind::Error)
    }

    /// Consume tokens up to, not including, the end of the logical line.
    fn skip_to_line_end(&mut self) -> Vec<Element> {
        let mut skipped = Vec::new();
        while !self.kind().is_layout() {
            skipped.push(Element::Token(self.bump()));
        }
        skipped
    }

    /// Consume tokens from an Indent through its matching Dedent, without parsing them.
    fn skip_indented(&mut self) -> Vec<Element> {
        let mut skipped = Vec::new();
        let mut level = 0usize;
        while !self.at(TokenKind::EndMarker) && !self.stream.is_poisoned() {
            let kind = self.kind();
            skipped.push(Element::Token(self.bump()));
            match kind {
                TokenKind::Indent => level += 1,
                TokenKind::Dedent => {
                    level = level.saturating_sub(1);
                    if level == 0 {
                        break;
                    }
                }
                _ => {}
            }
        }
        skipped
    }

    /// Consume a name into `b`, splicing in a placeholder when there is none.
    fn name(&mut self, b: &mut NodeBuilder) -> String {
        if self.at(TokenKind::Name) {
            let token = self.bump();
            let text = token.text.clone();
            b.token(token);
            return text;
        }
        if self.recovery.missing_name(&mut self.stream).is_some() {
            let token = self.bump();
            let text = token.text.clone();
            b.token(token);
            return text;
        }
        super::token::MISSING_NAME.to_string()
    }

    /// Consume the closing bracket of a construct opened earlier.
    ///
    /// When it is missing, anything before it on the same line goes into an
    /// `Error` node; when it cannot be found, the node stays open.
    fn close(&mut self, b: &mut NodeBuilder, closer: TokenKind) {
        if self.eat(b, closer) {
            return;
        }
        if let Some(target) = self.recovery.find_closer(&mut self.stream, closer) {
            let mut skipped = Vec::new();
            while self.stream.current_id() != target {
                skipped.push(Element::Token(self.bump()));
            }
            if !skipped.is_empty() {
                b.node(self.error_node(skipped));
            }
            b.token(self.bump());
        }
    }

    /// Prepend specials to the current token.
    fn carry(&mut self, specials: Vec<Special>) {
        let id = self.stream.current_id();
        self.stream.prepend_specials(id, specials);
    }

    fn at_expression_start(&self) -> bool {
        matches!(
            self.kind(),
            TokenKind::Name
                | TokenKind::Number
                | TokenKind::String
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Backquote
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
                | TokenKind::Ellipsis
        )
    }

    fn at_statement_start(&self) -> bool {
        match self.kind() {
            TokenKind::If
            | TokenKind::While
            | TokenKind::For
            | TokenKind::Try
            | TokenKind::With
            | TokenKind::Def
            | TokenKind::Class
            | TokenKind::At
            | TokenKind::Pass
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Return
            | TokenKind::Raise
            | TokenKind::Global
            | TokenKind::Nonlocal
            | TokenKind::Exec
            | TokenKind::Assert
            | TokenKind::Import
            | TokenKind::From
            | TokenKind::Del
            | TokenKind::Print
            | TokenKind::Yield
            | TokenKind::Star
            | TokenKind::ErrorToken => true,
            _ => self.at_expression_start(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyn::grammar::GrammarVersion;
    use crate::pysyn::stream::StreamMode;

    fn parse(source: &str) -> ParseOutput {
        let stream = TokenStream::new(source, GrammarVersion::LATEST, StreamMode::Fast).unwrap();
        Parser::new(stream, RecoveryEngine::default()).parse_module()
    }

    #[test]
    fn test_module_spans_whole_text() {
        let output = parse("x = 1\n\n# done\n");
        assert_eq!(output.tree.range.span, 0..14);
        assert_eq!(output.tree.range.start, Position::new(1, 1));
        assert!(output.errors.is_empty());
        assert!(output.fatal.is_none());
    }

    #[test]
    fn test_comment_only_module_keeps_comments_in_before() {
        let output = parse("#end\n\n");
        assert_eq!(output.tree.before.len(), 1);
        assert_eq!(output.tree.before[0].text, "#end");
        assert_eq!(output.tree.statements().len(), 0);
    }

    #[test]
    fn test_stray_dedent_is_reported() {
        let tokens = vec![
            Token::new(TokenKind::Dedent, "", Range::default()),
            Token::new(TokenKind::Pass, "pass", Range::default()),
        ];
        let stream = TokenStream::from_tokens(tokens, GrammarVersion::LATEST).unwrap();
        let output = Parser::new(stream, RecoveryEngine::default()).parse_module();
        assert_eq!(output.errors[0].kind, ErrorKind::EofExpected);
        assert!(output.tree.statements()[0].is_error());
        assert_eq!(output.tree.statements()[1].kind, NodeKind::Pass);
    }
}
