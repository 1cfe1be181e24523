//! Pretty printer
//!
//!     A [Visitor] that writes every node as its `before` comments, its elements in
//!     order, then its `after` comments. Leaves are written as their comments, their
//!     leading trivia and their text. Nothing is invented: with `reformat` off and a
//!     line ending matching the input, the output is the input, byte for byte. Trees
//!     repaired by recovery print the input plus the inserted placeholders.
//!
//! Reformatting
//!
//!     With `reformat` on, the horizontal space after commas and in front of inline
//!     comments is replaced by the configured widths. Line breaks are never added or
//!     removed.

use crate::forward_visits;
use crate::pysyn::ast::{Element, Node, Visitor};
use crate::pysyn::token::{Special, Token, TokenKind};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrettyPrinterPrefs {
    pub spaces_after_comma: usize,
    pub spaces_before_comment: usize,
    pub line_ending: String,
    pub reformat: bool,
}

impl Default for PrettyPrinterPrefs {
    fn default() -> Self {
        Self {
            spaces_after_comma: 1,
            spaces_before_comment: 1,
            line_ending: "\n".to_string(),
            reformat: false,
        }
    }
}

pub struct PrettyPrinter<'p> {
    prefs: &'p PrettyPrinterPrefs,
    out: String,
    last: Option<TokenKind>,
}

impl<'p> PrettyPrinter<'p> {
    pub fn new(prefs: &'p PrettyPrinterPrefs) -> Self {
        Self {
            prefs,
            out: String::new(),
            last: None,
        }
    }

    /// Print `node` and everything below it.
    pub fn print(mut self, node: &Node) -> String {
        node.accept(&mut self);
        self.out
    }

    fn node(&mut self, node: &Node) {
        for special in &node.before {
            self.special(special);
        }
        for element in &node.elements {
            match element {
                Element::Token(token) => self.token(token),
                Element::Node(child) => child.accept(self),
            }
        }
        for special in &node.after {
            self.special(special);
        }
    }

    fn token(&mut self, token: &Token) {
        for special in &token.specials {
            self.special(special);
        }
        let after_comma = self.last == Some(TokenKind::Comma)
            && !token.kind.is_layout()
            && token.kind.opener().is_none()
            && !token.leading.contains('\n');
        if self.prefs.reformat && after_comma {
            self.push_spaces(self.prefs.spaces_after_comma);
        } else {
            let leading = self.line_breaks(&token.leading);
            self.out.push_str(&leading);
        }
        if token.kind == TokenKind::Newline {
            let text = self.line_breaks(&token.text);
            self.out.push_str(&text);
        } else {
            self.out.push_str(&token.text);
        }
        if !token.is_zero_width() || token.synthetic {
            self.last = Some(token.kind);
        }
    }

    fn special(&mut self, special: &Special) {
        let inline = !special.leading.contains('\n') && !self.at_line_start();
        if self.prefs.reformat && inline {
            self.push_spaces(self.prefs.spaces_before_comment);
        } else {
            let leading = self.line_breaks(&special.leading);
            self.out.push_str(&leading);
        }
        self.out.push_str(&special.text);
        let line_end = self.line_breaks(&special.line_end);
        self.out.push_str(&line_end);
        self.last = None;
    }

    fn at_line_start(&self) -> bool {
        self.out.is_empty() || self.out.ends_with('\n') || self.out.ends_with('\r')
    }

    fn push_spaces(&mut self, count: usize) {
        self.out.extend(std::iter::repeat(' ').take(count));
    }

    /// Rewrite every line break in `text` with the configured line ending.
    fn line_breaks<'t>(&self, text: &'t str) -> Cow<'t, str> {
        let ending = self.prefs.line_ending.as_str();
        let has_cr = text.contains('\r');
        if !has_cr && (ending == "\n" || !text.contains('\n')) {
            return Cow::Borrowed(text);
        }
        let unified = text.replace("\r\n", "\n").replace('\r', "\n");
        if ending == "\n" {
            Cow::Owned(unified)
        } else {
            Cow::Owned(unified.replace('\n', ending))
        }
    }
}

impl Visitor for PrettyPrinter<'_> {
    forward_visits!(node);
}

/// Render a tree back to source text.
pub fn print_tree(node: &Node, prefs: &PrettyPrinterPrefs) -> String {
    PrettyPrinter::new(prefs).print(node)
}
