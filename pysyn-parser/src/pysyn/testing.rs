//! Testing utilities
//!
//!     Helpers shared by the unit tests and the integration tests under `tests/`.
//!
//!     [assert_tree] is a small fluent API over nodes. Tests state what they expect
//!     of a statement (its kind, its name, which children it has) without walking
//!     elements by hand, so a change in how leaves are stored touches this module and
//!     not every test.
//!
//!     ```rust,ignore
//!     let result = parse_clean("def f(a):\n    return a\n", GrammarVersion::LATEST);
//!     assert_tree(&result.tree)
//!         .statement_count(1)
//!         .statement(0, |def| {
//!             def.kind_name("FunctionDef")
//!                 .name("f")
//!                 .body(|suite| suite.statement_count(1))
//!         });
//!     ```
//!
//!     [assert_round_trip] checks the printing law: parse, print with default prefs,
//!     compare with the input.

use super::ast::Node;
use super::formats::{print_tree, PrettyPrinterPrefs};
use super::grammar::GrammarVersion;
use super::session::{parse, ParseOptions, ParseResult};
use super::token::MISSING_NAME;

/// Parse and fail the test if anything was diagnosed.
pub fn parse_clean(source: &str, version: GrammarVersion) -> ParseResult {
    let result = parse(source, version, &ParseOptions::default())
        .unwrap_or_else(|fatal| panic!("fatal error parsing {source:?}: {fatal}"));
    if result.has_errors() {
        let listed: Vec<String> = result.errors.iter().map(|e| e.to_string()).collect();
        panic!(
            "expected a clean parse under {version}, got:\n  {}\nsource:\n{source}",
            listed.join("\n  ")
        );
    }
    result
}

/// Parse, print back with default prefs and compare with the input.
pub fn assert_round_trip(source: &str, version: GrammarVersion) {
    let result = parse(source, version, &ParseOptions::default())
        .unwrap_or_else(|fatal| panic!("fatal error parsing {source:?}: {fatal}"));
    let printed = print_tree(&result.tree, &PrettyPrinterPrefs::default());
    assert_eq!(
        strip_placeholders(&printed),
        source,
        "printing under {version} did not reproduce the input"
    );
}

/// Remove the names recovery splices in.
pub fn strip_placeholders(text: &str) -> String {
    text.replace(MISSING_NAME, "")
}

pub fn assert_tree(node: &Node) -> NodeAssertion<'_> {
    NodeAssertion {
        node,
        path: node.kind_name().to_string(),
    }
}

pub struct NodeAssertion<'a> {
    node: &'a Node,
    path: String,
}

impl<'a> NodeAssertion<'a> {
    pub fn kind_name(self, expected: &str) -> Self {
        assert_eq!(self.node.kind_name(), expected, "{}: unexpected node kind", self.path);
        self
    }

    pub fn name(self, expected: &str) -> Self {
        assert_eq!(self.node.name(), Some(expected), "{}: unexpected name", self.path);
        self
    }

    pub fn code(self, expected: &str) -> Self {
        assert_eq!(self.node.code(), expected, "{}: unexpected code", self.path);
        self
    }

    pub fn statement_count(self, expected: usize) -> Self {
        assert_eq!(
            self.node.statements().len(),
            expected,
            "{}: unexpected statement count",
            self.path
        );
        self
    }

    pub fn child_kinds(self, expected: &[&str]) -> Self {
        let kinds: Vec<&str> = self.node.children().map(|c| c.kind_name()).collect();
        assert_eq!(kinds, expected, "{}: unexpected children", self.path);
        self
    }

    pub fn before(self, expected: &[&str]) -> Self {
        let texts: Vec<&str> = self.node.before.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, expected, "{}: unexpected leading comments", self.path);
        self
    }

    pub fn after(self, expected: &[&str]) -> Self {
        let texts: Vec<&str> = self.node.after.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, expected, "{}: unexpected trailing comments", self.path);
        self
    }

    pub fn no_errors(self) -> Self {
        assert!(!self.node.contains_errors(), "{}: contains Error nodes", self.path);
        self
    }

    pub fn statement<F>(self, index: usize, check: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>) -> NodeAssertion<'a>,
    {
        let statements = self.node.statements();
        let Some(statement) = statements.get(index).copied() else {
            panic!("{}: no statement {index} (have {})", self.path, statements.len());
        };
        check(self.nested(statement, index));
        self
    }

    pub fn child<F>(self, index: usize, check: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>) -> NodeAssertion<'a>,
    {
        let Some(child) = self.node.children().nth(index) else {
            panic!("{}: no child {index}", self.path);
        };
        check(self.nested(child, index));
        self
    }

    /// Check the first suite of a compound statement.
    pub fn body<F>(self, check: F) -> Self
    where
        F: FnOnce(NodeAssertion<'a>) -> NodeAssertion<'a>,
    {
        let Some(suite) = self.node.body() else {
            panic!("{}: has no body", self.path);
        };
        check(NodeAssertion {
            node: suite,
            path: format!("{}/Suite", self.path),
        });
        self
    }

    fn nested(&self, node: &'a Node, index: usize) -> NodeAssertion<'a> {
        NodeAssertion {
            node,
            path: format!("{}/{}[{index}]", self.path, node.kind_name()),
        }
    }
}
