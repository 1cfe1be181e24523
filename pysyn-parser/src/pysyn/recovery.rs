//! Error Recovery Engine
//!
//!     When a production fails to match, the parser hands the failure to the engine,
//!     which records a [ParseError] and, depending on the context, repairs the token
//!     stream so parsing can go on:
//!
//!     - indent expected: recorded, nothing consumed; the suite becomes empty
//!     - dedent expected: bounded forward scan for the Dedent closing the block
//!     - name expected: a synthetic Name with placeholder text is spliced in
//!     - closing bracket missing: forward scan for the closer on the same logical line
//!     - everything else: recorded only, the caller decides how to continue
//!
//!     Errors are kept in detection order; the first one is what editors usually
//!     underline. With tracing enabled every recovery is also logged at debug level
//!     together with the tokens around it.

use super::ast::range::{Position, Range};
use super::grammar::GrammarVersion;
use super::stream::{TokenId, TokenStream};
use super::token::{Token, TokenKind, MISSING_NAME};
use std::fmt;

/// Scan budget used when resynchronizing on a missing dedent.
pub const DEFAULT_DEDENT_BUDGET: usize = 50;

/// Recoverable failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IndentExpected,
    DedentExpected,
    NameExpected,
    UnmatchedParenNearby,
    StatementMalformed,
    CompoundStatementMalformed,
    NewlineExpected,
    EofExpected,
    DictValueMissing,
    SuiteMatchFailed,
    EmptySuiteDetected,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::IndentExpected => "indent expected",
            ErrorKind::DedentExpected => "dedent expected",
            ErrorKind::NameExpected => "name expected",
            ErrorKind::UnmatchedParenNearby => "unmatched bracket",
            ErrorKind::StatementMalformed => "malformed statement",
            ErrorKind::CompoundStatementMalformed => "malformed compound statement",
            ErrorKind::NewlineExpected => "newline expected",
            ErrorKind::EofExpected => "end of file expected",
            ErrorKind::DictValueMissing => "dictionary value missing",
            ErrorKind::SuiteMatchFailed => "block expected",
            ErrorKind::EmptySuiteDetected => "empty block",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A diagnosed syntax error. The tree built alongside stays usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ErrorKind,
    pub token_kind: TokenKind,
    pub token_text: String,
    pub range: Range,
    pub message: String,
}

impl ParseError {
    pub fn position(&self) -> Position {
        self.range.start
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.range.start, self.kind, self.message)
    }
}

impl std::error::Error for ParseError {}

/// The one condition that aborts a parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FatalError {
    #[error("token kind {kind} is not defined by the {version} grammar (at {position})")]
    UndefinedTokenKind {
        kind: TokenKind,
        version: GrammarVersion,
        position: Position,
    },
}

#[derive(Debug, Clone)]
pub struct RecoveryEngine {
    errors: Vec<ParseError>,
    trace: bool,
    dedent_budget: usize,
}

impl RecoveryEngine {
    pub fn new(trace: bool, dedent_budget: usize) -> Self {
        Self {
            errors: Vec::new(),
            trace,
            dedent_budget,
        }
    }

    /// Append an error unless the previous one has the same kind and spot.
    pub fn record(&mut self, kind: ErrorKind, token: &Token, message: impl Into<String>) {
        let message = message.into();
        if let Some(last) = self.errors.last() {
            if last.kind == kind && last.range == token.range {
                return;
            }
        }
        self.errors.push(ParseError {
            kind,
            token_kind: token.kind,
            token_text: token.text.clone(),
            range: token.range.clone(),
            message,
        });
    }

    /// Record against the stream's current token, tracing if enabled.
    pub fn report(&mut self, stream: &TokenStream<'_>, kind: ErrorKind, message: impl Into<String>) {
        self.report_at(stream, stream.current_id(), kind, message);
    }

    /// Record against the token `at`, tracing if enabled.
    pub fn report_at(
        &mut self,
        stream: &TokenStream<'_>,
        at: TokenId,
        kind: ErrorKind,
        message: impl Into<String>,
    ) {
        let message = message.into();
        let token = stream.token(at);
        if self.trace {
            log::debug!(
                target: "pysyn::recovery",
                "{} at {}: {} [next: {}]",
                kind,
                token.range.start,
                message,
                stream.context(5)
            );
        }
        let token = token.clone();
        self.record(kind, &token, message);
    }

    pub fn indent_expected(&mut self, stream: &TokenStream<'_>) {
        let found = stream.current().describe();
        self.report(stream, ErrorKind::IndentExpected, format!("expected an indented block, found {found}"));
    }

    pub fn empty_suite(&mut self, stream: &TokenStream<'_>) {
        self.report(stream, ErrorKind::EmptySuiteDetected, "block has no statements");
    }

    /// Look for the Dedent that closes the current block.
    ///
    /// Scans at most `dedent_budget` tokens, counting nested Indent/Dedent pairs.
    /// Returns the Dedent to resume at, or `None` when the budget runs out.
    pub fn resync_dedent(&mut self, stream: &mut TokenStream<'_>) -> Option<TokenId> {
        let found = stream.current().describe();
        self.report(stream, ErrorKind::DedentExpected, format!("expected end of block, found {found}"));

        let mut level = 0usize;
        let mut id = stream.current_id();
        for _ in 0..self.dedent_budget {
            match stream.token(id).kind {
                TokenKind::Dedent if level == 0 => {
                    if self.trace {
                        log::debug!(target: "pysyn::recovery", "resynchronized at dedent {}", stream.token(id).range.start);
                    }
                    return Some(id);
                }
                TokenKind::Dedent => level -= 1,
                TokenKind::Indent => level += 1,
                TokenKind::EndMarker => return None,
                _ => {}
            }
            id = stream.next_of(id)?;
        }
        if self.trace {
            log::debug!(target: "pysyn::recovery", "dedent budget of {} tokens exhausted", self.dedent_budget);
        }
        None
    }

    /// Splice a placeholder name in front of the current token and move the
    /// cursor onto it. `None` if the stream refused the insertion, which
    /// poisons it.
    pub fn missing_name(&mut self, stream: &mut TokenStream<'_>) -> Option<TokenId> {
        let found = stream.current().describe();
        self.report(stream, ErrorKind::NameExpected, format!("expected a name, found {found}"));
        let after = stream.previous();
        match stream.insert_synthetic(after, TokenKind::Name, MISSING_NAME) {
            Ok(id) => {
                stream.rewind_to(id);
                Some(id)
            }
            Err(fatal) => {
                stream.poison(fatal);
                None
            }
        }
    }

    /// Find `closer` ahead on the current logical line, skipping nested pairs.
    pub fn find_closer(&mut self, stream: &mut TokenStream<'_>, closer: TokenKind) -> Option<TokenId> {
        let found = stream.current().describe();
        self.report(
            stream,
            ErrorKind::UnmatchedParenNearby,
            format!("expected {closer}, found {found}"),
        );

        let opener = closer.opener();
        let mut depth = 0usize;
        let mut id = stream.current_id();
        loop {
            let kind = stream.token(id).kind;
            if kind.is_layout() {
                return None;
            }
            if kind == closer {
                if depth == 0 {
                    return Some(id);
                }
                depth -= 1;
            } else if Some(kind) == opener {
                depth += 1;
            }
            id = stream.next_of(id)?;
        }
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }
}

impl Default for RecoveryEngine {
    fn default() -> Self {
        Self::new(false, DEFAULT_DEDENT_BUDGET)
    }
}
