//! Parse entry points
//!
//!     A parse runs synchronously on the calling thread: the text is lexed into a
//!     [TokenStream], the [Parser] builds a `Module`, and the errors collected by the
//!     [RecoveryEngine] come back next to the tree. Every call builds its own stream,
//!     engine and parser; the only shared state is the immutable grammar tables, so
//!     sessions and free functions can be used from any number of threads at once.
//!
//!     The only way a parse fails outright is [FatalError]: a token kind the active
//!     grammar does not define. The built-in lexer never produces one, so it only
//!     surfaces through [parse_tokens].

use super::ast::Node;
use super::grammar::GrammarVersion;
use super::parsing::{Parser, DEFAULT_MAX_NESTING};
use super::recovery::{FatalError, ParseError, RecoveryEngine};
use super::stream::{StreamMode, TokenStream};
use super::token::Token;
use serde::{Deserialize, Serialize};

/// Immutable knobs of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Log every recovery decision at debug level.
    pub trace_recovery: bool,
    pub stream_mode: StreamMode,
    /// How many tokens a search for a block's closing Dedent may scan.
    pub dedent_budget: usize,
    /// How deep brackets, unary operators, lambdas and blocks may nest before the
    /// rest of the construct is kept unparsed in an `Error` node.
    pub max_nesting: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trace_recovery: false,
            stream_mode: StreamMode::Fast,
            dedent_budget: 50,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ParseResult {
    pub tree: Node,
    pub errors: Vec<ParseError>,
    pub version: GrammarVersion,
}

impl ParseResult {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// The first error detected.
    pub fn first_error(&self) -> Option<&ParseError> {
        self.errors.first()
    }
}

/// Text of a document at one point in time, as an editor would hand it over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSnapshot {
    pub text: String,
    pub version: GrammarVersion,
}

impl DocumentSnapshot {
    pub fn new(text: impl Into<String>, version: GrammarVersion) -> Self {
        Self {
            text: text.into(),
            version,
        }
    }
}

fn run(stream: TokenStream<'_>, options: &ParseOptions) -> Result<ParseResult, FatalError> {
    let version = stream.version();
    let recovery = RecoveryEngine::new(options.trace_recovery, options.dedent_budget);
    let output = Parser::new(stream, recovery)
        .with_max_nesting(options.max_nesting)
        .parse_module();
    if let Some(fatal) = output.fatal {
        log::debug!(target: "pysyn::session", "parse aborted: {fatal}");
        return Err(fatal);
    }
    log::debug!(
        target: "pysyn::session",
        "parsed {} grammar: {} statements, {} errors",
        version,
        output.tree.statements().len(),
        output.errors.len()
    );
    Ok(ParseResult {
        tree: output.tree,
        errors: output.errors,
        version,
    })
}

/// Parse `text` with the grammar of `version`.
pub fn parse(
    text: &str,
    version: GrammarVersion,
    options: &ParseOptions,
) -> Result<ParseResult, FatalError> {
    let stream = TokenStream::new(text, version, options.stream_mode)?;
    run(stream, options)
}

/// Parse the whole text of `snapshot` again under its grammar version.
pub fn reparse(
    snapshot: &DocumentSnapshot,
    options: &ParseOptions,
) -> Result<ParseResult, FatalError> {
    parse(&snapshot.text, snapshot.version, options)
}

/// Parse tokens produced by some other lexer.
pub fn parse_tokens(
    tokens: Vec<Token>,
    version: GrammarVersion,
    options: &ParseOptions,
) -> Result<ParseResult, FatalError> {
    let stream = TokenStream::from_tokens(tokens, version)?;
    run(stream, options)
}

/// A grammar version and options fixed once for many parses.
#[derive(Debug, Clone)]
pub struct ParseSession {
    version: GrammarVersion,
    options: ParseOptions,
}

impl ParseSession {
    pub fn new(version: GrammarVersion, options: ParseOptions) -> Self {
        Self { version, options }
    }

    pub fn version(&self) -> GrammarVersion {
        self.version
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    pub fn parse(&self, text: &str) -> Result<ParseResult, FatalError> {
        parse(text, self.version, &self.options)
    }

    /// Re-parse an edited document; the snapshot's own version wins over the session's.
    pub fn reparse(&self, snapshot: &DocumentSnapshot) -> Result<ParseResult, FatalError> {
        reparse(snapshot, &self.options)
    }
}
