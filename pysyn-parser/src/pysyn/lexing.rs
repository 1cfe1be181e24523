//! Lexer
//!
//!     Lexing runs in two passes. [base_tokenization] is a vanilla logos lexer over the
//!     physical text. The logical pass in this module turns those raw tokens into the
//!     tokens the parser consumes: it tracks bracket depth, decides which line breaks end
//!     a logical line, emits Indent/Dedent through the [indentation] tracker and resolves
//!     names to keywords using the active grammar table.
//!
//! Source Preservation
//!
//!     Nothing of the input is dropped. Whitespace, blank lines and explicit line
//!     continuations become the `leading` trivia of the next token; comments become
//!     [Special]s attached to the next token. Printing every token's specials, leading
//!     text and text in order gives back the input byte for byte. Layout tokens
//!     (Indent, Dedent, EndMarker, and the Newline closing a file without a final line
//!     break) are zero-width.
//!
//! Grammar Gating
//!
//!     Operators, string prefixes and number forms the active grammar does not define
//!     come out as ErrorTokens carrying a [LexError], so the parser reports them where
//!     they appear instead of failing the whole parse.
//!
//! Unclosed Brackets
//!
//!     Inside brackets line breaks are trivia. When a physical line inside brackets
//!     starts with `def` or `class`, the bracket depth is reset and a new logical line
//!     begins, so a single unterminated call does not swallow the rest of the file.

pub mod base_tokenization;
pub mod indentation;

use self::base_tokenization::{RawToken, StringShape};
use self::indentation::{IndentChange, IndentTracker};
use super::ast::range::{Range, SourceLocation};
use super::grammar::Grammar;
use super::token::{LexError, Special, Token, TokenKind};
use std::collections::VecDeque;
use std::ops::Range as ByteRange;

/// Logical lexer: an iterator of parser-ready tokens.
///
/// Tokens are produced on demand, which lets the token stream either pull them
/// lazily or collect them all up front.
pub struct Lexer<'src> {
    source: &'src str,
    grammar: &'static Grammar,
    location: SourceLocation,
    raw: std::vec::IntoIter<(Result<RawToken, ()>, ByteRange<usize>)>,
    queue: VecDeque<Token>,
    indents: IndentTracker,
    depth: usize,
    leading: String,
    specials: Vec<Special>,
    logical_line_start: bool,
    physical_line_start: bool,
    comment_open: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, grammar: &'static Grammar) -> Self {
        Self {
            source,
            grammar,
            location: SourceLocation::new(source),
            raw: base_tokenization::tokenize(source).into_iter(),
            queue: VecDeque::new(),
            indents: IndentTracker::new(),
            depth: 0,
            leading: String::new(),
            specials: Vec::new(),
            logical_line_start: true,
            physical_line_start: true,
            comment_open: false,
            finished: false,
        }
    }

    fn range(&self, span: &ByteRange<usize>) -> Range {
        self.location.byte_range_to_ast_range(span)
    }

    fn empty_range(&self, offset: usize) -> Range {
        self.range(&(offset..offset))
    }

    /// Push a token carrying the pending trivia and comments.
    fn emit(&mut self, kind: TokenKind, span: ByteRange<usize>, lex_error: Option<LexError>) {
        let mut token = Token::new(kind, &self.source[span.clone()], self.range(&span));
        token.leading = std::mem::take(&mut self.leading);
        token.specials = std::mem::take(&mut self.specials);
        token.lex_error = lex_error;
        self.queue.push_back(token);
    }

    /// Push a zero-width layout token; it takes pending comments but not trivia.
    fn emit_layout(&mut self, kind: TokenKind, offset: usize, lex_error: Option<LexError>) {
        let mut token = Token::new(kind, "", self.empty_range(offset));
        token.specials = std::mem::take(&mut self.specials);
        token.lex_error = lex_error;
        self.queue.push_back(token);
    }

    fn indentation(&mut self, offset: usize) {
        let line_indent = match self.leading.rfind('\n') {
            Some(index) => &self.leading[index + 1..],
            None => &self.leading[..],
        };
        match self.indents.change(line_indent) {
            IndentChange::None => {}
            IndentChange::Indent => self.emit_layout(TokenKind::Indent, offset, None),
            IndentChange::Dedent {
                count,
                inconsistent,
            } => {
                for _ in 0..count {
                    self.emit_layout(TokenKind::Dedent, offset, None);
                }
                if inconsistent {
                    self.emit_layout(
                        TokenKind::ErrorToken,
                        offset,
                        Some(LexError::InconsistentDedent),
                    );
                }
            }
        }
    }

    fn line_break(&mut self, span: ByteRange<usize>) {
        if self.depth > 0 || self.logical_line_start {
            let text = &self.source[span];
            match self.specials.last_mut() {
                Some(special) if self.comment_open => special.line_end = text.to_string(),
                _ => self.leading.push_str(text),
            }
        } else {
            self.emit(TokenKind::Newline, span, None);
            self.logical_line_start = true;
        }
        self.comment_open = false;
        self.physical_line_start = true;
    }

    fn comment(&mut self, span: ByteRange<usize>) {
        self.specials.push(Special {
            leading: std::mem::take(&mut self.leading),
            text: self.source[span.clone()].to_string(),
            line_end: String::new(),
            range: self.range(&span),
        });
        self.comment_open = true;
    }

    fn significant(&mut self, kind: TokenKind, span: ByteRange<usize>, lex_error: Option<LexError>) {
        if self.depth > 0
            && self.physical_line_start
            && matches!(kind, TokenKind::Def | TokenKind::Class)
        {
            self.depth = 0;
            self.emit_layout(TokenKind::Newline, span.start, None);
            self.logical_line_start = true;
        }
        if self.logical_line_start {
            self.indentation(span.start);
            self.logical_line_start = false;
        }
        self.physical_line_start = false;

        match kind {
            TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => self.depth += 1,
            TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                self.depth = self.depth.saturating_sub(1)
            }
            _ => {}
        }
        self.emit(kind, span, lex_error);
    }

    /// Map a raw token onto a logical kind for the active grammar.
    fn classify(&self, raw: RawToken, text: &str) -> (TokenKind, Option<LexError>) {
        let features = self.grammar.features();
        match raw {
            RawToken::Name => (
                self.grammar.keyword(text).unwrap_or(TokenKind::Name),
                None,
            ),
            RawToken::Number => {
                if number_allowed(text, self.grammar) {
                    (TokenKind::Number, None)
                } else {
                    (TokenKind::ErrorToken, Some(LexError::InvalidNumber))
                }
            }
            RawToken::String(StringShape::Unterminated) => {
                (TokenKind::ErrorToken, Some(LexError::UnterminatedString))
            }
            RawToken::String(StringShape::Closed) => {
                let prefix: String = text
                    .chars()
                    .take_while(|ch| *ch != '\'' && *ch != '"')
                    .map(|ch| ch.to_ascii_lowercase())
                    .collect();
                let valid = (!prefix.contains('u') || features.unicode_prefix)
                    && (!prefix.contains('b') || features.bytes_prefix);
                if valid {
                    (TokenKind::String, None)
                } else {
                    (TokenKind::ErrorToken, Some(LexError::InvalidStringPrefix))
                }
            }
            RawToken::Operator(kind) if self.grammar.defines(kind) => (kind, None),
            RawToken::Operator(_) => (TokenKind::ErrorToken, Some(LexError::UnsupportedOperator)),
            RawToken::Whitespace
            | RawToken::LineBreak
            | RawToken::Continuation
            | RawToken::Comment => (TokenKind::ErrorToken, Some(LexError::UnexpectedCharacter)),
        }
    }

    fn step(&mut self) {
        let Some((raw, span)) = self.raw.next() else {
            self.finish();
            return;
        };
        match raw {
            Ok(RawToken::Whitespace) | Ok(RawToken::Continuation) => {
                self.leading.push_str(&self.source[span]);
            }
            Ok(RawToken::LineBreak) => self.line_break(span),
            Ok(RawToken::Comment) => self.comment(span),
            Ok(raw) => {
                let (kind, lex_error) = self.classify(raw, &self.source[span.clone()]);
                self.significant(kind, span, lex_error);
            }
            Err(()) => {
                self.significant(TokenKind::ErrorToken, span, Some(LexError::UnexpectedCharacter))
            }
        }
    }

    fn finish(&mut self) {
        let end = self.source.len();
        if !self.logical_line_start {
            let mut newline = Token::new(TokenKind::Newline, "", self.empty_range(end));
            newline.leading = std::mem::take(&mut self.leading);
            newline.specials = std::mem::take(&mut self.specials);
            self.queue.push_back(newline);
            self.logical_line_start = true;
        }
        for _ in 0..self.indents.close_all() {
            self.emit_layout(TokenKind::Dedent, end, None);
        }
        self.emit(TokenKind::EndMarker, end..end, None);
        self.finished = true;
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            if let Some(token) = self.queue.pop_front() {
                return Some(token);
            }
            if self.finished {
                return None;
            }
            self.step();
        }
    }
}

fn number_allowed(text: &str, grammar: &Grammar) -> bool {
    let features = grammar.features();
    let lower = text.to_ascii_lowercase();
    if lower.ends_with('l') && !features.long_suffix {
        return false;
    }
    if (lower.starts_with("0o") || lower.starts_with("0b")) && !features.prefixed_octal_binary {
        return false;
    }
    let digits = lower.trim_end_matches('l');
    let legacy_octal = digits.len() > 1
        && digits.starts_with('0')
        && digits.chars().all(|ch| ch.is_ascii_digit())
        && digits.chars().any(|ch| ch != '0');
    !legacy_octal || features.legacy_octal
}

/// Lex a whole text with the given grammar.
pub fn tokenize(source: &str, grammar: &'static Grammar) -> Vec<Token> {
    Lexer::new(source, grammar).collect()
}

/// Reassemble source text from tokens; the inverse of [tokenize].
pub fn detokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for token in tokens {
        for special in &token.specials {
            out.push_str(&special.leading);
            out.push_str(&special.text);
            out.push_str(&special.line_end);
        }
        out.push_str(&token.leading);
        out.push_str(&token.text);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pysyn::grammar::GrammarVersion;

    fn kinds(source: &str, version: GrammarVersion) -> Vec<TokenKind> {
        tokenize(source, version.grammar())
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_block_layout() {
        use TokenKind::*;
        assert_eq!(
            kinds("if x:\n    pass\ny\n", GrammarVersion::LATEST),
            vec![If, Name, Colon, Newline, Indent, Pass, Newline, Dedent, Name, Newline, EndMarker]
        );
    }

    #[test]
    fn test_brackets_suppress_newlines() {
        use TokenKind::*;
        assert_eq!(
            kinds("f(a,\n  b)\n", GrammarVersion::LATEST),
            vec![Name, LParen, Name, Comma, Name, RParen, Newline, EndMarker]
        );
    }

    #[test]
    fn test_missing_final_newline_and_open_blocks() {
        use TokenKind::*;
        let tokens = tokenize("def f():\n    return 1", GrammarVersion::LATEST.grammar());
        let kinds: Vec<_> = tokens.iter().map(|token| token.kind).collect();
        assert_eq!(
            kinds,
            vec![Def, Name, LParen, RParen, Colon, Newline, Indent, Return, Number, Newline, Dedent, EndMarker]
        );
        assert!(tokens[9].is_zero_width());
    }

    #[test]
    fn test_comments_attach_to_next_token() {
        let tokens = tokenize("# one\n\nx = 1  # two\n", GrammarVersion::LATEST.grammar());
        assert_eq!(tokens[0].specials.len(), 1);
        assert_eq!(tokens[0].specials[0].text, "# one");
        assert_eq!(tokens[0].specials[0].line_end, "\n");
        assert_eq!(tokens[0].leading, "\n");
        let newline = tokens.iter().find(|t| t.kind == TokenKind::Newline).unwrap();
        assert_eq!(newline.specials[0].text, "# two");
        assert_eq!(newline.specials[0].leading, "  ");
    }

    #[test]
    fn test_trailing_comment_goes_to_dedent() {
        let tokens = tokenize("class C:\n    pass\n#end\n", GrammarVersion::LATEST.grammar());
        let dedent = tokens.iter().find(|t| t.kind == TokenKind::Dedent).unwrap();
        assert_eq!(dedent.specials.len(), 1);
        assert_eq!(dedent.specials[0].column(), 1);
    }

    #[test]
    fn test_detokenize_round_trip() {
        let sources = [
            "x = 1\n",
            "def f(a,  # first\n      b):\n\tpass\n\n\n# tail\n",
            "s = '''multi\nline''' \\\n  + 'x'\n",
            "if a:\n    if b:\n        c\n  d\n",
            "weird $ chars ? here",
            "\n\n   \n",
            "",
        ];
        for source in sources {
            let tokens = tokenize(source, GrammarVersion::Python2_4.grammar());
            assert_eq!(detokenize(&tokens), source, "{source:?}");
        }
    }

    #[test]
    fn test_keywords_depend_on_grammar() {
        assert_eq!(kinds("print", GrammarVersion::Python2_5)[0], TokenKind::Print);
        assert_eq!(kinds("print", GrammarVersion::Python3_0)[0], TokenKind::Name);
        assert_eq!(kinds("a <> b", GrammarVersion::Python2_4)[1], TokenKind::LegacyNotEqual);
        assert_eq!(kinds("a <> b", GrammarVersion::Python3_0)[1], TokenKind::ErrorToken);
    }

    #[test]
    fn test_literal_forms_depend_on_grammar() {
        assert_eq!(kinds("0777", GrammarVersion::Python2_4)[0], TokenKind::Number);
        assert_eq!(kinds("0777", GrammarVersion::Python3_0)[0], TokenKind::ErrorToken);
        assert_eq!(kinds("00", GrammarVersion::Python3_0)[0], TokenKind::Number);
        assert_eq!(kinds("0o17", GrammarVersion::Python2_5)[0], TokenKind::ErrorToken);
        assert_eq!(kinds("0o17", GrammarVersion::Python2_6)[0], TokenKind::Number);
        assert_eq!(kinds("b'x'", GrammarVersion::Python2_4)[0], TokenKind::ErrorToken);
        assert_eq!(kinds("u'x'", GrammarVersion::Python3_0)[0], TokenKind::ErrorToken);
        assert_eq!(kinds("10L", GrammarVersion::Python3_0)[0], TokenKind::ErrorToken);
    }

    #[test]
    fn test_inconsistent_dedent_reported() {
        let tokens = tokenize("if a:\n        b\n    c\n", GrammarVersion::LATEST.grammar());
        let error = tokens
            .iter()
            .find(|t| t.kind == TokenKind::ErrorToken)
            .unwrap();
        assert_eq!(error.lex_error, Some(LexError::InconsistentDedent));
        assert!(error.is_zero_width());
    }

    #[test]
    fn test_def_resets_unclosed_brackets() {
        use TokenKind::*;
        let kinds = kinds("call(a,\ndef f():\n    pass\n", GrammarVersion::LATEST);
        assert_eq!(
            kinds,
            vec![
                Name, LParen, Name, Comma, Newline, Def, Name, LParen, RParen, Colon, Newline,
                Indent, Pass, Newline, Dedent, EndMarker
            ]
        );
    }

    #[test]
    fn test_positions_are_one_based_columns() {
        let tokens = tokenize("l = [ \"encode\", \"decode\" ]\n", GrammarVersion::LATEST.grammar());
        let columns: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::String)
            .map(|t| t.range.start.column)
            .collect();
        assert_eq!(columns, vec![7, 17]);
    }
}
