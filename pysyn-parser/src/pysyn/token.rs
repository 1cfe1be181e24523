//! Logical token types shared by the lexer, the token stream and the AST.
//!
//! A [`Token`] keeps everything needed to print it back exactly: the
//! whitespace in front of it (`leading`), the comments that precede it
//! (`specials`) and its raw text. Layout tokens (INDENT, DEDENT, ENDMARKER)
//! are zero-width.

use super::ast::range::Range;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder text for names inserted by error recovery.
pub const MISSING_NAME: &str = "!<MissingName>!";

/// Every token kind any supported grammar knows about.
///
/// Whether a kind is legal for a given parse is decided by the active
/// [`Grammar`](super::grammar::Grammar) table, not by this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum TokenKind {
    // Layout
    Newline,
    Indent,
    Dedent,
    EndMarker,

    // Atoms
    Name,
    Number,
    String,
    ErrorToken,

    // Keywords
    And,
    As,
    Assert,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Exec,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Print,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,
    At,
    Equal,
    Arrow,
    Ellipsis,
    Backquote,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    DoubleSlash,
    Percent,
    DoubleStar,
    LeftShift,
    RightShift,
    Amper,
    Vbar,
    Circumflex,
    Tilde,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    EqEqual,
    NotEqual,
    LegacyNotEqual,

    // Augmented assignment
    PlusEqual,
    MinusEqual,
    StarEqual,
    SlashEqual,
    DoubleSlashEqual,
    PercentEqual,
    DoubleStarEqual,
    LeftShiftEqual,
    RightShiftEqual,
    AmperEqual,
    VbarEqual,
    CircumflexEqual,
}

impl TokenKind {
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::Newline,
        TokenKind::Indent,
        TokenKind::Dedent,
        TokenKind::EndMarker,
        TokenKind::Name,
        TokenKind::Number,
        TokenKind::String,
        TokenKind::ErrorToken,
        TokenKind::And,
        TokenKind::As,
        TokenKind::Assert,
        TokenKind::Break,
        TokenKind::Class,
        TokenKind::Continue,
        TokenKind::Def,
        TokenKind::Del,
        TokenKind::Elif,
        TokenKind::Else,
        TokenKind::Except,
        TokenKind::Exec,
        TokenKind::Finally,
        TokenKind::For,
        TokenKind::From,
        TokenKind::Global,
        TokenKind::If,
        TokenKind::Import,
        TokenKind::In,
        TokenKind::Is,
        TokenKind::Lambda,
        TokenKind::Nonlocal,
        TokenKind::Not,
        TokenKind::Or,
        TokenKind::Pass,
        TokenKind::Print,
        TokenKind::Raise,
        TokenKind::Return,
        TokenKind::Try,
        TokenKind::While,
        TokenKind::With,
        TokenKind::Yield,
        TokenKind::LParen,
        TokenKind::RParen,
        TokenKind::LBracket,
        TokenKind::RBracket,
        TokenKind::LBrace,
        TokenKind::RBrace,
        TokenKind::Comma,
        TokenKind::Colon,
        TokenKind::Dot,
        TokenKind::Semicolon,
        TokenKind::At,
        TokenKind::Equal,
        TokenKind::Arrow,
        TokenKind::Ellipsis,
        TokenKind::Backquote,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::DoubleSlash,
        TokenKind::Percent,
        TokenKind::DoubleStar,
        TokenKind::LeftShift,
        TokenKind::RightShift,
        TokenKind::Amper,
        TokenKind::Vbar,
        TokenKind::Circumflex,
        TokenKind::Tilde,
        TokenKind::Less,
        TokenKind::Greater,
        TokenKind::LessEqual,
        TokenKind::GreaterEqual,
        TokenKind::EqEqual,
        TokenKind::NotEqual,
        TokenKind::LegacyNotEqual,
        TokenKind::PlusEqual,
        TokenKind::MinusEqual,
        TokenKind::StarEqual,
        TokenKind::SlashEqual,
        TokenKind::DoubleSlashEqual,
        TokenKind::PercentEqual,
        TokenKind::DoubleStarEqual,
        TokenKind::LeftShiftEqual,
        TokenKind::RightShiftEqual,
        TokenKind::AmperEqual,
        TokenKind::VbarEqual,
        TokenKind::CircumflexEqual,
    ];

    /// Small integer id used by grammar tables.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Source spelling for keywords and punctuation, `None` for the rest.
    pub fn spelling(self) -> Option<&'static str> {
        use TokenKind::*;
        let text = match self {
            Newline | Indent | Dedent | EndMarker | Name | Number | String | ErrorToken => {
                return None
            }
            And => "and",
            As => "as",
            Assert => "assert",
            Break => "break",
            Class => "class",
            Continue => "continue",
            Def => "def",
            Del => "del",
            Elif => "elif",
            Else => "else",
            Except => "except",
            Exec => "exec",
            Finally => "finally",
            For => "for",
            From => "from",
            Global => "global",
            If => "if",
            Import => "import",
            In => "in",
            Is => "is",
            Lambda => "lambda",
            Nonlocal => "nonlocal",
            Not => "not",
            Or => "or",
            Pass => "pass",
            Print => "print",
            Raise => "raise",
            Return => "return",
            Try => "try",
            While => "while",
            With => "with",
            Yield => "yield",
            LParen => "(",
            RParen => ")",
            LBracket => "[",
            RBracket => "]",
            LBrace => "{",
            RBrace => "}",
            Comma => ",",
            Colon => ":",
            Dot => ".",
            Semicolon => ";",
            At => "@",
            Equal => "=",
            Arrow => "->",
            Ellipsis => "...",
            Backquote => "`",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            DoubleSlash => "//",
            Percent => "%",
            DoubleStar => "**",
            LeftShift => "<<",
            RightShift => ">>",
            Amper => "&",
            Vbar => "|",
            Circumflex => "^",
            Tilde => "~",
            Less => "<",
            Greater => ">",
            LessEqual => "<=",
            GreaterEqual => ">=",
            EqEqual => "==",
            NotEqual => "!=",
            LegacyNotEqual => "<>",
            PlusEqual => "+=",
            MinusEqual => "-=",
            StarEqual => "*=",
            SlashEqual => "/=",
            DoubleSlashEqual => "//=",
            PercentEqual => "%=",
            DoubleStarEqual => "**=",
            LeftShiftEqual => "<<=",
            RightShiftEqual => ">>=",
            AmperEqual => "&=",
            VbarEqual => "|=",
            CircumflexEqual => "^=",
        };
        Some(text)
    }

    pub fn is_keyword(self) -> bool {
        (TokenKind::And as u8..=TokenKind::Yield as u8).contains(&(self as u8))
    }

    /// Zero-width or line-structure tokens.
    pub fn is_layout(self) -> bool {
        matches!(
            self,
            TokenKind::Newline | TokenKind::Indent | TokenKind::Dedent | TokenKind::EndMarker
        )
    }

    pub fn is_augmented_assign(self) -> bool {
        (TokenKind::PlusEqual as u8..=TokenKind::CircumflexEqual as u8).contains(&(self as u8))
    }

    /// The bracket that closes this opener, if it is one.
    pub fn closer(self) -> Option<TokenKind> {
        match self {
            TokenKind::LParen => Some(TokenKind::RParen),
            TokenKind::LBracket => Some(TokenKind::RBracket),
            TokenKind::LBrace => Some(TokenKind::RBrace),
            _ => None,
        }
    }

    /// The bracket this closer pairs with, if it is one.
    pub fn opener(self) -> Option<TokenKind> {
        match self {
            TokenKind::RParen => Some(TokenKind::LParen),
            TokenKind::RBracket => Some(TokenKind::LBracket),
            TokenKind::RBrace => Some(TokenKind::LBrace),
            _ => None,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Newline => write!(f, "NEWLINE"),
            TokenKind::Indent => write!(f, "INDENT"),
            TokenKind::Dedent => write!(f, "DEDENT"),
            TokenKind::EndMarker => write!(f, "ENDMARKER"),
            TokenKind::Name => write!(f, "NAME"),
            TokenKind::Number => write!(f, "NUMBER"),
            TokenKind::String => write!(f, "STRING"),
            TokenKind::ErrorToken => write!(f, "ERRORTOKEN"),
            other => write!(f, "'{}'", other.spelling().unwrap_or_default()),
        }
    }
}

/// Problems found while lexing; carried by `ErrorToken`s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unexpected character")]
    UnexpectedCharacter,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unindent does not match any outer indentation level")]
    InconsistentDedent,
    #[error("operator not available in this grammar version")]
    UnsupportedOperator,
    #[error("number literal not valid in this grammar version")]
    InvalidNumber,
    #[error("string prefix not valid in this grammar version")]
    InvalidStringPrefix,
}

/// A comment carried alongside tokens and nodes.
///
/// `line_end` holds the line break that ends a comment sitting on its own
/// line; inline comments leave it empty because the NEWLINE token owns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Special {
    pub leading: String,
    pub text: String,
    pub line_end: String,
    pub range: Range,
}

impl Special {
    pub fn column(&self) -> usize {
        self.range.start.column
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub leading: String,
    pub specials: Vec<Special>,
    pub range: Range,
    pub synthetic: bool,
    pub lex_error: Option<LexError>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, range: Range) -> Self {
        Self {
            kind,
            text: text.into(),
            leading: String::new(),
            specials: Vec::new(),
            range,
            synthetic: false,
            lex_error: None,
        }
    }

    /// A zero-width token made up by recovery rather than read from source.
    pub fn synthetic(kind: TokenKind, text: impl Into<String>, range: Range) -> Self {
        Self {
            synthetic: true,
            ..Self::new(kind, text, range)
        }
    }

    pub fn with_leading(mut self, leading: impl Into<String>) -> Self {
        self.leading = leading.into();
        self
    }

    /// Whether this token covers no source text at all.
    pub fn is_zero_width(&self) -> bool {
        self.range.is_empty()
    }

    /// Short human description used in diagnostics.
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline => "end of line".to_string(),
            TokenKind::Indent => "indent".to_string(),
            TokenKind::Dedent => "dedent".to_string(),
            TokenKind::EndMarker => "end of file".to_string(),
            _ => format!("'{}'", self.text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_ids_are_dense() {
        for (index, kind) in TokenKind::ALL.iter().enumerate() {
            assert_eq!(kind.id() as usize, index, "{kind:?}");
        }
        assert!(TokenKind::ALL.len() <= 128);
    }

    #[test]
    fn test_kind_predicates() {
        assert!(TokenKind::Def.is_keyword());
        assert!(TokenKind::Yield.is_keyword());
        assert!(!TokenKind::Name.is_keyword());
        assert!(!TokenKind::LParen.is_keyword());
        assert!(TokenKind::Dedent.is_layout());
        assert!(TokenKind::DoubleStarEqual.is_augmented_assign());
        assert!(!TokenKind::Equal.is_augmented_assign());
        assert_eq!(TokenKind::LBracket.closer(), Some(TokenKind::RBracket));
        assert_eq!(TokenKind::RBrace.opener(), Some(TokenKind::LBrace));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::Name.to_string(), "NAME");
        assert_eq!(TokenKind::Def.to_string(), "'def'");
        assert_eq!(TokenKind::LegacyNotEqual.to_string(), "'<>'");
    }
}
