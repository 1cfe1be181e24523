//! Grammar Version Registry
//!
//!     A parse is always run against one [`GrammarVersion`]. Each version maps to an
//!     immutable [`Grammar`] table: the token kinds it defines, its keyword map and the
//!     syntax features it enables. Several versions may share a table (2.4 and 2.5 are
//!     both served by the legacy table).
//!
//!     Tables are built lazily on first use and never mutated afterwards, so every
//!     concurrent parse reads the same instance without locking.
//!
//! Tables
//!
//!     - legacy (2.4, 2.5): print and exec statements, backquotes, `<>`, `except E, e`,
//!       tuple parameters, unparenthesized tuples as list comprehension sources,
//!       `0777` octals and `L` suffixes.
//!     - 2.6: adds `except E as e`, class decorators, `0o`/`0b` literals and `b''`.
//!     - 3.0: print and exec become plain names; adds `nonlocal`, annotations,
//!       keyword-only parameters, set literals, dict and set comprehensions,
//!       `...` as an expression and starred assignment targets. Backquotes, `<>`
//!       and the legacy literal forms are gone.

use super::token::TokenKind;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Supported language dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum GrammarVersion {
    #[serde(rename = "2.4")]
    Python2_4,
    #[serde(rename = "2.5")]
    Python2_5,
    #[serde(rename = "2.6")]
    Python2_6,
    #[serde(rename = "3.0")]
    Python3_0,
}

impl GrammarVersion {
    pub const ALL: [GrammarVersion; 4] = [
        GrammarVersion::Python2_4,
        GrammarVersion::Python2_5,
        GrammarVersion::Python2_6,
        GrammarVersion::Python3_0,
    ];

    pub const LATEST: GrammarVersion = GrammarVersion::Python3_0;

    /// The shared production table for this version.
    pub fn grammar(self) -> &'static Grammar {
        match self {
            GrammarVersion::Python2_4 | GrammarVersion::Python2_5 => &LEGACY,
            GrammarVersion::Python2_6 => &PYTHON_26,
            GrammarVersion::Python3_0 => &PYTHON_30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GrammarVersion::Python2_4 => "2.4",
            GrammarVersion::Python2_5 => "2.5",
            GrammarVersion::Python2_6 => "2.6",
            GrammarVersion::Python3_0 => "3.0",
        }
    }
}

impl fmt::Display for GrammarVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown grammar version '{0}' (expected one of 2.4, 2.5, 2.6, 3.0)")]
pub struct UnknownGrammarVersion(pub String);

impl FromStr for GrammarVersion {
    type Err = UnknownGrammarVersion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GrammarVersion::ALL
            .into_iter()
            .find(|version| version.as_str() == s.trim())
            .ok_or_else(|| UnknownGrammarVersion(s.to_string()))
    }
}

/// Syntax switches consulted by the lexer and the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Features {
    pub print_statement: bool,
    pub exec_statement: bool,
    pub backquote_repr: bool,
    pub legacy_not_equal: bool,
    pub except_comma: bool,
    pub except_as: bool,
    pub class_decorators: bool,
    pub class_keywords: bool,
    pub tuple_parameters: bool,
    pub raise_commas: bool,
    pub raise_from: bool,
    pub keyword_only_args: bool,
    pub annotations: bool,
    pub nonlocal_statement: bool,
    pub set_literals: bool,
    pub dict_set_comprehensions: bool,
    pub ellipsis_atom: bool,
    pub star_targets: bool,
    pub tuple_comprehension_source: bool,
    pub long_suffix: bool,
    pub legacy_octal: bool,
    pub prefixed_octal_binary: bool,
    pub unicode_prefix: bool,
    pub bytes_prefix: bool,
}

const LEGACY_FEATURES: Features = Features {
    print_statement: true,
    exec_statement: true,
    backquote_repr: true,
    legacy_not_equal: true,
    except_comma: true,
    except_as: false,
    class_decorators: false,
    class_keywords: false,
    tuple_parameters: true,
    raise_commas: true,
    raise_from: false,
    keyword_only_args: false,
    annotations: false,
    nonlocal_statement: false,
    set_literals: false,
    dict_set_comprehensions: false,
    ellipsis_atom: false,
    star_targets: false,
    tuple_comprehension_source: true,
    long_suffix: true,
    legacy_octal: true,
    prefixed_octal_binary: false,
    unicode_prefix: true,
    bytes_prefix: false,
};

const PYTHON_26_FEATURES: Features = Features {
    except_as: true,
    class_decorators: true,
    prefixed_octal_binary: true,
    bytes_prefix: true,
    ..LEGACY_FEATURES
};

const PYTHON_30_FEATURES: Features = Features {
    print_statement: false,
    exec_statement: false,
    backquote_repr: false,
    legacy_not_equal: false,
    except_comma: false,
    except_as: true,
    class_decorators: true,
    class_keywords: true,
    tuple_parameters: false,
    raise_commas: false,
    raise_from: true,
    keyword_only_args: true,
    annotations: true,
    nonlocal_statement: true,
    set_literals: true,
    dict_set_comprehensions: true,
    ellipsis_atom: true,
    star_targets: true,
    tuple_comprehension_source: false,
    long_suffix: false,
    legacy_octal: false,
    prefixed_octal_binary: true,
    unicode_prefix: false,
    bytes_prefix: true,
};

const COMMON_KEYWORDS: &[TokenKind] = &[
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
    TokenKind::Finally,
    TokenKind::For,
    TokenKind::From,
    TokenKind::Global,
    TokenKind::If,
    TokenKind::Import,
    TokenKind::In,
    TokenKind::Is,
    TokenKind::Lambda,
    TokenKind::Not,
    TokenKind::Or,
    TokenKind::Pass,
    TokenKind::Raise,
    TokenKind::Return,
    TokenKind::Try,
    TokenKind::While,
    TokenKind::With,
    TokenKind::Yield,
];

/// Immutable production table for one or more grammar versions.
#[derive(Debug)]
pub struct Grammar {
    name: &'static str,
    features: Features,
    keywords: HashMap<&'static str, TokenKind>,
    defined: u128,
}

static LEGACY: Lazy<Grammar> = Lazy::new(|| Grammar::build("legacy", LEGACY_FEATURES));
static PYTHON_26: Lazy<Grammar> = Lazy::new(|| Grammar::build("2.6", PYTHON_26_FEATURES));
static PYTHON_30: Lazy<Grammar> = Lazy::new(|| Grammar::build("3.0", PYTHON_30_FEATURES));

impl Grammar {
    fn build(name: &'static str, features: Features) -> Self {
        let mut keyword_kinds = COMMON_KEYWORDS.to_vec();
        if features.print_statement {
            keyword_kinds.push(TokenKind::Print);
        }
        if features.exec_statement {
            keyword_kinds.push(TokenKind::Exec);
        }
        if features.nonlocal_statement {
            keyword_kinds.push(TokenKind::Nonlocal);
        }

        let keywords = keyword_kinds
            .iter()
            .filter_map(|kind| kind.spelling().map(|text| (text, *kind)))
            .collect();

        let defined = TokenKind::ALL
            .iter()
            .filter(|kind| {
                if kind.is_keyword() {
                    return keyword_kinds.contains(kind);
                }
                match kind {
                    TokenKind::Backquote => features.backquote_repr,
                    TokenKind::LegacyNotEqual => features.legacy_not_equal,
                    TokenKind::Arrow => features.annotations,
                    _ => true,
                }
            })
            .fold(0u128, |bits, kind| bits | (1u128 << kind.id()));

        Self {
            name,
            features,
            keywords,
            defined,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn features(&self) -> &Features {
        &self.features
    }

    /// Whether the token kind exists in this grammar.
    pub fn defines(&self, kind: TokenKind) -> bool {
        self.defined & (1u128 << kind.id()) != 0
    }

    /// Resolve an identifier to a keyword kind, if it is one here.
    pub fn keyword(&self, text: &str) -> Option<TokenKind> {
        self.keywords.get(text).copied()
    }
}
