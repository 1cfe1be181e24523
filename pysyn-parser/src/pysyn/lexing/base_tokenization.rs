//! Base tokenization
//!
//!     The first lexing pass. A plain logos lexer splits the physical text into raw
//!     tokens, including whitespace, line breaks and comments, so nothing of the source
//!     is dropped. Layout and grammar-version decisions happen later in the logical
//!     pass (see [super::Lexer]).
//!
//!     String literals only match their prefix and opening quote here; the rest is
//!     scanned by a callback since triple-quoted strings do not fit a regular pattern.

use crate::pysyn::token::TokenKind;
use logos::Logos;
use std::ops::Range as ByteRange;

/// Whether a string literal found its closing quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringShape {
    Closed,
    Unterminated,
}

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    #[regex(r"[ \t\x0C]+")]
    Whitespace,

    #[regex(r"\r?\n")]
    LineBreak,

    #[regex(r"\\\r?\n")]
    Continuation,

    #[regex(r"#[^\r\n]*")]
    Comment,

    #[regex(r"[_a-zA-Z\x{80}-\x{10FFFF}][_a-zA-Z0-9\x{80}-\x{10FFFF}]*")]
    Name,

    #[regex(r"0[xX][0-9a-fA-F]+[lL]?")]
    #[regex(r"0[oO][0-7]+")]
    #[regex(r"0[bB][01]+")]
    #[regex(r"[0-9]+[lL]?")]
    #[regex(r"[0-9]+[jJ]")]
    #[regex(r"[0-9]+\.[0-9]*([eE][+-]?[0-9]+)?[jJ]?")]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?[jJ]?")]
    #[regex(r"[0-9]+[eE][+-]?[0-9]+[jJ]?")]
    Number,

    #[regex(r#"[uUbB]?[rR]?['"]"#, scan_string)]
    String(StringShape),

    #[token("(", |_| TokenKind::LParen)]
    #[token(")", |_| TokenKind::RParen)]
    #[token("[", |_| TokenKind::LBracket)]
    #[token("]", |_| TokenKind::RBracket)]
    #[token("{", |_| TokenKind::LBrace)]
    #[token("}", |_| TokenKind::RBrace)]
    #[token(",", |_| TokenKind::Comma)]
    #[token(":", |_| TokenKind::Colon)]
    #[token(".", |_| TokenKind::Dot)]
    #[token(";", |_| TokenKind::Semicolon)]
    #[token("@", |_| TokenKind::At)]
    #[token("=", |_| TokenKind::Equal)]
    #[token("->", |_| TokenKind::Arrow)]
    #[token("...", |_| TokenKind::Ellipsis)]
    #[token("`", |_| TokenKind::Backquote)]
    #[token("+", |_| TokenKind::Plus)]
    #[token("-", |_| TokenKind::Minus)]
    #[token("*", |_| TokenKind::Star)]
    #[token("/", |_| TokenKind::Slash)]
    #[token("//", |_| TokenKind::DoubleSlash)]
    #[token("%", |_| TokenKind::Percent)]
    #[token("**", |_| TokenKind::DoubleStar)]
    #[token("<<", |_| TokenKind::LeftShift)]
    #[token(">>", |_| TokenKind::RightShift)]
    #[token("&", |_| TokenKind::Amper)]
    #[token("|", |_| TokenKind::Vbar)]
    #[token("^", |_| TokenKind::Circumflex)]
    #[token("~", |_| TokenKind::Tilde)]
    #[token("<", |_| TokenKind::Less)]
    #[token(">", |_| TokenKind::Greater)]
    #[token("<=", |_| TokenKind::LessEqual)]
    #[token(">=", |_| TokenKind::GreaterEqual)]
    #[token("==", |_| TokenKind::EqEqual)]
    #[token("!=", |_| TokenKind::NotEqual)]
    #[token("<>", |_| TokenKind::LegacyNotEqual)]
    #[token("+=", |_| TokenKind::PlusEqual)]
    #[token("-=", |_| TokenKind::MinusEqual)]
    #[token("*=", |_| TokenKind::StarEqual)]
    #[token("/=", |_| TokenKind::SlashEqual)]
    #[token("//=", |_| TokenKind::DoubleSlashEqual)]
    #[token("%=", |_| TokenKind::PercentEqual)]
    #[token("**=", |_| TokenKind::DoubleStarEqual)]
    #[token("<<=", |_| TokenKind::LeftShiftEqual)]
    #[token(">>=", |_| TokenKind::RightShiftEqual)]
    #[token("&=", |_| TokenKind::AmperEqual)]
    #[token("|=", |_| TokenKind::VbarEqual)]
    #[token("^=", |_| TokenKind::CircumflexEqual)]
    Operator(TokenKind),
}

/// Scan the body of a string literal whose prefix and opening quote matched.
fn scan_string(lex: &mut logos::Lexer<RawToken>) -> StringShape {
    let quote = match lex.slice().chars().last() {
        Some(quote) => quote,
        None => return StringShape::Unterminated,
    };
    let rest = lex.remainder();
    let doubled: String = [quote, quote].iter().collect();
    let triple = rest.starts_with(&doubled);
    let body_start = if triple { 2 } else { 0 };

    let mut chars = rest[body_start..].char_indices().peekable();
    let mut run = 0;
    while let Some((offset, ch)) = chars.next() {
        match ch {
            '\\' => {
                run = 0;
                match chars.next() {
                    Some((_, '\r')) => {
                        if let Some((_, '\n')) = chars.peek() {
                            chars.next();
                        }
                    }
                    Some(_) => {}
                    None => break,
                }
            }
            '\n' | '\r' if !triple => {
                lex.bump(body_start + offset);
                return StringShape::Unterminated;
            }
            c if c == quote => {
                run += 1;
                if !triple || run == 3 {
                    lex.bump(body_start + offset + c.len_utf8());
                    return StringShape::Closed;
                }
            }
            _ => run = 0,
        }
    }

    lex.bump(rest.len());
    StringShape::Unterminated
}

/// Tokenize the whole text into raw tokens with their byte spans.
///
/// Unknown input is returned as `Err(())` spans so the logical pass can turn it
/// into error tokens without losing text.
pub fn tokenize(source: &str) -> Vec<(Result<RawToken, ()>, ByteRange<usize>)> {
    RawToken::lexer(source).spanned().collect()
}
