//! Token stream with cursor, lookahead, rewinding and synthetic insertion.
//!
//! Tokens live in an arena and are addressed by [`TokenId`]. Each slot links to
//! its neighbours so recovery can splice synthetic tokens in without moving
//! anything; nothing is ever removed, which makes rewinding a plain cursor
//! assignment.
//!
//! In [`StreamMode::Fast`] the whole text is lexed when the stream is built. In
//! [`StreamMode::Naive`] tokens are pulled from the lexer as the cursor or a
//! lookahead reaches the end of what has been lexed so far.

use super::grammar::{Grammar, GrammarVersion};
use super::lexing::Lexer;
use super::recovery::FatalError;
use super::token::{Special, Token, TokenKind};
use serde::{Deserialize, Serialize};

/// Index of a token in the stream arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(usize);

impl TokenId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// How tokens get into the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StreamMode {
    /// Lex everything up front.
    #[default]
    Fast,
    /// Lex on demand.
    Naive,
}

#[derive(Debug)]
struct Slot {
    token: Token,
    prev: Option<TokenId>,
    next: Option<TokenId>,
}

pub struct TokenStream<'src> {
    slots: Vec<Slot>,
    head: TokenId,
    /// Last token pulled from the source (never a synthetic one).
    tail: TokenId,
    cursor: TokenId,
    version: GrammarVersion,
    lexer: Option<Lexer<'src>>,
    fatal: Option<FatalError>,
}

impl<'src> TokenStream<'src> {
    /// Lex `source` with the grammar of `version`.
    pub fn new(
        source: &'src str,
        version: GrammarVersion,
        mode: StreamMode,
    ) -> Result<Self, FatalError> {
        let lexer = Lexer::new(source, version.grammar());
        match mode {
            StreamMode::Fast => Self::from_tokens(lexer.collect(), version),
            StreamMode::Naive => {
                let mut stream = Self::empty(version);
                stream.lexer = Some(lexer);
                if let Some(first) = stream.pull() {
                    stream.cursor = first;
                }
                match stream.fatal.take() {
                    Some(fatal) => Err(fatal),
                    None => Ok(stream),
                }
            }
        }
    }

    /// Build a stream over tokens produced elsewhere.
    ///
    /// Fails if a token kind is not defined by the grammar of `version`. An
    /// ENDMARKER is appended when the sequence does not end with one.
    pub fn from_tokens(tokens: Vec<Token>, version: GrammarVersion) -> Result<Self, FatalError> {
        let grammar = version.grammar();
        let mut stream = Self::empty(version);
        for token in tokens {
            check_defined(grammar, version, &token)?;
            stream.append(token);
        }
        if stream.slots.last().map(|slot| slot.token.kind) != Some(TokenKind::EndMarker) {
            stream.push_end_marker();
        }
        stream.cursor = stream.head;
        Ok(stream)
    }

    fn empty(version: GrammarVersion) -> Self {
        Self {
            slots: Vec::new(),
            head: TokenId(0),
            tail: TokenId(0),
            cursor: TokenId(0),
            version,
            lexer: None,
            fatal: None,
        }
    }

    fn append(&mut self, token: Token) -> TokenId {
        let id = TokenId(self.slots.len());
        let prev = if self.slots.is_empty() {
            None
        } else {
            Some(self.tail)
        };
        self.slots.push(Slot {
            token,
            prev,
            next: None,
        });
        if let Some(prev) = prev {
            self.slots[prev.0].next = Some(id);
        } else {
            self.head = id;
        }
        self.tail = id;
        id
    }

    fn push_end_marker(&mut self) {
        let range = self
            .slots
            .last()
            .map(|slot| {
                let end = slot.token.range.clone();
                super::ast::range::Range::empty_at(end.span.end, end.end)
            })
            .unwrap_or_default();
        let id = self.append(Token::new(TokenKind::EndMarker, "", range));
        if self.slots.len() == 1 {
            self.cursor = id;
        }
    }

    /// Pull one token from the lexer into the arena.
    fn pull(&mut self) -> Option<TokenId> {
        if self.fatal.is_some() {
            return None;
        }
        let token = self.lexer.as_mut()?.next()?;
        if let Err(fatal) = check_defined(self.version.grammar(), self.version, &token) {
            self.poison(fatal);
            return None;
        }
        Some(self.append(token))
    }

    /// Record a fatal error and make the stream look exhausted.
    pub fn poison(&mut self, fatal: FatalError) {
        if self.fatal.is_none() {
            self.fatal = Some(fatal);
        }
        self.lexer = None;
        if self.slots.is_empty() || self.token(self.tail).kind != TokenKind::EndMarker {
            self.push_end_marker();
        }
        self.cursor = self.tail;
    }

    pub fn take_fatal(&mut self) -> Option<FatalError> {
        self.fatal.take()
    }

    pub fn is_poisoned(&self) -> bool {
        self.fatal.is_some()
    }

    pub fn version(&self) -> GrammarVersion {
        self.version
    }

    pub fn grammar(&self) -> &'static Grammar {
        self.version.grammar()
    }

    /// The token after `id`, lexing it first if needed.
    pub fn next_of(&mut self, id: TokenId) -> Option<TokenId> {
        if let Some(next) = self.slots[id.0].next {
            return Some(next);
        }
        if id == self.tail && self.token(id).kind != TokenKind::EndMarker {
            return self.pull();
        }
        None
    }

    pub fn prev_of(&self, id: TokenId) -> Option<TokenId> {
        self.slots[id.0].prev
    }

    pub fn current(&self) -> &Token {
        &self.slots[self.cursor.0].token
    }

    pub fn current_id(&self) -> TokenId {
        self.cursor
    }

    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// The token just before the cursor.
    pub fn previous(&self) -> Option<TokenId> {
        self.prev_of(self.cursor)
    }

    pub fn token(&self, id: TokenId) -> &Token {
        &self.slots[id.0].token
    }

    pub fn token_mut(&mut self, id: TokenId) -> &mut Token {
        &mut self.slots[id.0].token
    }

    /// Consume the current token and return its id. The cursor never moves
    /// past ENDMARKER.
    pub fn advance(&mut self) -> TokenId {
        let consumed = self.cursor;
        if let Some(next) = self.next_of(consumed) {
            self.cursor = next;
        }
        consumed
    }

    /// Remember the cursor so it can be restored with [`rewind_to`](Self::rewind_to).
    pub fn mark(&self) -> TokenId {
        self.cursor
    }

    pub fn rewind_to(&mut self, id: TokenId) {
        self.cursor = id;
    }

    /// Kind of the token `offset` positions ahead; clamps at ENDMARKER.
    pub fn peek_kind(&mut self, offset: usize) -> TokenKind {
        let mut id = self.cursor;
        for _ in 0..offset {
            match self.next_of(id) {
                Some(next) => id = next,
                None => break,
            }
        }
        self.token(id).kind
    }

    /// Splice a synthetic token in after `after` (or at the very start when
    /// `None`). The token is zero-width, placed where the following token starts.
    pub fn insert_synthetic(
        &mut self,
        after: Option<TokenId>,
        kind: TokenKind,
        text: &str,
    ) -> Result<TokenId, FatalError> {
        let following = match after {
            Some(after) => self.next_of(after),
            None => Some(self.head),
        };
        let range = match following {
            Some(next) => {
                let range = &self.token(next).range;
                super::ast::range::Range::empty_at(range.span.start, range.start)
            }
            None => {
                let range = after.map(|id| self.token(id).range.clone()).unwrap_or_default();
                super::ast::range::Range::empty_at(range.span.end, range.end)
            }
        };
        let token = Token::synthetic(kind, text, range);
        check_defined(self.grammar(), self.version, &token)?;

        let id = TokenId(self.slots.len());
        self.slots.push(Slot {
            token,
            prev: after,
            next: following,
        });
        match after {
            Some(after) => self.slots[after.0].next = Some(id),
            None => self.head = id,
        }
        if let Some(next) = following {
            self.slots[next.0].prev = Some(id);
        }
        Ok(id)
    }

    pub fn take_specials(&mut self, id: TokenId) -> Vec<Special> {
        std::mem::take(&mut self.token_mut(id).specials)
    }

    /// Put specials in front of the ones a token already carries.
    pub fn prepend_specials(&mut self, id: TokenId, mut specials: Vec<Special>) {
        if specials.is_empty() {
            return;
        }
        let token = self.token_mut(id);
        specials.append(&mut token.specials);
        token.specials = specials;
    }

    /// Tokens from the cursor up to (excluding) ENDMARKER, for diagnostics.
    pub fn context(&self, radius: usize) -> String {
        let mut parts = Vec::new();
        let mut id = Some(self.cursor);
        for _ in 0..radius {
            match id {
                Some(current) => {
                    let token = self.token(current);
                    if token.kind == TokenKind::EndMarker {
                        break;
                    }
                    parts.push(token.describe());
                    id = self.slots[current.0].next;
                }
                None => break,
            }
        }
        parts.join(" ")
    }

    /// Number of tokens in the arena, synthetic ones included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn check_defined(
    grammar: &Grammar,
    version: GrammarVersion,
    token: &Token,
) -> Result<(), FatalError> {
    if grammar.defines(token.kind) {
        Ok(())
    } else {
        Err(FatalError::UndefinedTokenKind {
            kind: token.kind,
            version,
            position: token.range.start,
        })
    }
}
