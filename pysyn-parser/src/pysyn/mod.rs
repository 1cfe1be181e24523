//! Main module for pysyn library functionality
//!
//! The pipeline is: [`lexing`] turns text into layout-aware tokens, [`stream`]
//! holds them in an arena, [`parsing`] builds an [`ast`] tree while the
//! [`recovery`] engine repairs failed matches, and [`formats`] renders trees
//! back to text. [`session`] is the entry point most callers want.

pub mod ast;
pub mod formats;
pub mod grammar;
pub mod lexing;
pub mod parsing;
pub mod recovery;
pub mod session;
pub mod stream;
pub mod testing;
pub mod token;

pub use session::{parse, parse_tokens, reparse, DocumentSnapshot, ParseOptions, ParseResult, ParseSession};
