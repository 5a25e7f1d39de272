//! leakcheck-lex - Lexical analysis for the tolerant C++ scanner.
//!
//! Turns a source string into a flat [`Token`] stream. The lexer is
//! intentionally shallow: it has no notion of C++ grammar, only of what a
//! token looks like at the byte level. Whitespace, comments, and
//! preprocessor lines are discarded before they ever reach a token; anything
//! it can't classify is silently skipped rather than surfaced as an error,
//! since the parser built on top is itself recovery-oriented and has no use
//! for a lexical diagnostic it would just ignore.

mod cursor;
mod keywords;
mod lexer;
mod token;

pub use keywords::{is_keyword, KEYWORDS};
pub use lexer::{lex, Lexer};
pub use token::{Token, TokenKind};
