//! The tolerant C++ lexer.
//!
//! This lexer never fails. Anything it doesn't recognize — an unterminated
//! string, a stray `@`, a Unicode identifier — degrades into either "emit
//! what was scanned so far" or "skip this byte and keep going." There is no
//! error type and no diagnostic sink: the parser built on top of this lexer
//! is itself permissive, so a malformed token stream just means the parser
//! recovers a little less structure from that file, not that the pipeline
//! stops.

use leakcheck_util::Span;

use crate::cursor::Cursor;
use crate::keywords::is_keyword;
use crate::token::{Token, TokenKind};

/// Character classes reused by `lex_number` and `lex_identifier`.
#[inline]
fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

#[inline]
fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn is_number_continue(b: u8) -> bool {
    b.is_ascii_digit() || b == b'.' || b == b'x' || b == b'X' || b.is_ascii_hexdigit()
}

/// Turns a source string into a flat token stream.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            cursor: Cursor::new(source),
        }
    }

    /// Lexes the whole source, returning every token including the
    /// trailing [`TokenKind::End`].
    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let at_end = tokens.last().map(Token::is_end).unwrap_or(false);
            if at_end {
                break;
            }
            tokens.push(self.next_token());
        }
        tokens
    }

    /// Returns the next token, or [`TokenKind::End`] once the source is
    /// exhausted. Calling this again after an `End` keeps returning `End`.
    pub fn next_token(&mut self) -> Token {
        loop {
            self.skip_trivia();

            let span = Span::new(self.cursor.line(), self.cursor.column());
            if self.cursor.is_at_end() {
                return Token::end(span);
            }

            let start = self.cursor.position();
            if let Some(kind) = self.lex_one() {
                let lexeme = self.cursor.slice_from(start).to_string();
                return Token::new(kind, lexeme, span);
            }
            // Unrecognized byte: silently skipped, try again.
            self.cursor.advance();
        }
    }

    /// Skips whitespace, `//` and `/* */` comments, and preprocessor lines,
    /// repeating until none of those apply (a comment can be followed by
    /// more whitespace, a preprocessor line by another comment, etc).
    fn skip_trivia(&mut self) {
        loop {
            let before = self.cursor.position();

            while !self.cursor.is_at_end() && self.cursor.current().is_ascii_whitespace() {
                self.cursor.advance();
            }

            if self.cursor.current() == b'/' && self.cursor.peek(1) == b'/' {
                while !self.cursor.is_at_end() && self.cursor.current() != b'\n' {
                    self.cursor.advance();
                }
            } else if self.cursor.current() == b'/' && self.cursor.peek(1) == b'*' {
                self.cursor.advance();
                self.cursor.advance();
                loop {
                    if self.cursor.is_at_end() {
                        break; // unterminated: consume to end of input
                    }
                    if self.cursor.current() == b'*' && self.cursor.peek(1) == b'/' {
                        self.cursor.advance();
                        self.cursor.advance();
                        break;
                    }
                    self.cursor.advance();
                }
            } else if self.cursor.current() == b'#' {
                self.skip_preprocessor_line();
            }

            if self.cursor.position() == before {
                break;
            }
        }
    }

    /// Consumes a `#...` preprocessor line, honoring `\`-newline
    /// continuation so a multi-line macro definition is skipped in full.
    fn skip_preprocessor_line(&mut self) {
        while !self.cursor.is_at_end() {
            if self.cursor.current() == b'\\' && self.cursor.peek(1) == b'\n' {
                self.cursor.advance();
                self.cursor.advance();
                continue;
            }
            if self.cursor.current() == b'\n' {
                break;
            }
            self.cursor.advance();
        }
    }

    /// Lexes one token starting at the current byte. Returns `None` (without
    /// advancing) if the current byte doesn't start anything recognized.
    fn lex_one(&mut self) -> Option<TokenKind> {
        let c = self.cursor.current();
        match c {
            b'"' | b'\'' => {
                self.lex_quoted(c);
                Some(TokenKind::String)
            }
            b if is_ident_start(b) => {
                self.cursor.advance();
                while is_ident_continue(self.cursor.current()) {
                    self.cursor.advance();
                }
                Some(TokenKind::Ident) // caller downgrades to Keyword below
            }
            b if b.is_ascii_digit() => {
                self.cursor.advance();
                while is_number_continue(self.cursor.current()) {
                    self.cursor.advance();
                }
                Some(TokenKind::Number)
            }
            b'{' | b'}' | b'(' | b')' | b'[' | b']' | b';' | b',' | b'.' => {
                self.cursor.advance();
                Some(TokenKind::Punctuation)
            }
            b':' => {
                self.cursor.advance();
                if self.cursor.eat(b':') {
                    Some(TokenKind::Operator)
                } else {
                    Some(TokenKind::Punctuation)
                }
            }
            b'-' => {
                self.cursor.advance();
                let _ = self.cursor.eat(b'>') || self.cursor.eat(b'-') || self.cursor.eat(b'=');
                Some(TokenKind::Operator)
            }
            b'=' | b'!' | b'<' | b'>' => {
                self.cursor.advance();
                self.cursor.eat(b'=');
                Some(TokenKind::Operator)
            }
            b'&' => {
                self.cursor.advance();
                self.cursor.eat(b'&');
                Some(TokenKind::Operator)
            }
            b'|' => {
                self.cursor.advance();
                self.cursor.eat(b'|');
                Some(TokenKind::Operator)
            }
            b'+' => {
                self.cursor.advance();
                let _ = self.cursor.eat(b'+') || self.cursor.eat(b'=');
                Some(TokenKind::Operator)
            }
            b'*' | b'/' => {
                self.cursor.advance();
                self.cursor.eat(b'=');
                Some(TokenKind::Operator)
            }
            b'%' | b'^' | b'~' => {
                self.cursor.advance();
                Some(TokenKind::Operator)
            }
            _ => None,
        }
    }

    /// Consumes a `"..."` or `'...'` literal starting at the opening quote.
    /// A backslash escapes the following byte unconditionally; a bare
    /// newline terminates the literal without consuming it, leaving it
    /// unterminated but still returned as a token.
    fn lex_quoted(&mut self, quote: u8) {
        self.cursor.advance(); // opening quote
        loop {
            if self.cursor.is_at_end() || self.cursor.current() == b'\n' {
                return;
            }
            if self.cursor.current() == b'\\' {
                self.cursor.advance();
                if !self.cursor.is_at_end() {
                    self.cursor.advance();
                }
                continue;
            }
            if self.cursor.current() == quote {
                self.cursor.advance();
                return;
            }
            self.cursor.advance();
        }
    }
}

/// Lexes `source` and returns the full token stream (identifiers that are
/// keywords are already classified as [`TokenKind::Keyword`]).
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source)
        .tokenize()
        .into_iter()
        .map(|mut t| {
            if t.kind == TokenKind::Ident && is_keyword(&t.lexeme) {
                t.kind = TokenKind::Keyword;
            }
            t
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lexemes(source: &str) -> Vec<(TokenKind, String)> {
        lex(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::End)
            .map(|t| (t.kind, t.lexeme))
            .collect()
    }

    #[test]
    fn skips_whitespace_and_line_comments() {
        let toks = lexemes("int x; // a pointer\n int y;");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Ident, "x".into()),
                (TokenKind::Punctuation, ";".into()),
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Ident, "y".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn block_comment_unterminated_consumes_to_end() {
        let toks = lexemes("int x; /* never closes");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Ident, "x".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn preprocessor_line_is_discarded_with_continuation() {
        let toks = lexemes("#define FOO \\\n  1\nint x;");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Ident, "x".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn string_and_char_literals_share_a_kind() {
        let toks = lexemes(r#" "hi\"there" 'a' "#);
        assert_eq!(
            toks,
            vec![
                (TokenKind::String, "\"hi\\\"there\"".into()),
                (TokenKind::String, "'a'".into()),
            ]
        );
    }

    #[test]
    fn unterminated_string_stops_at_newline() {
        let toks = lexemes("\"never closes\nint x;");
        assert_eq!(toks[0], (TokenKind::String, "\"never closes".into()));
    }

    #[test]
    fn numbers_are_greedy_and_unvalidated() {
        let toks = lexemes("0x1F 3.14 42");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Number, "0x1F".into()),
                (TokenKind::Number, "3.14".into()),
                (TokenKind::Number, "42".into()),
            ]
        );
    }

    #[test]
    fn two_char_operators_are_matched_greedily() {
        let toks = lexemes("a::b -> c == d != e && f || g += 1");
        let ops: Vec<_> = toks
            .iter()
            .filter(|(k, _)| *k == TokenKind::Operator)
            .map(|(_, s)| s.as_str())
            .collect();
        assert_eq!(ops, vec!["::", "->", "==", "!=", "&&", "||", "+="]);
    }

    #[test]
    fn stray_colon_is_punctuation_not_operator() {
        let toks = lexemes("public : x");
        assert_eq!(toks[1], (TokenKind::Punctuation, ":".into()));
    }

    #[test]
    fn unrecognized_bytes_are_silently_skipped() {
        let toks = lexemes("int @ x $ ;");
        assert_eq!(
            toks,
            vec![
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Ident, "x".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn keyword_set_classifies_exact_matches_only() {
        let toks = lexemes("class classy");
        assert_eq!(toks[0].0, TokenKind::Keyword);
        assert_eq!(toks[1].0, TokenKind::Ident);
    }

    #[test]
    fn always_ends_with_end_token() {
        let toks = lex("int x;");
        assert_eq!(toks.last().unwrap().kind, TokenKind::End);
    }

    #[test]
    fn line_column_tracking_survives_comments_and_strings() {
        let toks = lex("int x;\n// comment\nint y;");
        let y_tok = toks
            .iter()
            .find(|t| t.lexeme == "y")
            .expect("y token present");
        assert_eq!(y_tok.span.line, 3);
    }
}
