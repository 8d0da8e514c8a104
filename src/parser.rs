//! One-token-lookahead parser core.
//!
//! [`Parser`] wraps any [`TokenProducer`] and buffers at most one token:
//!
//! ```text
//! producer ──> [ lookahead: Option<Token> ] ──> peek* (inspect, keep)
//!                                          └──> read* / peek_read* (consume)
//! ```
//!
//! `peek` fills the buffer and is idempotent until the token is consumed.
//! `unread` pushes a token back as the next lookahead and panics if the
//! buffer is occupied — one token of buffering is all this layer supports,
//! which is enough for the LL(1) grammars built on it.
//!
//! The consuming `read*` variants raise a [`ParseError`] whose message
//! enumerates the expected alternatives against what was actually found,
//! so callers get a precise diagnostic without extra bookkeeping.

use crate::{ScanError, Token, TokenProducer, TokenType};
use std::fmt;

/// Error raised by the parser core and everything built on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The underlying token producer failed.
    Scan(ScanError),
    /// The next token does not match what the grammar production expects.
    UnexpectedToken { expected: String, found: String },
    /// Input ended where a token was required.
    UnexpectedEndOfInput { expected: String },
    /// An identifier was rejected by the caller's variable-name predicate.
    InvalidVariableName { name: String },
    /// An interpolation segment opened with a delimiter that is never
    /// closed.
    UnterminatedExpansion { offset: usize },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Scan(e) => write!(f, "{e}"),
            ParseError::UnexpectedToken { expected, found } => {
                write!(f, "expected {expected} instead of {found}")
            }
            ParseError::UnexpectedEndOfInput { expected } => {
                write!(f, "expected {expected} instead of end of input")
            }
            ParseError::InvalidVariableName { name } => {
                write!(f, "invalid variable name \"{name}\"")
            }
            ParseError::UnterminatedExpansion { offset } => {
                write!(f, "unterminated embedded expression at offset {offset}")
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Scan(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScanError> for ParseError {
    fn from(e: ScanError) -> Self {
        ParseError::Scan(e)
    }
}

fn describe_candidates(candidates: &[&str]) -> String {
    match candidates {
        [single] => format!("'{single}'"),
        _ => {
            let quoted: Vec<String> = candidates.iter().map(|c| format!("'{c}'")).collect();
            format!("one of {}", quoted.join(", "))
        }
    }
}

/// One-token-lookahead layer over a [`TokenProducer`].
pub struct Parser<T, P> {
    source: P,
    lookahead: Option<Token<T>>,
}

impl<T: TokenType, P: TokenProducer<T>> Parser<T, P> {
    pub fn new(source: P) -> Self {
        Parser { source, lookahead: None }
    }

    fn ensure(&mut self) -> Result<(), ParseError> {
        if self.lookahead.is_none() {
            self.lookahead = self.source.produce()?;
        }
        Ok(())
    }

    fn describe_lookahead(&self) -> String {
        match &self.lookahead {
            Some(t) => format!("'{}' ({:?})", t.text, t.token_type),
            None => "end of input".to_string(),
        }
    }

    fn expectation_error(&self, expected: String) -> ParseError {
        match &self.lookahead {
            Some(t) => ParseError::UnexpectedToken {
                expected,
                found: format!("'{}' ({:?})", t.text, t.token_type),
            },
            None => ParseError::UnexpectedEndOfInput { expected },
        }
    }

    /// Return the next token without consuming it. Idempotent until a
    /// consuming call intervenes.
    pub fn peek(&mut self) -> Result<Option<&Token<T>>, ParseError> {
        self.ensure()?;
        Ok(self.lookahead.as_ref())
    }

    /// If the next token has the given type, return its text; do not
    /// consume.
    pub fn peek_type(&mut self, token_type: T) -> Result<Option<String>, ParseError> {
        self.ensure()?;
        Ok(self
            .lookahead
            .as_ref()
            .filter(|t| t.token_type == token_type)
            .map(|t| t.text.clone()))
    }

    /// Whether the next token's text equals `text`; does not consume.
    pub fn peek_text(&mut self, text: &str) -> Result<bool, ParseError> {
        self.ensure()?;
        Ok(self.lookahead.as_ref().is_some_and(|t| t.text == text))
    }

    /// Index of the next token's text among `candidates`, if any; does not
    /// consume.
    pub fn peek_any_text(&mut self, candidates: &[&str]) -> Result<Option<usize>, ParseError> {
        self.ensure()?;
        Ok(self
            .lookahead
            .as_ref()
            .and_then(|t| candidates.iter().position(|c| *c == t.text)))
    }

    /// Like [`peek_type`](Self::peek_type), but consumes the token iff it
    /// matches.
    pub fn peek_read_type(&mut self, token_type: T) -> Result<Option<String>, ParseError> {
        let text = self.peek_type(token_type)?;
        if text.is_some() {
            self.lookahead = None;
        }
        Ok(text)
    }

    /// Like [`peek_text`](Self::peek_text), but consumes the token iff it
    /// matches.
    pub fn peek_read_text(&mut self, text: &str) -> Result<bool, ParseError> {
        let matched = self.peek_text(text)?;
        if matched {
            self.lookahead = None;
        }
        Ok(matched)
    }

    /// Like [`peek_any_text`](Self::peek_any_text), but consumes the token
    /// iff it matches.
    pub fn peek_read_any_text(&mut self, candidates: &[&str]) -> Result<Option<usize>, ParseError> {
        let index = self.peek_any_text(candidates)?;
        if index.is_some() {
            self.lookahead = None;
        }
        Ok(index)
    }

    /// Consume and return the next token; fail at end of input.
    pub fn read(&mut self) -> Result<Token<T>, ParseError> {
        self.ensure()?;
        self.lookahead
            .take()
            .ok_or_else(|| ParseError::UnexpectedEndOfInput { expected: "a token".to_string() })
    }

    /// Consume the next token, which must have the given type.
    pub fn read_type(&mut self, token_type: T) -> Result<Token<T>, ParseError> {
        self.ensure()?;
        let matches = matches!(&self.lookahead, Some(t) if t.token_type == token_type);
        if matches {
            Ok(self.lookahead.take().unwrap())
        } else {
            Err(self.expectation_error(format!("{token_type:?}")))
        }
    }

    /// Consume the next token, whose text must equal `text`.
    pub fn read_text(&mut self, text: &str) -> Result<(), ParseError> {
        self.ensure()?;
        let matches = matches!(&self.lookahead, Some(t) if t.text == text);
        if matches {
            self.lookahead = None;
            Ok(())
        } else {
            Err(self.expectation_error(format!("'{text}'")))
        }
    }

    /// Consume the next token, whose text must be one of `candidates`;
    /// returns the matching index.
    pub fn read_any_text(&mut self, candidates: &[&str]) -> Result<usize, ParseError> {
        self.ensure()?;
        let index = self
            .lookahead
            .as_ref()
            .and_then(|t| candidates.iter().position(|c| *c == t.text));
        match index {
            Some(i) => {
                self.lookahead = None;
                Ok(i)
            }
            None => Err(self.expectation_error(describe_candidates(candidates))),
        }
    }

    /// Push `token` back as the next lookahead.
    ///
    /// Panics if a lookahead is already buffered; only one token of
    /// buffering is supported.
    pub fn unread(&mut self, token: Token<T>) {
        assert!(
            self.lookahead.is_none(),
            "unread: a lookahead token is already buffered"
        );
        self.lookahead = Some(token);
    }

    /// Assert that no tokens remain.
    pub fn eoi(&mut self) -> Result<(), ParseError> {
        self.ensure()?;
        if self.lookahead.is_none() {
            Ok(())
        } else {
            Err(ParseError::UnexpectedToken {
                expected: "end of input".to_string(),
                found: self.describe_lookahead(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Grammar, Scanner};

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tok {
        Word,
        Number,
        Punct,
    }

    fn grammar() -> Grammar<Tok> {
        let mut g = Grammar::new();
        g.add_rule(r"[a-z]+", Tok::Word).unwrap();
        g.add_rule(r"[0-9]+", Tok::Number).unwrap();
        g.add_rule(r"[,;]", Tok::Punct).unwrap();
        g
    }

    fn parser<'a>(g: &'a Grammar<Tok>, input: &'a str) -> Parser<Tok, Scanner<'a, Tok>> {
        Parser::new(Scanner::new(g, input))
    }

    #[test]
    fn peek_is_idempotent() {
        let g = grammar();
        let mut p = parser(&g, "ab,cd");
        let first = p.peek().unwrap().cloned();
        let second = p.peek().unwrap().cloned();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().text, "ab");
    }

    #[test]
    fn read_consumes_in_order() {
        let g = grammar();
        let mut p = parser(&g, "ab,cd");
        assert_eq!(p.read().unwrap().text, "ab");
        assert_eq!(p.read().unwrap().text, ",");
        assert_eq!(p.read().unwrap().text, "cd");
        assert!(matches!(
            p.read(),
            Err(ParseError::UnexpectedEndOfInput { .. })
        ));
    }

    #[test]
    fn peek_type_matches_without_consuming() {
        let g = grammar();
        let mut p = parser(&g, "ab");
        assert_eq!(p.peek_type(Tok::Number).unwrap(), None);
        assert_eq!(p.peek_type(Tok::Word).unwrap(), Some("ab".to_string()));
        assert_eq!(p.read().unwrap().text, "ab");
    }

    #[test]
    fn peek_read_consumes_only_on_match() {
        let g = grammar();
        let mut p = parser(&g, "ab,");
        assert!(!p.peek_read_text(",").unwrap());
        assert!(p.peek_read_text("ab").unwrap());
        assert!(p.peek_read_text(",").unwrap());
        p.eoi().unwrap();
    }

    #[test]
    fn peek_read_type_returns_text() {
        let g = grammar();
        let mut p = parser(&g, "42;");
        assert_eq!(p.peek_read_type(Tok::Word).unwrap(), None);
        assert_eq!(p.peek_read_type(Tok::Number).unwrap(), Some("42".to_string()));
        assert_eq!(p.read().unwrap().text, ";");
    }

    #[test]
    fn any_text_variants_return_the_index() {
        let g = grammar();
        let mut p = parser(&g, "cd,");
        assert_eq!(p.peek_any_text(&["ab", "cd"]).unwrap(), Some(1));
        assert_eq!(p.peek_read_any_text(&["ab", "cd"]).unwrap(), Some(1));
        assert_eq!(p.read_any_text(&[",", ";"]).unwrap(), 0);
    }

    #[test]
    fn read_type_mismatch_names_both_sides() {
        let g = grammar();
        let mut p = parser(&g, "ab");
        let err = p.read_type(Tok::Number).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected Number instead of 'ab' (Word)"
        );
    }

    #[test]
    fn read_any_text_mismatch_lists_candidates() {
        let g = grammar();
        let mut p = parser(&g, "ab");
        let err = p.read_any_text(&[",", ";"]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "expected one of ',', ';' instead of 'ab' (Word)"
        );
    }

    #[test]
    fn read_text_at_end_of_input_mentions_the_marker() {
        let g = grammar();
        let mut p = parser(&g, "");
        let err = p.read_text(",").unwrap_err();
        assert_eq!(err.to_string(), "expected ',' instead of end of input");
    }

    #[test]
    fn unread_restores_the_token() {
        let g = grammar();
        let mut p = parser(&g, "ab,");
        let token = p.read().unwrap();
        p.unread(token);
        assert_eq!(p.read().unwrap().text, "ab");
    }

    #[test]
    #[should_panic(expected = "already buffered")]
    fn unread_with_pending_lookahead_panics() {
        let g = grammar();
        let mut p = parser(&g, "ab,cd");
        p.peek().unwrap();
        let stray = Token { token_type: Tok::Word, text: "x".to_string(), captured: Vec::new() };
        p.unread(stray);
    }

    #[test]
    fn eoi_rejects_trailing_tokens() {
        let g = grammar();
        let mut p = parser(&g, "ab");
        let err = p.eoi().unwrap_err();
        assert_eq!(err.to_string(), "expected end of input instead of 'ab' (Word)");
        p.read().unwrap();
        p.eoi().unwrap();
    }

    #[test]
    fn scan_failures_are_wrapped() {
        let g = grammar();
        let mut p = parser(&g, "!");
        let err = p.read().unwrap_err();
        assert!(matches!(err, ParseError::Scan(ref s) if s.offset == 0));
    }

    // The parser works over any producer, not just a scanner.
    struct CannedTokens(Vec<Token<Tok>>);

    impl TokenProducer<Tok> for CannedTokens {
        fn produce(&mut self) -> Result<Option<Token<Tok>>, ScanError> {
            if self.0.is_empty() { Ok(None) } else { Ok(Some(self.0.remove(0))) }
        }
    }

    #[test]
    fn composes_with_hand_written_producers() {
        let tokens = vec![
            Token { token_type: Tok::Word, text: "hello".to_string(), captured: Vec::new() },
            Token { token_type: Tok::Punct, text: ",".to_string(), captured: Vec::new() },
        ];
        let mut p = Parser::new(CannedTokens(tokens));
        assert_eq!(p.read_type(Tok::Word).unwrap().text, "hello");
        assert_eq!(p.read_any_text(&[",", ";"]).unwrap(), 0);
        p.eoi().unwrap();
    }
}
