//! A rule-driven tokenizing/parsing toolkit.
//!
//! The crate is three layers, each built on the one below:
//!
//! ```text
//! rules ──┐
//!         │  Grammar::add_rule*          (grammar.rs)
//!         └───────────────┬─────────────
//!                         │
//! input ── Scanner ───────┼─ apply current state's rules in order
//!         (scanner.rs)    │  (first match wins, anchored at the cursor)
//!                         v
//!                  Parser (parser.rs)
//!                    - one token of lookahead
//!                    - peek / read / peek_read / unread / eoi
//!                         │
//!                         v
//!                  expression language (expr/)
//!                    - precedence-climbing parser over the same core
//!                    - evaluation against a variable mapping
//!                    - `#`-delimited string interpolation
//! ```
//!
//! A [`Grammar`] is built once (append-only) and then shared read-only by any
//! number of [`Scanner`] instances, each of which owns its own cursor and
//! state stack. Rules within a state are tried in registration order; the
//! first rule whose pattern matches a prefix at the cursor wins, even when a
//! later rule would match a longer prefix. Grammar authors therefore order
//! more specific patterns before more general ones.
//!
//! # Example
//! ```
//! use scansion::{Grammar, Scanner};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
//! enum Tok { Word, Space }
//!
//! let mut grammar: Grammar<Tok> = Grammar::new();
//! grammar.add_rule(r"[a-z]+", Tok::Word)?;
//! grammar.add_rule(r"\s+", Tok::Space)?;
//!
//! let mut scanner = Scanner::new(&grammar, "hello world");
//! let first = scanner.produce()?.unwrap();
//! assert_eq!((first.token_type, first.text.as_str()), (Tok::Word, "hello"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! Set `SCANSION_DEBUG=1` to print rule-match traces to stderr.

mod grammar;
mod parser;
mod scanner;

pub mod expr;

pub use grammar::{Grammar, GrammarError, RuleHandle, State, StateSpec, Stateless, Transition};
pub use parser::{ParseError, Parser};
pub use scanner::{ScanError, Scanner, Tokens};

use std::fmt;

// --- Shared data model -------------------------------------------------------

/// Marker for token classification tags.
///
/// Blanket-implemented for any `Copy + Eq + Debug` type; grammars normally
/// use a fieldless enum.
pub trait TokenType: Copy + Eq + fmt::Debug {}

impl<T: Copy + Eq + fmt::Debug> TokenType for T {}

/// A classified unit of lexical text.
///
/// Produced by a [`Scanner`] (or any other [`TokenProducer`]); immutable once
/// created. `captured` holds the text of capture groups `1..` of the rule
/// pattern that matched (group 0 is `text` itself); groups that did not
/// participate in the match are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<T> {
    pub token_type: T,
    pub text: String,
    pub captured: Vec<Option<String>>,
}

/// Pull-based token source: produce the next token, or `None` at end of
/// input.
///
/// [`Parser`] consumes any implementation of this contract identically,
/// whether it is a [`Scanner`] or a hand-written producer.
pub trait TokenProducer<T> {
    fn produce(&mut self) -> Result<Option<Token<T>>, ScanError>;
}

/// Producer adapter that silently drops tokens matching a predicate.
///
/// Used by the expression layer to discard whitespace tokens before they
/// reach the parser.
pub struct Filtered<P, F> {
    source: P,
    drop_if: F,
}

impl<P, F> Filtered<P, F> {
    pub fn new(source: P, drop_if: F) -> Self {
        Filtered { source, drop_if }
    }
}

impl<T, P, F> TokenProducer<T> for Filtered<P, F>
where
    P: TokenProducer<T>,
    F: FnMut(&Token<T>) -> bool,
{
    fn produce(&mut self) -> Result<Option<Token<T>>, ScanError> {
        loop {
            match self.source.produce()? {
                Some(token) if (self.drop_if)(&token) => continue,
                other => return Ok(other),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Tok {
        Word,
        Space,
    }

    fn word_grammar() -> Grammar<Tok> {
        let mut g = Grammar::new();
        g.add_rule(r"[a-z]+", Tok::Word).unwrap();
        g.add_rule(r"\s+", Tok::Space).unwrap();
        g
    }

    #[test]
    fn filtered_drops_matching_tokens() {
        let grammar = word_grammar();
        let scanner = Scanner::new(&grammar, "a b c");
        let mut filtered = Filtered::new(scanner, |t: &Token<Tok>| t.token_type == Tok::Space);

        let mut words = Vec::new();
        while let Some(token) = filtered.produce().unwrap() {
            words.push(token.text);
        }
        assert_eq!(words, ["a", "b", "c"]);
    }

    #[test]
    fn filtered_passes_errors_through() {
        let grammar = word_grammar();
        let scanner = Scanner::new(&grammar, "a ?");
        let mut filtered = Filtered::new(scanner, |t: &Token<Tok>| t.token_type == Tok::Space);

        assert!(filtered.produce().unwrap().is_some());
        let err = filtered.produce().unwrap_err();
        assert_eq!(err.offset, 2);
    }
}
