//! The scanning engine.
//!
//! A [`Scanner`] is a cursor over an in-memory character sequence plus a
//! reference into a shared [`Grammar`]. Each call to [`Scanner::produce`]
//! applies the current state's rules, in registration order, anchored at the
//! cursor:
//!
//! ```text
//! input:  he said "hi"
//!                 ^ offset
//! rules (default): [a-z]+ -> Word      no match at offset
//!                  \s+    -> Space     no match at offset
//!                  "      -> Quote     matches -> push(InString), emit token
//! ```
//!
//! The first rule whose pattern matches a prefix at the cursor wins; the
//! match need not consume the rest of the input. A rule whose pattern can
//! match the empty string never advances the cursor, so a grammar containing
//! such a rule can loop forever — ordering and pattern discipline are the
//! grammar author's responsibility.
//!
//! Scanners are single-use: the token sequence is finite and non-restartable.
//! To scan the same input again, create a fresh instance over it.
//!
//! Set `SCANSION_DEBUG=1` to print a trace of every match to stderr.

use crate::grammar::{Grammar, State, StateSpec, Transition};
use crate::{Token, TokenProducer, TokenType};
use std::fmt;

/// Error raised when no rule in the current state matches the remaining
/// input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanError {
    /// Byte offset of the offending character.
    pub offset: usize,
    /// The offending character itself.
    pub character: char,
    /// Name of the state whose rules were tried.
    pub state: String,
    /// Token types the state would have accepted, in rule order.
    pub expected: Vec<String>,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unexpected character {:?} at offset {} in state {} (expected {})",
            self.character,
            self.offset,
            self.state,
            self.expected.join(", "),
        )
    }
}

impl std::error::Error for ScanError {}

/// Rule-driven stateful lexer over an already-materialized character
/// sequence.
///
/// Cheap to create; borrows the grammar read-only, so any number of scanners
/// can share one grammar (each with a private cursor and state stack).
pub struct Scanner<'a, T, S: State = crate::Stateless> {
    grammar: &'a Grammar<T, S>,
    input: &'a str,
    offset: usize,
    previous_token_offset: usize,
    current: StateSpec<S>,
    state_stack: Vec<StateSpec<S>>,
}

impl<'a, T: TokenType, S: State> Scanner<'a, T, S> {
    pub fn new(grammar: &'a Grammar<T, S>, input: &'a str) -> Self {
        Scanner {
            grammar,
            input,
            offset: 0,
            previous_token_offset: 0,
            current: StateSpec::Default,
            state_stack: Vec::new(),
        }
    }

    /// Byte offset of the next unconsumed character.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Byte offset where the most recently produced token started.
    pub fn previous_token_offset(&self) -> usize {
        self.previous_token_offset
    }

    /// The state whose rule list the next [`produce`](Self::produce) call
    /// will apply.
    pub fn current_state(&self) -> StateSpec<S> {
        self.current
    }

    /// Number of saved rule lists. Zero in the initial state; a grammar whose
    /// push/pop rules pair up leaves this at zero at end of input.
    pub fn state_stack_depth(&self) -> usize {
        self.state_stack.len()
    }

    /// Produce the next token, or `None` at end of input.
    ///
    /// Applies the current state's rules in registration order, anchored at
    /// the cursor; the first match wins. On a match the rule's transition is
    /// applied, the cursor advances to the end of the match, and the matched
    /// text (with its capture groups) is returned.
    pub fn produce(&mut self) -> Result<Option<Token<T>>, ScanError> {
        if self.offset == self.input.len() {
            return Ok(None);
        }

        let rest = &self.input[self.offset..];
        for &id in self.grammar.rule_ids(self.current) {
            let rule = self.grammar.rule(id);
            let Some(caps) = rule.pattern.captures(rest) else {
                continue;
            };

            match rule.transition {
                Transition::Remain => {}
                Transition::GoTo(state) => self.current = StateSpec::Named(state),
                Transition::Push(state) => {
                    self.state_stack.push(self.current);
                    self.current = StateSpec::Named(state);
                }
                Transition::Pop => {
                    self.current = self
                        .state_stack
                        .pop()
                        .expect("state stack underflow: a pop rule matched in the initial state");
                }
            }

            let matched = caps.get(0).unwrap();
            let captured: Vec<Option<String>> = (1..caps.len())
                .map(|i| caps.get(i).map(|g| g.as_str().to_string()))
                .collect();
            let token = Token {
                token_type: rule.token_type,
                text: matched.as_str().to_string(),
                captured,
            };

            if std::env::var_os("SCANSION_DEBUG").is_some() {
                eprintln!(
                    "[scan] {:?} {:?} at {}..{} -> state {}",
                    token.token_type,
                    token.text,
                    self.offset,
                    self.offset + matched.end(),
                    self.current.describe(),
                );
            }

            self.previous_token_offset = self.offset;
            self.offset += matched.end();
            return Ok(Some(token));
        }

        let character = rest.chars().next().unwrap();
        Err(ScanError {
            offset: self.offset,
            character,
            state: self.current.describe(),
            expected: self.expected_token_types(),
        })
    }

    /// Consume the scanner, yielding `Result<Token, ScanError>` items until
    /// end of input.
    pub fn tokens(self) -> Tokens<'a, T, S> {
        Tokens(self)
    }

    // Token types of the current rule list, deduplicated, in rule order.
    fn expected_token_types(&self) -> Vec<String> {
        let mut expected: Vec<String> = Vec::new();
        for &id in self.grammar.rule_ids(self.current) {
            let name = format!("{:?}", self.grammar.rule(id).token_type);
            if !expected.contains(&name) {
                expected.push(name);
            }
        }
        expected
    }
}

impl<T: TokenType, S: State> TokenProducer<T> for Scanner<'_, T, S> {
    fn produce(&mut self) -> Result<Option<Token<T>>, ScanError> {
        Scanner::produce(self)
    }
}

/// Iterator over a scanner's tokens; created by [`Scanner::tokens`].
pub struct Tokens<'a, T, S: State>(Scanner<'a, T, S>);

impl<T: TokenType, S: State> Iterator for Tokens<'_, T, S> {
    type Item = Result<Token<T>, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.produce().transpose()
    }
}
