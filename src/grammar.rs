//! Rule registration and the state table.
//!
//! This module holds the *static* side of the toolkit: the structures built at
//! grammar-definition time and shared read-only by every scanner afterwards.
//!
//! A [`Grammar`] owns all rules in a single arena (`Vec<Rule>`, indexed by
//! `RuleId`) plus one ordered id list per state: one for the default state and
//! one per named state. Registering the same rule in several states stores the
//! rule once and its id in each list, so a later transition change through the
//! returned [`RuleHandle`] is visible in all of them.
//!
//! ## Invariants
//!
//! - `RuleId` is an index into `Grammar::rules`; id lists and the arena must
//!   stay aligned.
//! - Every `GoTo`/`Push` target state has an entry in the state table. The
//!   table is pre-populated from [`State::VALUES`] and transition methods
//!   create missing entries, so the invariant holds by construction.
//! - Registration is append-only: rules within a state are tried in
//!   registration order. First match wins, not longest match — downstream
//!   grammars depend on that ordering.
//!
//! Rules must not be modified once a [`Scanner`](crate::Scanner) borrows the
//! grammar; the borrow checker enforces this.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Rule identifier (index into the rules arena).
pub(crate) type RuleId = usize;

/// A named scanner state type.
///
/// Implementors are normally fieldless enums; [`VALUES`](State::VALUES) lists
/// every state once, in declaration order. The list is consulted when a rule
/// is registered in "any state" and to pre-populate the state table.
pub trait State: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Every state of the grammar.
    const VALUES: &'static [Self];
}

/// State type for grammars that never leave the default state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stateless {}

impl State for Stateless {
    const VALUES: &'static [Self] = &[];
}

/// Names one rule list of a grammar: the default one, or a named state's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateSpec<S> {
    Default,
    Named(S),
}

impl<S: State> StateSpec<S> {
    pub(crate) fn describe(self) -> String {
        match self {
            StateSpec::Default => "default".to_string(),
            StateSpec::Named(state) => format!("{state:?}"),
        }
    }
}

/// What the scanner does with its current rule list after a rule matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    /// Keep the current rule list.
    Remain,
    /// Switch to the named state's rule list.
    GoTo(S),
    /// Save the current rule list on the state stack, then switch.
    Push(S),
    /// Restore the most recently saved rule list.
    Pop,
}

/// A scanning rule: an anchored pattern, the token type it produces, and a
/// state transition.
pub(crate) struct Rule<T, S> {
    pub(crate) pattern: Regex,
    pub(crate) token_type: T,
    pub(crate) transition: Transition<S>,
}

/// Error returned when a rule cannot be registered.
#[derive(Debug)]
pub enum GrammarError {
    InvalidPattern { pattern: String, error: regex::Error },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidPattern { pattern, error } => {
                write!(f, "invalid rule pattern {pattern:?}: {error}")
            }
        }
    }
}

impl std::error::Error for GrammarError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GrammarError::InvalidPattern { error, .. } => Some(error),
        }
    }
}

/// The rule/state table: a default rule list plus one rule list per named
/// state.
///
/// Built once, append-only, then shared read-only by every
/// [`Scanner`](crate::Scanner) created from it.
pub struct Grammar<T, S: State = Stateless> {
    rules: Vec<Rule<T, S>>,
    default_state: Vec<RuleId>,
    states: HashMap<S, Vec<RuleId>>,
}

impl<T: crate::TokenType, S: State> Grammar<T, S> {
    pub fn new() -> Self {
        Grammar {
            rules: Vec::new(),
            default_state: Vec::new(),
            states: S::VALUES.iter().map(|state| (*state, Vec::new())).collect(),
        }
    }

    /// Register a rule effective only in the default state.
    pub fn add_rule(&mut self, pattern: &str, token_type: T) -> Result<RuleHandle<'_, T, S>, GrammarError> {
        self.register(&[StateSpec::Default], pattern, token_type)
    }

    /// Register a rule effective only in the named state.
    pub fn add_rule_in(
        &mut self,
        state: S,
        pattern: &str,
        token_type: T,
    ) -> Result<RuleHandle<'_, T, S>, GrammarError> {
        self.register(&[StateSpec::Named(state)], pattern, token_type)
    }

    /// Register one rule in each of the given states.
    pub fn add_rule_in_states(
        &mut self,
        states: &[StateSpec<S>],
        pattern: &str,
        token_type: T,
    ) -> Result<RuleHandle<'_, T, S>, GrammarError> {
        self.register(states, pattern, token_type)
    }

    /// Register one rule in every state, the default state included.
    pub fn add_rule_in_any_state(
        &mut self,
        pattern: &str,
        token_type: T,
    ) -> Result<RuleHandle<'_, T, S>, GrammarError> {
        let mut targets = vec![StateSpec::Default];
        targets.extend(S::VALUES.iter().copied().map(StateSpec::Named));
        self.register(&targets, pattern, token_type)
    }

    fn register(
        &mut self,
        targets: &[StateSpec<S>],
        pattern: &str,
        token_type: T,
    ) -> Result<RuleHandle<'_, T, S>, GrammarError> {
        // `\A(?:..)` anchors the pattern at the cursor and lets it match a
        // prefix of the remaining input without requiring a match to the end.
        let compiled = Regex::new(&format!(r"\A(?:{pattern})")).map_err(|error| {
            GrammarError::InvalidPattern { pattern: pattern.to_string(), error }
        })?;

        let id = self.rules.len();
        self.rules.push(Rule { pattern: compiled, token_type, transition: Transition::Remain });
        for target in targets {
            match target {
                StateSpec::Default => self.default_state.push(id),
                StateSpec::Named(state) => self.states.entry(*state).or_default().push(id),
            }
        }
        Ok(RuleHandle { grammar: self, id })
    }

    pub(crate) fn rule_ids(&self, state: StateSpec<S>) -> &[RuleId] {
        match state {
            StateSpec::Default => &self.default_state,
            StateSpec::Named(s) => self.states.get(&s).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    pub(crate) fn rule(&self, id: RuleId) -> &Rule<T, S> {
        &self.rules[id]
    }
}

impl<T: crate::TokenType, S: State> Default for Grammar<T, S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable handle to a freshly registered rule.
///
/// Valid only while the grammar is still being built; the default transition
/// is [`Transition::Remain`].
pub struct RuleHandle<'g, T, S: State> {
    grammar: &'g mut Grammar<T, S>,
    id: RuleId,
}

impl<T, S: State> core::fmt::Debug for RuleHandle<'_, T, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleHandle").field("id", &self.id).finish()
    }
}

impl<T: crate::TokenType, S: State> RuleHandle<'_, T, S> {
    /// Switch to `state` when this rule matches.
    pub fn go_to(self, state: S) -> Self {
        self.grammar.states.entry(state).or_default();
        self.grammar.rules[self.id].transition = Transition::GoTo(state);
        self
    }

    /// Save the current rule list and switch to `state` when this rule
    /// matches.
    pub fn push(self, state: S) -> Self {
        self.grammar.states.entry(state).or_default();
        self.grammar.rules[self.id].transition = Transition::Push(state);
        self
    }

    /// Restore the most recently saved rule list when this rule matches.
    ///
    /// The scanner panics if a pop rule fires while the state stack is empty.
    pub fn pop(self) -> Self {
        self.grammar.rules[self.id].transition = Transition::Pop;
        self
    }
}
