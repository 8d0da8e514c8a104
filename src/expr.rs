//! Embedded expression language.
//!
//! A small, dynamically typed expression language built on the scanner and
//! parser layers of this crate, plus a `#`-delimited string-interpolation
//! expander. Parsing an expression source string is a pipeline:
//!
//! ```text
//! source ── Scanner(EXPRESSION_GRAMMAR) ── Filtered(drop Space)
//!                                               │
//!                                               v
//!                                  ExpressionParser (parser.rs)
//!                                    - precedence climbing
//!                                    - logical constant folding
//!                                               │
//!                                               v
//!                                   Expression ── evaluate(vars) ──> Value
//! ```
//!
//! Expression trees are immutable: build once (per source string), evaluate
//! any number of times against different variable mappings.
//!
//! ## Responsibilities by module
//!
//! - `value.rs`: the runtime [`Value`] type, its coercions and arithmetic.
//! - `ast.rs`: [`Expression`] nodes and evaluation, the [`Variables`]
//!   lookup seam.
//! - `tokens.rs`: the scanner grammar for expression syntax.
//! - `parser.rs`: precedence-climbing construction of expression trees.
//! - `util.rs`: builder helpers (`logical_and`, `logical_or`, `constant`),
//!   lenient evaluation, and the [`expand`] interpolation entry point.
//!
//! ## Operators, loosest-binding first
//!
//! `||` — `&&` — `== != < <= > >=` — `+ -` — `* / %` — unary `- !`
//!
//! `&&` and `||` short-circuit at evaluation time, and fold at construction
//! time when the left operand is a boolean constant: `logical_and(FALSE, x)`
//! is `FALSE` and drops `x` entirely, so `x` can never be evaluated.
//!
//! # Example
//! ```
//! use scansion::expr::{Value, expand};
//! use std::collections::HashMap;
//!
//! let template = expand("#price * count# coins", &|_| true)?;
//!
//! let vars: HashMap<String, Value> = [
//!     ("price".to_string(), Value::Int(3)),
//!     ("count".to_string(), Value::Int(4)),
//! ]
//! .into_iter()
//! .collect();
//! assert_eq!(template.evaluate(&vars)?, Value::Str("12 coins".to_string()));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#[path = "expr/ast.rs"]
mod ast;
#[path = "expr/parser.rs"]
mod parser;
#[path = "expr/tokens.rs"]
mod tokens;
#[path = "expr/util.rs"]
mod util;
#[path = "expr/value.rs"]
mod value;

pub use ast::{BinaryOp, Expression, UnaryOp, Variables};
pub use parser::parse_expression;
pub use tokens::ExprToken;
pub use util::{constant, evaluate_leniently, expand, logical_and, logical_or};
pub use value::{EvalError, Value};
