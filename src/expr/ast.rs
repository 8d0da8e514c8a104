//! Expression trees and evaluation.

use super::value::{EvalError, Value};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Variable lookup supplied by the caller at evaluation time.
///
/// Implemented for `HashMap<String, Value>`; implement it directly to back
/// variables with something else (an environment, a row, a scope chain).
pub trait Variables {
    fn lookup(&self, name: &str) -> Option<Value>;
}

impl Variables for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl BinaryOp {
    /// Source-level spelling, used in diagnostics.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Not,
}

/// An immutable expression tree node.
///
/// Built once by the expression parser (or the builder helpers in
/// [`expr`](crate::expr)), evaluated any number of times against different
/// variable mappings.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Constant(Value),
    /// Left-to-right string concatenation of the rendered fragments;
    /// produced by [`expand`](crate::expr::expand).
    Concat(Vec<Expression>),
    Unary(UnaryOp, Box<Expression>),
    Binary(BinaryOp, Box<Expression>, Box<Expression>),
    Variable(String),
}

impl Expression {
    /// The boolean constant `true`; the well-known singleton used by the
    /// logical folding helpers.
    pub const TRUE: Expression = Expression::Constant(Value::Bool(true));
    /// The boolean constant `false`.
    pub const FALSE: Expression = Expression::Constant(Value::Bool(false));

    /// Evaluate the tree against `variables`.
    ///
    /// `&&` and `||` short-circuit: the right operand is not evaluated when
    /// the left one decides the result.
    pub fn evaluate(&self, variables: &dyn Variables) -> Result<Value, EvalError> {
        match self {
            Expression::Constant(value) => Ok(value.clone()),

            Expression::Variable(name) => variables
                .lookup(name)
                .ok_or_else(|| EvalError::UndefinedVariable(name.clone())),

            Expression::Concat(fragments) => {
                let mut out = String::new();
                for fragment in fragments {
                    out.push_str(&fragment.evaluate(variables)?.to_string());
                }
                Ok(Value::Str(out))
            }

            Expression::Unary(op, inner) => {
                let value = inner.evaluate(variables)?;
                match op {
                    UnaryOp::Neg => value.arith_neg(),
                    UnaryOp::Not => Ok(Value::Bool(!value.as_bool())),
                }
            }

            Expression::Binary(BinaryOp::And, lhs, rhs) => {
                if !lhs.evaluate(variables)?.as_bool() {
                    return Ok(Value::Bool(false));
                }
                Ok(Value::Bool(rhs.evaluate(variables)?.as_bool()))
            }

            Expression::Binary(BinaryOp::Or, lhs, rhs) => {
                if lhs.evaluate(variables)?.as_bool() {
                    return Ok(Value::Bool(true));
                }
                Ok(Value::Bool(rhs.evaluate(variables)?.as_bool()))
            }

            Expression::Binary(op, lhs, rhs) => {
                let l = lhs.evaluate(variables)?;
                let r = rhs.evaluate(variables)?;
                match op {
                    BinaryOp::Add => l.arith_add(&r),
                    BinaryOp::Sub => l.arith_sub(&r),
                    BinaryOp::Mul => l.arith_mul(&r),
                    BinaryOp::Div => l.arith_div(&r),
                    BinaryOp::Rem => l.arith_rem(&r),
                    BinaryOp::Eq => Ok(Value::Bool(l.compare(&r, op.symbol())? == Ordering::Equal)),
                    BinaryOp::Ne => Ok(Value::Bool(l.compare(&r, op.symbol())? != Ordering::Equal)),
                    BinaryOp::Lt => Ok(Value::Bool(l.compare(&r, op.symbol())? == Ordering::Less)),
                    BinaryOp::Le => Ok(Value::Bool(matches!(
                        l.compare(&r, op.symbol())?,
                        Ordering::Less | Ordering::Equal
                    ))),
                    BinaryOp::Gt => {
                        Ok(Value::Bool(l.compare(&r, op.symbol())? == Ordering::Greater))
                    }
                    BinaryOp::Ge => Ok(Value::Bool(matches!(
                        l.compare(&r, op.symbol())?,
                        Ordering::Greater | Ordering::Equal
                    ))),
                    BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
                }
            }
        }
    }
}
