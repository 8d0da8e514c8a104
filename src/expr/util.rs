//! Builder helpers, lenient evaluation, and string interpolation.

use super::ast::{BinaryOp, Expression, Variables};
use super::parser::parse_expression;
use super::value::Value;
use crate::ParseError;

/// Character that opens and closes an embedded expression in [`expand`].
const DELIMITER: char = '#';

/// Wrap a value in a constant expression.
pub fn constant(value: impl Into<Value>) -> Expression {
    Expression::Constant(value.into())
}

/// Logical AND of two expressions, folded when the left operand is a
/// boolean constant.
///
/// `logical_and(FALSE, x)` is the `FALSE` singleton and drops `x` without
/// retaining it; `logical_and(TRUE, x)` is `x` unchanged. The folding never
/// changes evaluation results — it only guarantees that `x` is not
/// evaluated in the folded cases.
pub fn logical_and(lhs: Expression, rhs: Expression) -> Expression {
    match lhs {
        Expression::Constant(Value::Bool(false)) => Expression::FALSE,
        Expression::Constant(Value::Bool(true)) => rhs,
        _ => Expression::Binary(BinaryOp::And, Box::new(lhs), Box::new(rhs)),
    }
}

/// Logical OR of two expressions, folded symmetrically to [`logical_and`].
pub fn logical_or(lhs: Expression, rhs: Expression) -> Expression {
    match lhs {
        Expression::Constant(Value::Bool(true)) => Expression::TRUE,
        Expression::Constant(Value::Bool(false)) => rhs,
        _ => Expression::Binary(BinaryOp::Or, Box::new(lhs), Box::new(rhs)),
    }
}

/// Evaluate `expression`, rendering any failure as an inline marker string
/// instead of propagating it.
///
/// Meant for best-effort template rendering, where a broken placeholder
/// should show up in the output rather than abort the whole render.
pub fn evaluate_leniently(expression: &Expression, variables: &dyn Variables) -> String {
    match expression.evaluate(variables) {
        Ok(value) => value.to_string(),
        Err(e) => format!("*** {e} ***"),
    }
}

/// Parse a host string containing `#`-delimited embedded expressions into a
/// single composite expression.
///
/// Text outside delimiters becomes constant string fragments; text between
/// a pair of delimiters is parsed as an expression. The result is the
/// left-to-right concatenation of all fragments:
///
/// ```text
/// "#1+2#-ok"  ──>  Concat[ (1+2), "-ok" ]  ──evaluate──>  "3-ok"
/// ```
///
/// `is_valid_variable_name` decides which bare identifiers may appear as
/// variable references inside the embedded expressions. A delimiter without
/// a closing partner is an error.
pub fn expand(
    source: &str,
    is_valid_variable_name: &dyn Fn(&str) -> bool,
) -> Result<Expression, ParseError> {
    let mut fragments = Vec::new();
    let mut rest = source;
    let mut consumed = 0;

    while let Some(open) = rest.find(DELIMITER) {
        if open > 0 {
            fragments.push(Expression::Constant(Value::Str(rest[..open].to_string())));
        }
        let after = &rest[open + DELIMITER.len_utf8()..];
        let Some(close) = after.find(DELIMITER) else {
            return Err(ParseError::UnterminatedExpansion { offset: consumed + open });
        };
        fragments.push(parse_expression(&after[..close], is_valid_variable_name)?);

        let advanced = open + DELIMITER.len_utf8() + close + DELIMITER.len_utf8();
        consumed += advanced;
        rest = &rest[advanced..];
    }
    if !rest.is_empty() {
        fragments.push(Expression::Constant(Value::Str(rest.to_string())));
    }

    Ok(Expression::Concat(fragments))
}
