//! Precedence-climbing construction of expression trees.
//!
//! One parsing method per precedence level, loosest binding first; each
//! level loops on its own operators and delegates to the next-tighter
//! level, so the tree falls out left-associative:
//!
//! ```text
//! or ── and ── relational ── additive ── multiplicative ── unary ── primary
//! ```
//!
//! The logical levels build through [`logical_or`]/[`logical_and`] so that
//! boolean-constant operands fold at construction time.

use super::ast::{BinaryOp, Expression, UnaryOp};
use super::tokens::{EXPRESSION_GRAMMAR, ExprToken};
use super::util::{logical_and, logical_or};
use super::value::Value;
use crate::{Filtered, ParseError, Parser, Scanner, Token, TokenProducer};

/// Parse `source` as a single expression.
///
/// `is_valid_variable_name` decides which bare identifiers may appear as
/// variable references; a rejected identifier is a parse error. The
/// keywords `true` and `false` are boolean literals, never variables.
pub fn parse_expression(
    source: &str,
    is_valid_variable_name: &dyn Fn(&str) -> bool,
) -> Result<Expression, ParseError> {
    let scanner = Scanner::new(&EXPRESSION_GRAMMAR, source);
    let spaceless = Filtered::new(scanner, |t: &Token<ExprToken>| t.token_type == ExprToken::Space);
    let mut parser = ExpressionParser {
        parser: Parser::new(spaceless),
        is_valid_variable_name,
    };
    let expression = parser.or_expression()?;
    parser.parser.eoi()?;
    Ok(expression)
}

struct ExpressionParser<'a, P> {
    parser: Parser<ExprToken, P>,
    is_valid_variable_name: &'a dyn Fn(&str) -> bool,
}

impl<P: TokenProducer<ExprToken>> ExpressionParser<'_, P> {
    fn or_expression(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.and_expression()?;
        while self.parser.peek_read_text("||")? {
            let rhs = self.and_expression()?;
            lhs = logical_or(lhs, rhs);
        }
        Ok(lhs)
    }

    fn and_expression(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.relational_expression()?;
        while self.parser.peek_read_text("&&")? {
            let rhs = self.relational_expression()?;
            lhs = logical_and(lhs, rhs);
        }
        Ok(lhs)
    }

    fn relational_expression(&mut self) -> Result<Expression, ParseError> {
        const TEXTS: [&str; 6] = ["==", "!=", "<=", ">=", "<", ">"];
        const OPS: [BinaryOp; 6] = [
            BinaryOp::Eq,
            BinaryOp::Ne,
            BinaryOp::Le,
            BinaryOp::Ge,
            BinaryOp::Lt,
            BinaryOp::Gt,
        ];

        let mut lhs = self.additive_expression()?;
        while let Some(index) = self.parser.peek_read_any_text(&TEXTS)? {
            let rhs = self.additive_expression()?;
            lhs = Expression::Binary(OPS[index], Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn additive_expression(&mut self) -> Result<Expression, ParseError> {
        let mut lhs = self.multiplicative_expression()?;
        loop {
            let op = if self.parser.peek_read_text("+")? {
                BinaryOp::Add
            } else if self.parser.peek_read_text("-")? {
                BinaryOp::Sub
            } else {
                return Ok(lhs);
            };
            let rhs = self.multiplicative_expression()?;
            lhs = Expression::Binary(op, Box::new(lhs), Box::new(rhs));
        }
    }

    fn multiplicative_expression(&mut self) -> Result<Expression, ParseError> {
        const TEXTS: [&str; 3] = ["*", "/", "%"];
        const OPS: [BinaryOp; 3] = [BinaryOp::Mul, BinaryOp::Div, BinaryOp::Rem];

        let mut lhs = self.unary_expression()?;
        while let Some(index) = self.parser.peek_read_any_text(&TEXTS)? {
            let rhs = self.unary_expression()?;
            lhs = Expression::Binary(OPS[index], Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    fn unary_expression(&mut self) -> Result<Expression, ParseError> {
        if self.parser.peek_read_text("-")? {
            let inner = self.unary_expression()?;
            return Ok(Expression::Unary(UnaryOp::Neg, Box::new(inner)));
        }
        if self.parser.peek_read_text("!")? {
            let inner = self.unary_expression()?;
            return Ok(Expression::Unary(UnaryOp::Not, Box::new(inner)));
        }
        self.primary_expression()
    }

    fn primary_expression(&mut self) -> Result<Expression, ParseError> {
        if self.parser.peek_read_text("(")? {
            let inner = self.or_expression()?;
            self.parser.read_text(")")?;
            return Ok(inner);
        }

        if let Some(text) = self.parser.peek_read_type(ExprToken::IntLiteral)? {
            let n: i64 = text
                .parse()
                .map_err(|_| ParseError::UnexpectedToken {
                    expected: "an integer literal".to_string(),
                    found: format!("'{text}'"),
                })?;
            return Ok(Expression::Constant(Value::Int(n)));
        }

        if let Some(text) = self.parser.peek_read_type(ExprToken::FloatLiteral)? {
            let x: f64 = text
                .parse()
                .map_err(|_| ParseError::UnexpectedToken {
                    expected: "a real literal".to_string(),
                    found: format!("'{text}'"),
                })?;
            return Ok(Expression::Constant(Value::Float(x)));
        }

        if self.parser.peek_type(ExprToken::StringLiteral)?.is_some() {
            let token = self.parser.read()?;
            let raw = token.captured.first().cloned().flatten().unwrap_or_default();
            return Ok(Expression::Constant(Value::Str(unescape(&raw))));
        }

        if let Some(name) = self.parser.peek_read_type(ExprToken::Ident)? {
            return match name.as_str() {
                "true" => Ok(Expression::TRUE),
                "false" => Ok(Expression::FALSE),
                _ if (self.is_valid_variable_name)(&name) => Ok(Expression::Variable(name)),
                _ => Err(ParseError::InvalidVariableName { name }),
            };
        }

        Err(self.parser.expectation("a literal, a variable, or '('"))
    }
}

impl<T: crate::TokenType, P: TokenProducer<T>> Parser<T, P> {
    // Expectation error against the current lookahead, for use by layers
    // built on the core combinators.
    pub(crate) fn expectation(&mut self, expected: &str) -> ParseError {
        match self.peek() {
            Err(e) => e,
            Ok(Some(t)) => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("'{}' ({:?})", t.text, t.token_type),
            },
            Ok(None) => ParseError::UnexpectedEndOfInput { expected: expected.to_string() },
        }
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
