//! Scanner grammar for expression syntax.
//!
//! One stateless grammar shared by every expression parse, built once on
//! first use. Rule order carries the disambiguation: float literals are
//! registered before integer literals so `1.5` is not scanned as `1` `.`
//! `5`, and two-character operators before one-character ones so `<=` is
//! not scanned as `<` `=`.

use crate::{Grammar, Stateless};
use once_cell::sync::Lazy;

/// Token classification for expression syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprToken {
    Space,
    FloatLiteral,
    IntLiteral,
    /// Quoted string; capture group 1 is the raw content between the
    /// quotes, escapes undecoded.
    StringLiteral,
    Ident,
    Operator,
    LParen,
    RParen,
}

pub(crate) static EXPRESSION_GRAMMAR: Lazy<Grammar<ExprToken, Stateless>> = Lazy::new(|| {
    let mut g = Grammar::new();
    let mut rule = |pattern: &str, token_type: ExprToken| {
        g.add_rule(pattern, token_type).expect("built-in expression grammar pattern");
    };

    rule(r"\s+", ExprToken::Space);
    rule(r"\d+\.\d+(?:[eE][-+]?\d+)?|\d+[eE][-+]?\d+|\.\d+(?:[eE][-+]?\d+)?", ExprToken::FloatLiteral);
    rule(r"\d+", ExprToken::IntLiteral);
    rule(r#""((?:[^"\\]|\\.)*)""#, ExprToken::StringLiteral);
    rule(r"'((?:[^'\\]|\\.)*)'", ExprToken::StringLiteral);
    rule(r"[A-Za-z_][A-Za-z0-9_]*", ExprToken::Ident);
    rule(r"==|!=|<=|>=|&&|\|\|", ExprToken::Operator);
    rule(r"[-+*/%!<>]", ExprToken::Operator);
    rule(r"\(", ExprToken::LParen);
    rule(r"\)", ExprToken::RParen);
    g
});

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scanner;

    fn scan(input: &str) -> Vec<(ExprToken, String)> {
        Scanner::new(&EXPRESSION_GRAMMAR, input)
            .tokens()
            .map(|r| r.map(|t| (t.token_type, t.text)))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn literals_and_operators() {
        let tokens = scan("1+2.5");
        assert_eq!(
            tokens,
            vec![
                (ExprToken::IntLiteral, "1".to_string()),
                (ExprToken::Operator, "+".to_string()),
                (ExprToken::FloatLiteral, "2.5".to_string()),
            ]
        );
    }

    #[test]
    fn two_char_operators_scan_as_one_token() {
        let tokens = scan("a<=b");
        assert_eq!(
            tokens,
            vec![
                (ExprToken::Ident, "a".to_string()),
                (ExprToken::Operator, "<=".to_string()),
                (ExprToken::Ident, "b".to_string()),
            ]
        );
    }

    #[test]
    fn string_literal_captures_the_content() {
        let mut scanner = Scanner::new(&EXPRESSION_GRAMMAR, r#""a\"b""#);
        let token = scanner.produce().unwrap().unwrap();
        assert_eq!(token.token_type, ExprToken::StringLiteral);
        assert_eq!(token.captured, vec![Some(r#"a\"b"#.to_string())]);
    }

    #[test]
    fn single_quoted_strings_are_accepted() {
        let mut scanner = Scanner::new(&EXPRESSION_GRAMMAR, "'hi'");
        let token = scanner.produce().unwrap().unwrap();
        assert_eq!(token.token_type, ExprToken::StringLiteral);
        assert_eq!(token.captured, vec![Some("hi".to_string())]);
    }

    #[test]
    fn float_without_leading_digit() {
        let tokens = scan(".5");
        assert_eq!(tokens, vec![(ExprToken::FloatLiteral, ".5".to_string())]);
    }

    #[test]
    fn unknown_character_is_a_scan_error() {
        let mut scanner = Scanner::new(&EXPRESSION_GRAMMAR, "1 @ 2");
        scanner.produce().unwrap();
        scanner.produce().unwrap();
        let err = scanner.produce().unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.character, '@');
    }
}
