//! Property-based tests for the scanner and the expression layer.

use proptest::prelude::*;
use scansion::expr::{Value, expand, parse_expression};
use scansion::{Grammar, Scanner, State};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Tok {
    Word,
    Number,
    Space,
    Open,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum St {
    Angle,
}

impl State for St {
    const VALUES: &'static [Self] = &[St::Angle];
}

// Covers every character the generators below can produce.
fn covering_grammar() -> Grammar<Tok, St> {
    let mut g = Grammar::new();
    g.add_rule_in_any_state(r"[a-z]+", Tok::Word).unwrap();
    g.add_rule_in_any_state(r"[0-9]+", Tok::Number).unwrap();
    g.add_rule_in_any_state(r" +", Tok::Space).unwrap();
    g.add_rule_in_any_state(r"<", Tok::Open).unwrap().push(St::Angle);
    g.add_rule_in(St::Angle, r">", Tok::Close).unwrap().pop();
    g
}

// Strings whose angle brackets nest and balance.
fn balanced_text() -> impl Strategy<Value = String> {
    "[a-z0-9 ]{0,8}".prop_recursive(3, 24, 3, |inner| {
        (inner.clone(), "[a-z0-9 ]{0,4}", inner)
            .prop_map(|(a, mid, b)| format!("{a}<{mid}>{b}"))
    })
}

fn any_name(_: &str) -> bool {
    true
}

proptest! {
    // Concatenating every token's text reproduces the input exactly.
    #[test]
    fn round_trip_reassembles_input(input in "[a-z0-9 ]{0,40}") {
        let g = covering_grammar();
        let text: String = Scanner::new(&g, &input)
            .tokens()
            .map(|r| r.unwrap().text)
            .collect();
        prop_assert_eq!(text, input);
    }

    // Matched push/pop pairs leave the scanner back in the initial state
    // with an empty state stack.
    #[test]
    fn balanced_input_balances_the_stack(input in balanced_text()) {
        let g = covering_grammar();
        let mut scanner = Scanner::new(&g, &input);
        while scanner.produce().unwrap().is_some() {}
        prop_assert_eq!(scanner.state_stack_depth(), 0);
        prop_assert!(scanner.offset() == input.len());

        let text: String = Scanner::new(&g, &input)
            .tokens()
            .map(|r| r.unwrap().text)
            .collect();
        prop_assert_eq!(text, input);
    }

    // Multiplication binds tighter than addition for arbitrary operands.
    #[test]
    fn arithmetic_precedence(a in -1000i64..1000, b in -1000i64..1000, c in -1000i64..1000) {
        let source = format!("{a} + {b} * {c}");
        let expr = parse_expression(&source, &any_name).unwrap();
        prop_assert_eq!(expr.evaluate(&HashMap::new()).unwrap(), Value::Int(a + b * c));
    }

    // Text without delimiters expands to itself.
    #[test]
    fn expansion_of_plain_text_is_identity(input in "[a-z0-9 .,!?]{0,40}") {
        let expr = expand(&input, &any_name).unwrap();
        let rendered = expr.evaluate(&HashMap::new()).unwrap();
        prop_assert_eq!(rendered, Value::Str(input));
    }
}
