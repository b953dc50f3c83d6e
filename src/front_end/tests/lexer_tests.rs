// lexer tests.

use crate::front_end::lexer::{lex, TokenKind, BASIC_TYPES, KEYWORDS};
use TokenKind as Tok;

fn kinds(code: &str) -> Vec<TokenKind> {
    lex(code).iter().map(|token| token.kind).collect()
}

#[test]
fn empty_input() {
    assert!(lex("").is_empty());
}

#[test]
fn basic_types_fold_into_one_kind() {
    for lexeme in BASIC_TYPES {
        let tokens = lex(lexeme);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, Tok::Basic);
        assert_eq!(tokens[0].lexeme(lexeme), lexeme);
    }
}

#[test]
fn keywords_never_scan_as_identifiers() {
    for lexeme in KEYWORDS {
        let tokens = lex(lexeme);
        assert_eq!(tokens.len(), 1);
        assert_ne!(tokens[0].kind, Tok::Id, "`{lexeme}` scanned as an id");
    }
}

#[test]
fn identifiers_and_literals() {
    assert_eq!(
        kinds("x1 counter 42 3.14 .5 7."),
        vec![Tok::Id, Tok::Id, Tok::Int, Tok::Real, Tok::Real, Tok::Real]
    );
}

#[test]
fn longest_match_on_operators() {
    assert_eq!(
        kinds("<= < >= > == = != ! && & || |"),
        vec![
            Tok::Lte,
            Tok::Lt,
            Tok::Gte,
            Tok::Gt,
            Tok::Equal,
            Tok::Assign,
            Tok::NotEq,
            Tok::Bang,
            Tok::And,
            Tok::BitAnd,
            Tok::Or,
            Tok::BitOr,
        ]
    );
}

#[test]
fn comments_and_whitespace_are_skipped() {
    let code = "x // a comment with operators + - { }\n\t y";
    assert_eq!(kinds(code), vec![Tok::Id, Tok::Id]);
}

#[test]
fn invalid_characters_become_error_tokens() {
    let code = "x # y";
    let tokens = lex(code);

    assert_eq!(
        tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
        vec![Tok::Id, Tok::Error, Tok::Id]
    );
    assert_eq!(tokens[1].lexeme(code), "#");
}

#[test]
fn spans_index_the_source() {
    let code = "int x;\nx = 41;";
    for token in lex(code) {
        assert!(!token.lexeme(code).is_empty());
        assert!(token.span.end <= code.len());
    }
    assert_eq!(lex(code)[1].lexeme(code), "x");
}
