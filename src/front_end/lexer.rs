// lexer for the mini-C front-end syntax.

use std::ops::Range;

use derive_more::Display;
use logos::Logos;
use serde::Serialize;

/// The basic-type keywords, defined once; the lexer folds all of them into
/// `TokenKind::Basic` and the lowering stage maps lexemes back through this
/// set.
pub const BASIC_TYPES: [&str; 4] = ["int", "float", "char", "void"];

/// The structural keywords, defined once.
pub const KEYWORDS: [&str; 7] = ["if", "else", "while", "do", "break", "return", "main"];

// tokenizes the given string; invalid lexemes are represented with Error
// tokens in the returned vector. whitespace and `//` comments are scanned
// but never forwarded.
pub fn lex(code: &str) -> Vec<Token> {
    TokenKind::lexer(code)
        .spanned()
        .map(|(kind, span)| Token {
            kind: kind.unwrap_or(TokenKind::Error),
            span,
        })
        .collect()
}

// SECTION: Tokens

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Range<usize>,
}

impl Token {
    // the lexeme is a view into the source buffer the token was scanned from.
    pub fn lexeme<'a>(&self, code: &'a str) -> &'a str {
        &code[self.span.clone()]
    }
}

/// The one canonical token-kind enumeration for the whole pipeline.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Logos, Serialize)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum TokenKind {
    // represents invalid lexemes, i.e., unrecognized characters.
    #[display(fmt = "invalid")]
    Error,

    // one kind for all basic-type keywords; the lexeme tells them apart.
    #[token("int")]
    #[token("float")]
    #[token("char")]
    #[token("void")]
    #[display(fmt = "basic type")]
    Basic,

    #[token("main")]
    #[display(fmt = "main")]
    Main,

    #[token("if")]
    #[display(fmt = "if")]
    If,

    #[token("else")]
    #[display(fmt = "else")]
    Else,

    #[token("while")]
    #[display(fmt = "while")]
    While,

    #[token("do")]
    #[display(fmt = "do")]
    Do,

    #[token("break")]
    #[display(fmt = "break")]
    Break,

    #[token("return")]
    #[display(fmt = "return")]
    Return,

    #[regex("[a-zA-Z][a-zA-Z0-9]*")]
    #[display(fmt = "id")]
    Id,

    #[regex("[0-9]+")]
    #[display(fmt = "integer")]
    Int,

    #[regex(r"[0-9]+\.[0-9]*")]
    #[regex(r"\.[0-9]+")]
    #[display(fmt = "real")]
    Real,

    #[token("(")]
    #[display(fmt = "(")]
    OpenParen,

    #[token(")")]
    #[display(fmt = ")")]
    CloseParen,

    #[token("[")]
    #[display(fmt = "[")]
    OpenBracket,

    #[token("]")]
    #[display(fmt = "]")]
    CloseBracket,

    #[token("{")]
    #[display(fmt = "{{")]
    OpenBrace,

    #[token("}")]
    #[display(fmt = "}}")]
    CloseBrace,

    #[token(";")]
    #[display(fmt = ";")]
    Semicolon,

    #[token(",")]
    #[display(fmt = ",")]
    Comma,

    #[token("+")]
    #[display(fmt = "+")]
    Plus,

    #[token("-")]
    #[display(fmt = "-")]
    Minus,

    #[token("*")]
    #[display(fmt = "*")]
    Star,

    #[token("/")]
    #[display(fmt = "/")]
    Slash,

    #[token("%")]
    #[display(fmt = "%")]
    Percent,

    #[token("=")]
    #[display(fmt = "=")]
    Assign,

    #[token("==")]
    #[display(fmt = "==")]
    Equal,

    #[token("!=")]
    #[display(fmt = "!=")]
    NotEq,

    #[token("<")]
    #[display(fmt = "<")]
    Lt,

    #[token("<=")]
    #[display(fmt = "<=")]
    Lte,

    #[token(">")]
    #[display(fmt = ">")]
    Gt,

    #[token(">=")]
    #[display(fmt = ">=")]
    Gte,

    #[token("&&")]
    #[display(fmt = "&&")]
    And,

    #[token("||")]
    #[display(fmt = "||")]
    Or,

    #[token("!")]
    #[display(fmt = "!")]
    Bang,

    #[token("&")]
    #[display(fmt = "&")]
    BitAnd,

    #[token("|")]
    #[display(fmt = "|")]
    BitOr,
}
