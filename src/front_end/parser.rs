// ll(1) parser for the mini-C grammar, producing a concrete syntax tree with
// one node per matched grammar symbol.

use derive_more::Display;

use super::cst::{Cst, GrammarSymbol};
use super::lexer::{lex, Token, TokenKind};
use super::line_col;
use GrammarSymbol::*;
use TokenKind as Tok;

// SECTION: interface

pub fn parse(code: &str) -> Result<Cst, ParseError> {
    let mut parser = Parser::new(code)?;
    let root = program_r(&mut parser)?;

    if !parser.end() {
        return parser.error_next("expected end of program");
    }

    Ok(root)
}

// A parse error with explanatory message.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct ParseError(pub String);
impl std::error::Error for ParseError {}

// SECTION: parser functionality

#[derive(Clone, Debug)]
struct Parser<'a> {
    code: &'a str,      // the source code being parsed
    tokens: Vec<Token>, // the token stream
    pos: usize,         // the position in the token stream
}

// utility functions for traversing the token stream and creating error
// messages.
impl<'a> Parser<'a> {
    // always use this to create new Parsers.
    fn new(code: &'a str) -> Result<Self, ParseError> {
        let tokens = lex(code);
        if tokens.is_empty() {
            Err(ParseError("empty token stream".to_string()))
        } else {
            Ok(Parser {
                code,
                tokens,
                pos: 0,
            })
        }
    }

    // if the next token has the given kind advances the iterator and returns
    // true, otherwise returns false. lexically invalid tokens never match, so
    // they surface as a syntax error only once the parser needs something
    // else at that position.
    fn eat(&mut self, kind: TokenKind) -> bool {
        match self.peek() {
            Some(k) if k == kind => {
                self.next();
                true
            }
            _ => false,
        }
    }

    // returns an Ok or Err result depending on whether the next token has the
    // given kind, advancing the iterator on an Ok result.
    fn expect(&mut self, kind: TokenKind) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            self.error_next(&format!("expected `{kind}`"))
        }
    }

    // `expect` that also builds the CST terminal for the consumed token.
    fn expect_terminal(&mut self, kind: TokenKind) -> Result<Cst, ParseError> {
        self.expect(kind)?;
        Ok(self.terminal_prev())
    }

    // advances the iterator and returns the next token in the stream, or None
    // if there are no more tokens.
    fn next(&mut self) -> Option<TokenKind> {
        if !self.end() {
            self.pos += 1;
            Some(self.tokens[self.pos - 1].kind)
        } else {
            None
        }
    }

    // returns the next token (if it exists) without advancing the iterator.
    fn peek(&self) -> Option<TokenKind> {
        if !self.end() {
            Some(self.tokens[self.pos].kind)
        } else {
            None
        }
    }

    // returns whether the next token has the given kind, without advancing
    // the iterator.
    fn next_is(&self, kind: TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    // returns whether the next token is one of the given kinds.
    fn next_is_one_of(&self, kinds: &[TokenKind]) -> bool {
        matches!(self.peek(), Some(k) if kinds.contains(&k))
    }

    // returns whether we're at the end of the token stream.
    fn end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    // builds a CST terminal from the token immediately prior to the current
    // one, i.e., the token we just advanced past.
    fn terminal_prev(&self) -> Cst {
        let token = &self.tokens[self.pos - 1];
        Cst::Terminal {
            kind: token.kind,
            lexeme: token.lexeme(self.code).to_string(),
            span: token.span.clone(),
        }
    }

    // returns the lexeme of the token we just advanced past.
    fn slice_prev(&self) -> &str {
        self.tokens[self.pos - 1].lexeme(self.code)
    }

    // returns a parse error for the token we just advanced past.
    fn error_prev<T>(&self, msg: &str) -> Result<T, ParseError> {
        self.error(self.pos - 1, msg)
    }

    // returns a parse error knowing that the next token to be inspected
    // causes an error (based on a call to peek(), next_is(), etc).
    fn error_next<T>(&self, msg: &str) -> Result<T, ParseError> {
        // handle the case where we're at the end of the token stream.
        if self.pos >= self.tokens.len() {
            Err(ParseError(format!(
                "parse error: unexpected end of input ({msg})\n"
            )))
        } else {
            self.error(self.pos, msg)
        }
    }

    // constructs a parse error given the position of the error-causing token
    // in the token stream.
    fn error<T>(&self, pos: usize, msg: &str) -> Result<T, ParseError> {
        let span = &self.tokens[pos].span;
        let (row, col) = line_col(self.code, span.start);
        let line = self.code.lines().nth(row).unwrap_or("");

        Err(ParseError(format!(
            "parse error in line {row}, column {col}\n{line}\n{}^\n{msg}\n",
            " ".repeat(col)
        )))
    }
}

// SECTION: parsing functions

// the function names come from the production rules of the LL(1) grammar.

// tokens that can start a statement.
const STMT_FIRST: [TokenKind; 7] = [
    Tok::If,
    Tok::Id,
    Tok::While,
    Tok::Do,
    Tok::Break,
    Tok::Return,
    Tok::OpenBrace,
];

// Program -> Basic main ( ) Block
fn program_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = vec![
        parser.expect_terminal(Tok::Basic)?,
        parser.expect_terminal(Tok::Main)?,
        parser.expect_terminal(Tok::OpenParen)?,
        parser.expect_terminal(Tok::CloseParen)?,
        block_r(parser)?,
    ];

    Ok(Cst::non_terminal(Program, children))
}

// Block -> { Decls? Stmts }
fn block_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let mut children = vec![parser.expect_terminal(Tok::OpenBrace)?];

    if parser.next_is(Tok::Basic) {
        children.push(decls_r(parser)?);
    }
    children.push(stmts_r(parser)?);
    children.push(parser.expect_terminal(Tok::CloseBrace)?);

    Ok(Cst::non_terminal(Block, children))
}

// Decls -> Decl Decls'
fn decls_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = vec![decl_r(parser)?, decls_prime_r(parser)?];
    Ok(Cst::non_terminal(Decls, children))
}

// Decls' -> Decl Decls' | epsilon
fn decls_prime_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = if parser.next_is(Tok::Basic) {
        vec![decl_r(parser)?, decls_prime_r(parser)?]
    } else {
        vec![Cst::Epsilon]
    };

    Ok(Cst::non_terminal(Decls, children))
}

// Decl -> Type id ;
fn decl_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = vec![
        type_r(parser)?,
        parser.expect_terminal(Tok::Id)?,
        parser.expect_terminal(Tok::Semicolon)?,
    ];

    Ok(Cst::non_terminal(Decl, children))
}

// Type -> Basic Type'
fn type_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = vec![parser.expect_terminal(Tok::Basic)?, type_prime_r(parser)?];
    Ok(Cst::non_terminal(Type, children))
}

// Type' -> [ integer ] Type' | epsilon   (array suffixes via right recursion)
fn type_prime_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = if parser.next_is(Tok::OpenBracket) {
        let open = parser.expect_terminal(Tok::OpenBracket)?;
        let dim = parser.expect_terminal(Tok::Int)?;
        if parser.slice_prev().parse::<u64>().is_err() {
            return parser.error_prev("array dimension can't be parsed as a u64");
        }
        vec![
            open,
            dim,
            parser.expect_terminal(Tok::CloseBracket)?,
            type_prime_r(parser)?,
        ]
    } else {
        vec![Cst::Epsilon]
    };

    Ok(Cst::non_terminal(Type, children))
}

// Stmts -> Stmt Stmts'
fn stmts_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    if !parser.next_is_one_of(&STMT_FIRST) {
        return parser.error_next("expected a statement");
    }

    let children = vec![stmt_r(parser)?, stmts_prime_r(parser)?];
    Ok(Cst::non_terminal(Stmts, children))
}

// Stmts' -> Stmt Stmts' | epsilon
fn stmts_prime_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = if parser.next_is_one_of(&STMT_FIRST) {
        vec![stmt_r(parser)?, stmts_prime_r(parser)?]
    } else {
        vec![Cst::Epsilon]
    };

    Ok(Cst::non_terminal(Stmts, children))
}

// statement. the node's first child is always the leading terminal (or the
// Loc / Block node), which is what lowering dispatches on.
fn stmt_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = match parser.peek() {
        Some(Tok::If) => vec![
            parser.expect_terminal(Tok::If)?,
            parser.expect_terminal(Tok::OpenParen)?,
            bool_r(parser)?,
            parser.expect_terminal(Tok::CloseParen)?,
            stmt_r(parser)?,
            stmt_prime_r(parser)?,
        ],
        Some(Tok::Id) => vec![
            loc_r(parser)?,
            parser.expect_terminal(Tok::Assign)?,
            bool_r(parser)?,
            parser.expect_terminal(Tok::Semicolon)?,
        ],
        Some(Tok::While) => vec![
            parser.expect_terminal(Tok::While)?,
            parser.expect_terminal(Tok::OpenParen)?,
            bool_r(parser)?,
            parser.expect_terminal(Tok::CloseParen)?,
            stmt_r(parser)?,
        ],
        // do-while requires the trailing semicolon; if and while do not.
        Some(Tok::Do) => vec![
            parser.expect_terminal(Tok::Do)?,
            stmt_r(parser)?,
            parser.expect_terminal(Tok::While)?,
            parser.expect_terminal(Tok::OpenParen)?,
            bool_r(parser)?,
            parser.expect_terminal(Tok::CloseParen)?,
            parser.expect_terminal(Tok::Semicolon)?,
        ],
        Some(Tok::Return) => vec![
            parser.expect_terminal(Tok::Return)?,
            bool_r(parser)?,
            parser.expect_terminal(Tok::Semicolon)?,
        ],
        Some(Tok::Break) => vec![
            parser.expect_terminal(Tok::Break)?,
            parser.expect_terminal(Tok::Semicolon)?,
        ],
        Some(Tok::OpenBrace) => vec![block_r(parser)?],
        _ => {
            return parser
                .error_next("expected if, while, do, break, return, an identifier, or `{`")
        }
    };

    Ok(Cst::non_terminal(Stmt, children))
}

// Stmt' -> else Stmt | epsilon. the optional else attaches directly inside
// the enclosing Stmt production, so a dangling else binds to the nearest
// unmatched if.
fn stmt_prime_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let children = if parser.next_is(Tok::Else) {
        vec![parser.expect_terminal(Tok::Else)?, stmt_r(parser)?]
    } else {
        vec![Cst::Epsilon]
    };

    Ok(Cst::non_terminal(Stmt, children))
}

// Loc -> id Loc''
fn loc_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let mut children = vec![parser.expect_terminal(Tok::Id)?];

    if parser.next_is(Tok::OpenBracket) {
        children.push(loc_prime_r(parser)?);
    }

    Ok(Cst::non_terminal(Loc, children))
}

// Loc'' -> [ Bool ] Loc'' | epsilon. no epsilon node is created for an empty
// subscript chain; the chain is simply absent.
fn loc_prime_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    let mut children = vec![
        parser.expect_terminal(Tok::OpenBracket)?,
        bool_r(parser)?,
        parser.expect_terminal(Tok::CloseBracket)?,
    ];

    if parser.next_is(Tok::OpenBracket) {
        children.push(loc_prime_r(parser)?);
    }

    Ok(Cst::non_terminal(Loc, children))
}

// parses `child (op child)*` for one precedence level. the level wraps the
// child only if an operator at the level is present, otherwise the child
// passes through unchanged; CST depth therefore varies by expression shape.
fn binary_level_r(
    parser: &mut Parser,
    symbol: GrammarSymbol,
    ops: &[TokenKind],
    child_r: fn(&mut Parser) -> Result<Cst, ParseError>,
) -> Result<Cst, ParseError> {
    let first = child_r(parser)?;

    if !parser.next_is_one_of(ops) {
        return Ok(first);
    }

    let mut children = vec![first];
    while parser.next_is_one_of(ops) {
        parser.next();
        children.push(parser.terminal_prev());
        children.push(child_r(parser)?);
    }

    Ok(Cst::non_terminal(symbol, children))
}

// Bool -> Join (|| Join)*
fn bool_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Bool, &[Tok::Or], join_r)
}

// Join -> Equality (&& Equality)*
fn join_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Join, &[Tok::And], equality_r)
}

// Equality -> Rel ((== | !=) Rel)*
fn equality_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Equality, &[Tok::Equal, Tok::NotEq], rel_r)
}

// Rel -> Expr ((< | <= | > | >=) Expr)*
fn rel_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Rel, &[Tok::Lt, Tok::Lte, Tok::Gt, Tok::Gte], expr_r)
}

// Expr -> Term ((+ | -) Term)*
fn expr_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Expr, &[Tok::Plus, Tok::Minus], term_r)
}

// Term -> Unary ((* | / | %) Unary)*
fn term_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    binary_level_r(parser, Term, &[Tok::Star, Tok::Slash, Tok::Percent], unary_r)
}

// Unary -> ! Unary | - Unary | Factor
fn unary_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    match parser.peek() {
        Some(Tok::Bang) | Some(Tok::Minus) => {
            parser.next();
            let children = vec![parser.terminal_prev(), unary_r(parser)?];
            Ok(Cst::non_terminal(Unary, children))
        }
        _ => factor_r(parser),
    }
}

// Factor -> ( Bool ) | integer | real | Loc
fn factor_r(parser: &mut Parser) -> Result<Cst, ParseError> {
    match parser.peek() {
        Some(Tok::OpenParen) => {
            let children = vec![
                parser.expect_terminal(Tok::OpenParen)?,
                bool_r(parser)?,
                parser.expect_terminal(Tok::CloseParen)?,
            ];
            Ok(Cst::non_terminal(Factor, children))
        }
        Some(Tok::Int) => {
            let term = parser.expect_terminal(Tok::Int)?;
            if parser.slice_prev().parse::<i64>().is_err() {
                return parser.error_prev("integer literal can't be parsed as an i64");
            }
            Ok(term)
        }
        Some(Tok::Real) => parser.expect_terminal(Tok::Real),
        Some(Tok::Id) => loc_r(parser),
        _ => parser.error_next("expected `(`, a literal, or an identifier"),
    }
}
