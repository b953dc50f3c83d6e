// the compiler front end: lexing, LL(1) parsing to a concrete syntax tree,
// and lowering to an abstract syntax tree with block-scoped symbol
// resolution.

pub mod ast;
pub mod cst;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod symbol_table;


pub use ast::Program;
pub use cst::Cst;
pub use lexer::{lex, Token, TokenKind};
pub use lower::{lower, LowerError};
pub use parser::{parse, ParseError};
pub use symbol_table::SymbolTable;

// the zero-based line and column of a byte offset in the source buffer.
pub(crate) fn line_col(code: &str, offset: usize) -> (usize, usize) {
    let prefix = &code[..offset];
    let line = prefix.matches('\n').count();
    let col = prefix.chars().rev().take_while(|&c| c != '\n').count();
    (line, col)
}
