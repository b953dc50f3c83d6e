// a compiler front end for a mini-C language: lexing, LL(1) parsing,
// lowering with block-scoped symbol resolution, and three-address code
// generation.

pub mod front_end;
pub mod middle_end;

use derive_more::{Display, From};

use front_end::{lower, parse, Cst, LowerError, ParseError, Program};
use middle_end::{generate, Instruction};

// SECTION: driver

/// Everything the pipeline produces for one source buffer.
#[derive(Clone, Debug)]
pub struct Compilation {
    pub cst: Cst,
    pub ast: Program,
    pub tac: Vec<Instruction>,
}

#[derive(Clone, Debug, Display, Eq, From, PartialEq)]
pub enum CompileError {
    #[display(fmt = "{}", _0)]
    Parse(ParseError),
    #[display(fmt = "{}", _0)]
    Lower(LowerError),
}

impl std::error::Error for CompileError {}

/// Runs the full pipeline on a source buffer.
pub fn compile(code: &str) -> Result<Compilation, CompileError> {
    let cst = parse(code)?;
    let ast = lower(&cst, code)?;
    let tac = generate(&ast);

    Ok(Compilation { cst, ast, tac })
}
