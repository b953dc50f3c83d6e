// the compiler middle end: three-address code generation from the AST.

pub mod tac;


pub use tac::{generate, Instruction, Label, Operand};
