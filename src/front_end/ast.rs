// the abstract syntax tree: the semantically compacted form consumed by TAC
// generation. grammar wrapper nodes and epsilon derivations are already gone;
// every Var carries the block id of the declaration it resolved to.

use std::fmt::Write;

use derive_more::Display;
use serde::Serialize;

use super::symbol_table::BlockId;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum BasicType {
    #[display(fmt = "int")]
    Int,
    #[display(fmt = "float")]
    Float,
    #[display(fmt = "char")]
    Char,
    #[display(fmt = "void")]
    Void,
}

impl BasicType {
    // maps a basic-type lexeme back through the canonical set; the lexer only
    // emits `Basic` tokens for members of `lexer::BASIC_TYPES`.
    pub fn from_lexeme(lexeme: &str) -> Option<BasicType> {
        match lexeme {
            "int" => Some(BasicType::Int),
            "float" => Some(BasicType::Float),
            "char" => Some(BasicType::Char),
            "void" => Some(BasicType::Void),
            _ => None,
        }
    }
}

/// A declared type: a basic type plus zero or more array dimensions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Type {
    pub base: BasicType,
    pub dims: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Program {
    pub ret: BasicType,
    pub body: Block,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Block {
    pub decls: Vec<Declaration>,
    pub stmts: Vec<Stmt>,
}

/// A lowered declaration; the symbol table holds the matching record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Declaration {
    pub name: String,
    pub typ: Type,
    pub block: BlockId,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Stmt {
    If {
        guard: Exp,
        tt: Box<Stmt>,
        ff: Option<Box<Stmt>>,
    },
    While {
        guard: Exp,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        guard: Exp,
    },
    Assign {
        lhs: Var,
        rhs: Exp,
    },
    Return(Exp),
    Break,
    Block(Block),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Exp {
    Int(i64),
    Real(f64),
    Var(Var),
    Unary {
        op: UnaryOp,
        exp: Box<Exp>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Exp>,
        rhs: Box<Exp>,
    },
}

/// A resolved variable reference; `block` is the block id of the declaration
/// the reference resolved to, `indices` the lowered subscript expressions.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Var {
    pub name: String,
    pub block: BlockId,
    pub indices: Vec<Exp>,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum BinaryOp {
    #[display(fmt = "+")]
    Add,
    #[display(fmt = "-")]
    Sub,
    #[display(fmt = "*")]
    Mul,
    #[display(fmt = "/")]
    Div,
    #[display(fmt = "%")]
    Mod,
    #[display(fmt = "==")]
    Eq,
    #[display(fmt = "!=")]
    Ne,
    #[display(fmt = "<")]
    Lt,
    #[display(fmt = "<=")]
    Le,
    #[display(fmt = ">")]
    Gt,
    #[display(fmt = ">=")]
    Ge,
    #[display(fmt = "&&")]
    And,
    #[display(fmt = "||")]
    Or,
}

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum UnaryOp {
    #[display(fmt = "-")]
    Neg,
    #[display(fmt = "!")]
    Not,
}

// SECTION: tree rendering

impl Program {
    /// Renders the AST one node per line, indented by depth.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Program ({} main)", self.ret);
        self.body.render_into(&mut out, 1);
        out
    }
}

impl Block {
    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}Block");
        for decl in &self.decls {
            let _ = writeln!(
                out,
                "{indent}  Declaration ({} {})",
                decl.typ.base, decl.name
            );
        }
        for stmt in &self.stmts {
            stmt.render_into(out, depth + 1);
        }
    }
}

impl Stmt {
    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Stmt::If { guard, tt, ff } => {
                let _ = writeln!(out, "{indent}If");
                guard.render_into(out, depth + 1);
                tt.render_into(out, depth + 1);
                if let Some(ff) = ff {
                    let _ = writeln!(out, "{indent}Else");
                    ff.render_into(out, depth + 1);
                }
            }
            Stmt::While { guard, body } => {
                let _ = writeln!(out, "{indent}While");
                guard.render_into(out, depth + 1);
                body.render_into(out, depth + 1);
            }
            Stmt::DoWhile { body, guard } => {
                let _ = writeln!(out, "{indent}DoWhile");
                body.render_into(out, depth + 1);
                guard.render_into(out, depth + 1);
            }
            Stmt::Assign { lhs, rhs } => {
                let _ = writeln!(out, "{indent}Assignment");
                lhs.render_into(out, depth + 1);
                rhs.render_into(out, depth + 1);
            }
            Stmt::Return(exp) => {
                let _ = writeln!(out, "{indent}Return");
                exp.render_into(out, depth + 1);
            }
            Stmt::Break => {
                let _ = writeln!(out, "{indent}Break");
            }
            Stmt::Block(block) => block.render_into(out, depth),
        }
    }
}

impl Exp {
    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        match self {
            Exp::Int(n) => {
                let _ = writeln!(out, "{indent}Literal ({n})");
            }
            Exp::Real(r) => {
                let _ = writeln!(out, "{indent}Literal ({r})");
            }
            Exp::Var(var) => var.render_into(out, depth),
            Exp::Unary { op, exp } => {
                let _ = writeln!(out, "{indent}Unary ({op})");
                exp.render_into(out, depth + 1);
            }
            Exp::Binary { op, lhs, rhs } => {
                let _ = writeln!(out, "{indent}Binary ({op})");
                lhs.render_into(out, depth + 1);
                rhs.render_into(out, depth + 1);
            }
        }
    }
}

impl Var {
    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = writeln!(out, "{indent}Variable ({})", self.name);
        for index in &self.indices {
            index.render_into(out, depth + 1);
        }
    }
}
