// lower the CST to an AST, resolving every identifier against the
// block-scoped symbol table. assumes the CST comes from `parse`; lowering may
// panic on a malformed tree.
//
// wrapper chains (Decls/Stmts) flatten to ordered child lists, epsilon nodes
// are pruned, pass-through expression levels disappear, and operator levels
// fold left-associatively into Binary nodes. semantic validation is limited
// to identifier resolution (Undeclared on a reference with no visible
// declaration, Redeclared on a same-block redeclaration) and `break`
// placement (BreakOutsideLoop when no loop encloses it); every other AST the
// lowering emits is valid by construction, which is what TAC generation
// relies on.

use derive_more::Display;

use super::ast::{
    BasicType, BinaryOp, Block, Declaration, Exp, Program, Stmt, Type, UnaryOp, Var,
};
use super::cst::{Cst, GrammarSymbol};
use super::lexer::{TokenKind, KEYWORDS};
use super::line_col;
use super::symbol_table::{Category, SymbolTable};

// SECTION: public interface

pub fn lower(cst: &Cst, code: &str) -> Result<Program, LowerError> {
    let mut info = Lowering::new(code);
    info.lower_program(cst)
}

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum LowerError {
    #[display(
        fmt = "undeclared identifier `{}` in line {}, column {}",
        name,
        line,
        column
    )]
    Undeclared {
        name: String,
        line: usize,
        column: usize,
    },
    #[display(
        fmt = "redeclaration of `{}` in the same block in line {}, column {}",
        name,
        line,
        column
    )]
    Redeclared {
        name: String,
        line: usize,
        column: usize,
    },
    #[display(fmt = "`break` outside of a loop in line {}, column {}", line, column)]
    BreakOutsideLoop { line: usize, column: usize },
}

impl std::error::Error for LowerError {}

// SECTION: utilities

struct Lowering<'a> {
    code: &'a str,      // the source buffer, for diagnostic positions
    table: SymbolTable, // the block-scoped declarations
    loop_depth: usize,  // number of enclosing loops; a `break` needs one
}

impl<'a> Lowering<'a> {
    fn new(code: &'a str) -> Self {
        let mut table = SymbolTable::new();

        // record the canonical keyword set once, in the outermost block.
        for keyword in KEYWORDS {
            table.insert(keyword, Category::Keyword, None, 0, 0, keyword.len());
        }

        Lowering {
            code,
            table,
            loop_depth: 0,
        }
    }
}

// the children of a non-terminal node with the given symbol.
fn children(cst: &Cst, symbol: GrammarSymbol) -> &[Cst] {
    match cst {
        Cst::NonTerminal {
            symbol: actual,
            children,
        } if *actual == symbol => children,
        _ => unreachable!("expected a {symbol} node, got {cst:?}"),
    }
}

// the kind and lexeme of a terminal node, plus its source offset.
fn terminal(cst: &Cst) -> (TokenKind, &str, usize) {
    match cst {
        Cst::Terminal { kind, lexeme, span } => (*kind, lexeme.as_str(), span.start),
        _ => unreachable!("expected a terminal, got {cst:?}"),
    }
}

// SECTION: lowering implementation

impl<'a> Lowering<'a> {
    // Program -> Basic main ( ) Block
    fn lower_program(&mut self, cst: &Cst) -> Result<Program, LowerError> {
        let kids = children(cst, GrammarSymbol::Program);

        let (_, lexeme, _) = terminal(&kids[0]);
        let ret = BasicType::from_lexeme(lexeme).unwrap();
        let body = self.lower_block(&kids[4])?;

        Ok(Program { ret, body })
    }

    // Block -> { Decls? Stmts }; enter/exit are paired around every block.
    fn lower_block(&mut self, cst: &Cst) -> Result<Block, LowerError> {
        let kids = children(cst, GrammarSymbol::Block);

        self.table.enter_block();

        let mut decls = vec![];
        let mut stmts = vec![];
        for child in kids {
            match child.symbol() {
                Some(GrammarSymbol::Decls) => self.lower_decls(child, &mut decls)?,
                Some(GrammarSymbol::Stmts) => self.lower_stmts(child, &mut stmts)?,
                // the brace terminals carry no meaning past parsing.
                _ => {}
            }
        }

        self.table.exit_block();

        Ok(Block { decls, stmts })
    }

    // flattens the right-recursive Decls chain, pruning epsilon terminators.
    fn lower_decls(&mut self, cst: &Cst, out: &mut Vec<Declaration>) -> Result<(), LowerError> {
        for child in children(cst, GrammarSymbol::Decls) {
            match child.symbol() {
                Some(GrammarSymbol::Decl) => out.push(self.lower_decl(child)?),
                Some(GrammarSymbol::Decls) => self.lower_decls(child, out)?,
                _ => debug_assert!(child.is_epsilon()),
            }
        }

        Ok(())
    }

    // Decl -> Type id ; -- also the one place declarations enter the table.
    fn lower_decl(&mut self, cst: &Cst) -> Result<Declaration, LowerError> {
        let kids = children(cst, GrammarSymbol::Decl);

        let typ = lower_type(&kids[0]);
        let (_, name, offset) = terminal(&kids[1]);
        let (line, column) = line_col(self.code, offset);

        let inserted = self.table.insert(
            name,
            Category::Variable,
            Some(typ.clone()),
            line,
            column,
            name.len(),
        );
        if !inserted {
            return Err(LowerError::Redeclared {
                name: name.to_string(),
                line,
                column,
            });
        }

        Ok(Declaration {
            name: name.to_string(),
            typ,
            block: self.table.current_block(),
        })
    }

    // flattens the right-recursive Stmts chain, pruning epsilon terminators.
    fn lower_stmts(&mut self, cst: &Cst, out: &mut Vec<Stmt>) -> Result<(), LowerError> {
        for child in children(cst, GrammarSymbol::Stmts) {
            match child.symbol() {
                Some(GrammarSymbol::Stmt) => out.push(self.lower_stmt(child)?),
                Some(GrammarSymbol::Stmts) => self.lower_stmts(child, out)?,
                _ => debug_assert!(child.is_epsilon()),
            }
        }

        Ok(())
    }

    // statement dispatch on the node's leading terminal (or Loc/Block node).
    fn lower_stmt(&mut self, cst: &Cst) -> Result<Stmt, LowerError> {
        let kids = children(cst, GrammarSymbol::Stmt);

        if let Some(symbol) = kids[0].symbol() {
            return match symbol {
                GrammarSymbol::Loc => Ok(Stmt::Assign {
                    lhs: self.lower_loc(&kids[0])?,
                    rhs: self.lower_exp(&kids[2])?,
                }),
                GrammarSymbol::Block => Ok(Stmt::Block(self.lower_block(&kids[0])?)),
                _ => unreachable!("unexpected {symbol} at the head of a statement"),
            };
        }

        let (kind, _, _) = terminal(&kids[0]);
        match kind {
            TokenKind::If => Ok(Stmt::If {
                guard: self.lower_exp(&kids[2])?,
                tt: Box::new(self.lower_stmt(&kids[4])?),
                ff: self.lower_else(&kids[5])?,
            }),
            TokenKind::While => {
                let guard = self.lower_exp(&kids[2])?;
                let body = Box::new(self.lower_loop_body(&kids[4])?);
                Ok(Stmt::While { guard, body })
            }
            TokenKind::Do => {
                let body = Box::new(self.lower_loop_body(&kids[1])?);
                let guard = self.lower_exp(&kids[4])?;
                Ok(Stmt::DoWhile { body, guard })
            }
            TokenKind::Return => Ok(Stmt::Return(self.lower_exp(&kids[1])?)),
            TokenKind::Break => {
                if self.loop_depth == 0 {
                    let (_, _, offset) = terminal(&kids[0]);
                    let (line, column) = line_col(self.code, offset);
                    return Err(LowerError::BreakOutsideLoop { line, column });
                }
                Ok(Stmt::Break)
            }
            _ => unreachable!("unexpected `{kind}` at the head of a statement"),
        }
    }

    // lowers a loop body with the enclosing-loop count bumped, so any
    // `break` inside it resolves.
    fn lower_loop_body(&mut self, cst: &Cst) -> Result<Stmt, LowerError> {
        self.loop_depth += 1;
        let body = self.lower_stmt(cst);
        self.loop_depth -= 1;
        body
    }

    // Stmt' -> else Stmt | epsilon
    fn lower_else(&mut self, cst: &Cst) -> Result<Option<Box<Stmt>>, LowerError> {
        let kids = children(cst, GrammarSymbol::Stmt);

        if kids[0].is_epsilon() {
            Ok(None)
        } else {
            Ok(Some(Box::new(self.lower_stmt(&kids[1])?)))
        }
    }

    fn lower_exp(&mut self, cst: &Cst) -> Result<Exp, LowerError> {
        match cst {
            // literal terminals were validated to parse back in the parser.
            Cst::Terminal { kind, lexeme, .. } => match kind {
                TokenKind::Int => Ok(Exp::Int(lexeme.parse().unwrap())),
                TokenKind::Real => Ok(Exp::Real(lexeme.parse().unwrap())),
                _ => unreachable!("unexpected `{kind}` terminal in an expression"),
            },
            Cst::NonTerminal { symbol, children } => match symbol {
                GrammarSymbol::Loc => Ok(Exp::Var(self.lower_loc(cst)?)),
                // Factor -> ( Bool )
                GrammarSymbol::Factor => self.lower_exp(&children[1]),
                GrammarSymbol::Unary => {
                    let (kind, _, _) = terminal(&children[0]);
                    let op = match kind {
                        TokenKind::Minus => UnaryOp::Neg,
                        TokenKind::Bang => UnaryOp::Not,
                        _ => unreachable!("unexpected unary operator `{kind}`"),
                    };
                    Ok(Exp::Unary {
                        op,
                        exp: Box::new(self.lower_exp(&children[1])?),
                    })
                }
                GrammarSymbol::Bool
                | GrammarSymbol::Join
                | GrammarSymbol::Equality
                | GrammarSymbol::Rel
                | GrammarSymbol::Expr
                | GrammarSymbol::Term => self.lower_binary_chain(children),
                _ => unreachable!("unexpected {symbol} node in an expression"),
            },
            Cst::Epsilon => unreachable!("epsilon node in an expression"),
        }
    }

    // folds [operand, op, operand, op, operand, ...] left-associatively.
    fn lower_binary_chain(&mut self, kids: &[Cst]) -> Result<Exp, LowerError> {
        let mut exp = self.lower_exp(&kids[0])?;

        for pair in kids[1..].chunks(2) {
            let (kind, _, _) = terminal(&pair[0]);
            exp = Exp::Binary {
                op: binary_op(kind),
                lhs: Box::new(exp),
                rhs: Box::new(self.lower_exp(&pair[1])?),
            };
        }

        Ok(exp)
    }

    // Loc -> id Loc''; resolves the identifier against the enclosing scopes
    // and lowers any subscript chain.
    fn lower_loc(&mut self, cst: &Cst) -> Result<Var, LowerError> {
        let kids = children(cst, GrammarSymbol::Loc);
        let (_, name, offset) = terminal(&kids[0]);

        let Some(decl) = self.table.find(name) else {
            let (line, column) = line_col(self.code, offset);
            return Err(LowerError::Undeclared {
                name: name.to_string(),
                line,
                column,
            });
        };
        let block = decl.block;

        let mut indices = vec![];
        if kids.len() > 1 {
            self.lower_subscripts(&kids[1], &mut indices)?;
        }

        Ok(Var {
            name: name.to_string(),
            block,
            indices,
        })
    }

    // Loc'' -> [ Bool ] Loc''
    fn lower_subscripts(&mut self, cst: &Cst, out: &mut Vec<Exp>) -> Result<(), LowerError> {
        let kids = children(cst, GrammarSymbol::Loc);

        out.push(self.lower_exp(&kids[1])?);
        if kids.len() > 3 {
            self.lower_subscripts(&kids[3], out)?;
        }

        Ok(())
    }
}

// Type -> Basic Type'; the prime chain carries the array dimensions.
fn lower_type(cst: &Cst) -> Type {
    let kids = children(cst, GrammarSymbol::Type);

    let (_, lexeme, _) = terminal(&kids[0]);
    let base = BasicType::from_lexeme(lexeme).unwrap();

    let mut dims = vec![];
    collect_dims(&kids[1], &mut dims);

    Type { base, dims }
}

fn collect_dims(cst: &Cst, out: &mut Vec<u64>) {
    let kids = children(cst, GrammarSymbol::Type);

    if kids[0].is_epsilon() {
        return;
    }
    let (_, lexeme, _) = terminal(&kids[1]);
    out.push(lexeme.parse().unwrap());
    collect_dims(&kids[3], out);
}

fn binary_op(kind: TokenKind) -> BinaryOp {
    match kind {
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        TokenKind::Percent => BinaryOp::Mod,
        TokenKind::Equal => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Lte => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Gte => BinaryOp::Ge,
        TokenKind::And => BinaryOp::And,
        TokenKind::Or => BinaryOp::Or,
        _ => unreachable!("unexpected binary operator `{kind}`"),
    }
}
