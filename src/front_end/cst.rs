// the concrete syntax tree: one node per matched grammar symbol, terminals
// included.

use std::fmt::Write;
use std::ops::Range;

use derive_more::Display;

use super::lexer::TokenKind;

/// A node of the concrete syntax tree. Every parent exclusively owns its
/// children; dropping the root drops the whole derivation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Cst {
    /// A matched terminal, carrying its kind and lexeme.
    Terminal {
        kind: TokenKind,
        lexeme: String,
        span: Range<usize>,
    },
    /// A matched non-terminal with its ordered children.
    NonTerminal {
        symbol: GrammarSymbol,
        children: Vec<Cst>,
    },
    /// An empty derivation; pruned during lowering.
    Epsilon,
}

/// The non-terminal symbols of the grammar.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum GrammarSymbol {
    Program,
    Block,
    Decls,
    Decl,
    Type,
    Stmts,
    Stmt,
    Loc,
    Bool,
    Join,
    Equality,
    Rel,
    Expr,
    Term,
    Unary,
    Factor,
}

impl Cst {
    pub fn non_terminal(symbol: GrammarSymbol, children: Vec<Cst>) -> Cst {
        Cst::NonTerminal { symbol, children }
    }

    pub fn is_epsilon(&self) -> bool {
        matches!(self, Cst::Epsilon)
    }

    // the symbol of a non-terminal node, if it is one.
    pub fn symbol(&self) -> Option<GrammarSymbol> {
        match self {
            Cst::NonTerminal { symbol, .. } => Some(*symbol),
            _ => None,
        }
    }

    /// Collects the terminal leaves in derivation order. Read back in order
    /// they reproduce the token stream the parser consumed.
    pub fn terminals(&self) -> Vec<&Cst> {
        let mut out = vec![];
        self.collect_terminals(&mut out);
        out
    }

    fn collect_terminals<'a>(&'a self, out: &mut Vec<&'a Cst>) {
        match self {
            Cst::Terminal { .. } => out.push(self),
            Cst::NonTerminal { children, .. } => {
                for child in children {
                    child.collect_terminals(out);
                }
            }
            Cst::Epsilon => {}
        }
    }

    /// Renders the tree one node per line, indented by depth, epsilon nodes
    /// omitted.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out, 0);
        out
    }

    fn render_into(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let connector = if depth > 0 { "|-- " } else { "" };
        match self {
            Cst::Terminal { lexeme, .. } => {
                let _ = writeln!(out, "{indent}{connector}[{lexeme}]");
            }
            Cst::NonTerminal { symbol, children } => {
                let _ = writeln!(out, "{indent}{connector}[{symbol}]");
                for child in children {
                    if !child.is_epsilon() {
                        child.render_into(out, depth + 1);
                    }
                }
            }
            Cst::Epsilon => {}
        }
    }
}
