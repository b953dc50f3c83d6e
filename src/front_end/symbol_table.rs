// block-scoped symbol table mapping identifier lexemes to declaration
// records.
//
// Scope policy: strict stack-scoped visibility. `find` consults only the
// blocks currently on the active scope chain, innermost first, so a sibling
// block entered later never sees a previously exited sibling's locals.
// Records themselves are kept for the table's lifetime and are only
// unreachable once their block leaves the chain.

use std::collections::HashMap;

use derive_more::Display;
use serde::Serialize;

use super::ast::Type;

/// Identifies one lexical nesting scope; assigned monotonically on scope
/// entry, so two sibling blocks never share an id.
pub type BlockId = u32;

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
pub enum Category {
    #[display(fmt = "variable")]
    Variable,
    #[display(fmt = "keyword")]
    Keyword,
}

/// One declaration record. Created when a declaration statement is processed
/// and never mutated afterwards, except for `declared_type` via `set_type`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Declaration {
    pub lexeme: String,
    pub category: Category,
    pub declared_type: Option<Type>,
    pub block: BlockId,
    pub line: usize,
    pub column: usize,
    pub length: usize,
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    // all records ever inserted, chained per lexeme. std's siphash keeps the
    // buckets well distributed even for the additive-sum collision sets that
    // defeated fixed-bucket character-sum hashing.
    entries: HashMap<String, Vec<Declaration>>,
    // the active scope chain; scopes[0] is the outermost block.
    scopes: Vec<BlockId>,
    // the highest block id handed out so far.
    next_block: BlockId,
}

impl SymbolTable {
    /// A table with the outermost block (id 0) already entered.
    pub fn new() -> Self {
        SymbolTable {
            entries: HashMap::new(),
            scopes: vec![0],
            next_block: 0,
        }
    }

    // the innermost active block.
    pub fn current_block(&self) -> BlockId {
        *self.scopes.last().unwrap_or(&0)
    }

    /// Enters a nested block, minting a fresh block id. Must be paired with
    /// `exit_block` around every lexical block processed.
    pub fn enter_block(&mut self) -> BlockId {
        self.next_block += 1;
        self.scopes.push(self.next_block);
        self.next_block
    }

    /// Leaves the innermost block; its declarations stop being visible. The
    /// outermost block is never popped.
    pub fn exit_block(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Adds a record tagged with the current block id. Returns false without
    /// inserting if the lexeme already exists at that same block (a same-scope
    /// redeclaration); severity is decided by the caller.
    pub fn insert(
        &mut self,
        lexeme: &str,
        category: Category,
        declared_type: Option<Type>,
        line: usize,
        column: usize,
        length: usize,
    ) -> bool {
        let block = self.current_block();
        let chain = self.entries.entry(lexeme.to_string()).or_default();

        if chain.iter().any(|decl| decl.block == block) {
            return false;
        }

        chain.push(Declaration {
            lexeme: lexeme.to_string(),
            category,
            declared_type,
            block,
            line,
            column,
            length,
        });
        true
    }

    /// The nearest visible declaration of `lexeme`: the scope chain is
    /// scanned outward from the current block to the outermost one.
    pub fn find(&self, lexeme: &str) -> Option<&Declaration> {
        let chain = self.entries.get(lexeme)?;

        self.scopes
            .iter()
            .rev()
            .find_map(|block| chain.iter().find(|decl| decl.block == *block))
    }

    // the type of the nearest visible declaration.
    pub fn get_type(&self, lexeme: &str) -> Option<&Type> {
        self.find(lexeme)?.declared_type.as_ref()
    }

    /// Updates the type of the nearest visible declaration; returns false if
    /// no declaration is visible.
    pub fn set_type(&mut self, lexeme: &str, declared_type: Type) -> bool {
        let Some(block) = self
            .find(lexeme)
            .map(|decl| decl.block)
        else {
            return false;
        };

        let chain = self.entries.get_mut(lexeme).unwrap();
        let decl = chain.iter_mut().find(|decl| decl.block == block).unwrap();
        decl.declared_type = Some(declared_type);
        true
    }
}
