// symbol table tests.

use crate::front_end::ast::{BasicType, Type};
use crate::front_end::symbol_table::{Category, SymbolTable};

fn int_type() -> Type {
    Type {
        base: BasicType::Int,
        dims: vec![],
    }
}

fn float_type() -> Type {
    Type {
        base: BasicType::Float,
        dims: vec![],
    }
}

fn insert_var(table: &mut SymbolTable, lexeme: &str, typ: Type) -> bool {
    table.insert(lexeme, Category::Variable, Some(typ), 0, 0, lexeme.len())
}

#[test]
fn fresh_table_sits_in_block_zero() {
    let table = SymbolTable::new();
    assert_eq!(table.current_block(), 0);
    assert!(table.find("x").is_none());
}

#[test]
fn same_block_redeclaration_rejected() {
    let mut table = SymbolTable::new();

    assert!(insert_var(&mut table, "x", int_type()));
    assert!(!insert_var(&mut table, "x", float_type()));

    // the original record survives the rejected insert.
    let decl = table.find("x").unwrap();
    assert_eq!(decl.declared_type, Some(int_type()));
}

#[test]
fn shadowing_resolves_innermost_and_exit_restores_outer() {
    let mut table = SymbolTable::new();
    insert_var(&mut table, "x", int_type());

    let inner = table.enter_block();
    assert!(insert_var(&mut table, "x", float_type()));
    assert_eq!(table.find("x").unwrap().block, inner);
    assert_eq!(table.get_type("x"), Some(&float_type()));

    table.exit_block();
    assert_eq!(table.find("x").unwrap().block, 0);
    assert_eq!(table.get_type("x"), Some(&int_type()));
}

// a sibling block entered after another was exited must not see the exited
// sibling's locals, even though their records are still stored.
#[test]
fn sibling_scopes_are_invisible() {
    let mut table = SymbolTable::new();

    table.enter_block();
    insert_var(&mut table, "y", int_type());
    table.exit_block();

    table.enter_block();
    assert!(table.find("y").is_none());
}

#[test]
fn sibling_blocks_get_distinct_ids() {
    let mut table = SymbolTable::new();

    let first = table.enter_block();
    table.exit_block();
    let second = table.enter_block();

    assert_ne!(first, second);
}

#[test]
fn lookup_walks_the_scope_chain_outward() {
    let mut table = SymbolTable::new();
    insert_var(&mut table, "a", int_type());

    table.enter_block();
    insert_var(&mut table, "b", int_type());
    table.enter_block();

    assert_eq!(table.find("a").unwrap().block, 0);
    assert_eq!(table.find("b").unwrap().block, 1);
    assert!(table.find("c").is_none());
}

#[test]
fn outermost_block_never_pops() {
    let mut table = SymbolTable::new();
    table.exit_block();
    table.exit_block();

    assert_eq!(table.current_block(), 0);
    assert!(insert_var(&mut table, "x", int_type()));
}

// names whose character sums collide (a fixed-bucket character-sum hash maps
// them to the same slot) stay fully distinct here.
#[test]
fn collision_prone_names_stay_distinct() {
    let mut table = SymbolTable::new();

    for name in ["ab", "ba", "abc", "acb", "bac", "cab"] {
        assert!(insert_var(&mut table, name, int_type()));
    }
    for name in ["ab", "ba", "abc", "acb", "bac", "cab"] {
        assert_eq!(table.find(name).unwrap().lexeme, name);
    }
}

#[test]
fn set_type_updates_the_nearest_visible_record() {
    let mut table = SymbolTable::new();
    table.insert("x", Category::Variable, None, 0, 0, 1);

    assert!(table.set_type("x", int_type()));
    assert_eq!(table.get_type("x"), Some(&int_type()));

    assert!(!table.set_type("missing", int_type()));
}

#[test]
fn keyword_records_coexist_with_variables() {
    let mut table = SymbolTable::new();

    assert!(table.insert("while", Category::Keyword, None, 0, 0, 5));
    assert!(insert_var(&mut table, "x", int_type()));
    assert_eq!(table.find("while").unwrap().category, Category::Keyword);
}
