// lowering tests.

use crate::front_end::ast::*;
use crate::front_end::lower::{lower, LowerError};
use crate::front_end::parser::parse;

fn lower_ok(code: &str) -> Program {
    let cst = parse(code).unwrap_or_else(|e| panic!("{e}"));
    lower(&cst, code).unwrap_or_else(|e| panic!("{e}"))
}

fn lower_err(code: &str) -> LowerError {
    let cst = parse(code).unwrap_or_else(|e| panic!("{e}"));
    lower(&cst, code).unwrap_err()
}

// the rhs of the nth top-level assignment.
fn assign_rhs(program: &Program, n: usize) -> &Exp {
    match program
        .body
        .stmts
        .iter()
        .filter_map(|stmt| match stmt {
            Stmt::Assign { rhs, .. } => Some(rhs),
            _ => None,
        })
        .nth(n)
    {
        Some(rhs) => rhs,
        None => panic!("no assignment {n}"),
    }
}

#[test]
fn arithmetic_and_if_lower_to_a_compact_tree() {
    let program = lower_ok(
        "int main() {
            int x;
            x = 5 + 3;
            if (x > 0) return x;
            return 0;
        }",
    );

    assert_eq!(program.ret, BasicType::Int);

    // main's body is one nested block below the outermost scope.
    assert_eq!(program.body.decls.len(), 1);
    assert_eq!(program.body.decls[0].name, "x");
    assert_eq!(program.body.decls[0].block, 1);

    assert_eq!(program.body.stmts.len(), 3);
    assert_eq!(
        *assign_rhs(&program, 0),
        Exp::Binary {
            op: BinaryOp::Add,
            lhs: Box::new(Exp::Int(5)),
            rhs: Box::new(Exp::Int(3)),
        }
    );

    let Stmt::If { guard, tt, ff } = &program.body.stmts[1] else {
        panic!("expected an if");
    };
    assert_eq!(
        *guard,
        Exp::Binary {
            op: BinaryOp::Gt,
            lhs: Box::new(Exp::Var(Var {
                name: "x".to_string(),
                block: 1,
                indices: vec![],
            })),
            rhs: Box::new(Exp::Int(0)),
        }
    );
    assert!(matches!(**tt, Stmt::Return(_)));
    assert!(ff.is_none());
}

#[test]
fn undeclared_identifier_reported() {
    let err = lower_err(
        "int main() {
            int x;
            x = y + 1;
            return 0;
        }",
    );

    let LowerError::Undeclared { name, line, .. } = err else {
        panic!("expected an undeclared error, got {err}");
    };
    assert_eq!(name, "y");
    assert_eq!(line, 2);
}

#[test]
fn undeclared_assignment_target_reported() {
    let err = lower_err("int main() { x = 1; return 0; }");
    assert!(matches!(err, LowerError::Undeclared { name, .. } if name == "x"));
}

#[test]
fn same_block_redeclaration_reported() {
    let err = lower_err(
        "int main() {
            int x;
            float x;
            return 0;
        }",
    );
    assert!(matches!(err, LowerError::Redeclared { name, line, .. }
        if name == "x" && line == 2));
}

// shadowing: the inner reference resolves to the inner block's declaration,
// the one after the block closes to the outer one.
#[test]
fn references_carry_the_resolved_block_id() {
    let program = lower_ok(
        "int main() {
            int x;
            { int x; x = 1; }
            return x;
        }",
    );

    let Stmt::Block(inner) = &program.body.stmts[0] else {
        panic!("expected a nested block");
    };
    let Stmt::Assign { lhs, .. } = &inner.stmts[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(lhs.block, 2);
    assert_eq!(inner.decls[0].block, 2);

    let Stmt::Return(Exp::Var(var)) = &program.body.stmts[1] else {
        panic!("expected `return x`");
    };
    assert_eq!(var.block, 1);
}

#[test]
fn sibling_block_locals_are_invisible() {
    let err = lower_err(
        "int main() {
            { int y; y = 1; }
            { return y; }
        }",
    );
    assert!(matches!(err, LowerError::Undeclared { name, .. } if name == "y"));
}

#[test]
fn operators_fold_left_associatively() {
    let program = lower_ok("int main() { int x; x = 1 - 2 - 3; return 0; }");

    // (1 - 2) - 3
    assert_eq!(
        *assign_rhs(&program, 0),
        Exp::Binary {
            op: BinaryOp::Sub,
            lhs: Box::new(Exp::Binary {
                op: BinaryOp::Sub,
                lhs: Box::new(Exp::Int(1)),
                rhs: Box::new(Exp::Int(2)),
            }),
            rhs: Box::new(Exp::Int(3)),
        }
    );
}

#[test]
fn precedence_spans_the_levels() {
    let program = lower_ok("int main() { int x; x = 1 + 2 * 3; return 0; }");

    // 1 + (2 * 3)
    let Exp::Binary { op, lhs, rhs } = assign_rhs(&program, 0) else {
        panic!("expected a binary node");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert_eq!(**lhs, Exp::Int(1));
    assert!(matches!(**rhs, Exp::Binary { op: BinaryOp::Mul, .. }));
}

#[test]
fn parentheses_group() {
    let program = lower_ok("int main() { int x; x = (1 + 2) * 3; return 0; }");

    let Exp::Binary { op, lhs, .. } = assign_rhs(&program, 0) else {
        panic!("expected a binary node");
    };
    assert_eq!(*op, BinaryOp::Mul);
    assert!(matches!(**lhs, Exp::Binary { op: BinaryOp::Add, .. }));
}

#[test]
fn unary_operators_nest() {
    let program = lower_ok("int main() { int x; x = - - 1; x = !(x == 0); return 0; }");

    assert_eq!(
        *assign_rhs(&program, 0),
        Exp::Unary {
            op: UnaryOp::Neg,
            exp: Box::new(Exp::Unary {
                op: UnaryOp::Neg,
                exp: Box::new(Exp::Int(1)),
            }),
        }
    );
    assert!(matches!(
        assign_rhs(&program, 1),
        Exp::Unary { op: UnaryOp::Not, .. }
    ));
}

#[test]
fn array_declarations_and_subscripts() {
    let program = lower_ok(
        "int main() {
            int[2][3] m;
            int x;
            x = 0;
            x = m[1][x + 1];
            m[x][0] = x;
            return 0;
        }",
    );

    assert_eq!(program.body.decls[0].typ.dims, vec![2, 3]);

    let Exp::Var(var) = assign_rhs(&program, 1) else {
        panic!("expected a variable read");
    };
    assert_eq!(var.indices.len(), 2);
    assert_eq!(var.indices[0], Exp::Int(1));
    assert!(matches!(var.indices[1], Exp::Binary { op: BinaryOp::Add, .. }));

    let Stmt::Assign { lhs, .. } = &program.body.stmts[2] else {
        panic!("expected an assignment");
    };
    assert_eq!(lhs.indices.len(), 2);
}

#[test]
fn else_binds_to_the_nearest_if() {
    let program = lower_ok(
        "int main() {
            int a; int b; int x;
            if (a > 0) if (b > 0) x = 1; else x = 2;
            return x;
        }",
    );

    let Stmt::If { tt, ff, .. } = &program.body.stmts[0] else {
        panic!("expected an if");
    };
    assert!(ff.is_none());
    assert!(matches!(**tt, Stmt::If { ff: Some(_), .. }));
}

#[test]
fn loops_and_break_lower_structurally() {
    let program = lower_ok(
        "int main() {
            int x;
            x = 0;
            while (x < 3) { x = x + 1; break; }
            do x = x - 1; while (x > 0);
            return x;
        }",
    );

    let Stmt::While { body, .. } = &program.body.stmts[1] else {
        panic!("expected a while");
    };
    let Stmt::Block(body) = &**body else {
        panic!("expected a block body");
    };
    assert!(matches!(body.stmts[1], Stmt::Break));

    assert!(matches!(program.body.stmts[2], Stmt::DoWhile { .. }));
}

// grammar-valid but meaningless without an enclosing loop; must be a
// diagnostic, not a panic further down the pipeline.
#[test]
fn break_outside_a_loop_reported() {
    let err = lower_err("int main() { break; return 0; }");
    assert!(matches!(err, LowerError::BreakOutsideLoop { line: 0, .. }));

    let err = lower_err(
        "int main() {
            int x;
            while (x < 1) x = 1;
            break;
            return 0;
        }",
    );
    assert!(matches!(err, LowerError::BreakOutsideLoop { line: 3, .. }));
}

#[test]
fn break_inside_a_loop_accepted() {
    lower_ok("int main() { int x; while (x < 1) { break; } return 0; }");
    lower_ok("int main() { int x; do break; while (x > 0); return 0; }");
    lower_ok(
        "int main() {
            int x;
            while (x < 1) if (x == 0) break;
            return 0;
        }",
    );
}

#[test]
fn real_literals_lower_to_reals() {
    let program = lower_ok("int main() { float y; y = 3.25; return 0; }");
    assert_eq!(*assign_rhs(&program, 0), Exp::Real(3.25));
}

#[test]
fn return_takes_a_full_expression() {
    let program = lower_ok("int main() { int x; x = 1; return x * 2 + 1; }");
    assert!(matches!(
        program.body.stmts[1],
        Stmt::Return(Exp::Binary { op: BinaryOp::Add, .. })
    ));
}
