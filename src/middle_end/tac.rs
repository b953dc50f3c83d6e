// generate three-address code from the AST. assumes the AST is valid; may
// panic if it is not.
//
// every instruction has at most one operator and at most three addresses.
// temporaries (t1, t2, ...) and labels (L1, L2, ...) are minted from
// per-program counters starting at 1, so generation is deterministic: the
// same AST always yields the same instruction sequence.

use derive_more::Display;
use serde::Serialize;

use crate::front_end::ast::{BinaryOp, Block, Exp, Program, Stmt, UnaryOp, Var};

// SECTION: instruction set

// a jump target.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, Serialize)]
#[display(fmt = "L{}", _0)]
pub struct Label(pub u32);

// an instruction address: a literal, a named variable, or a temporary.
#[derive(Clone, Debug, Display, PartialEq, Serialize)]
pub enum Operand {
    #[display(fmt = "{}", _0)]
    Int(i64),
    // the Debug form keeps the decimal point on whole values, so `7.0`
    // stays distinguishable from the integer `7` in a listing.
    #[display(fmt = "{:?}", _0)]
    Real(f64),
    #[display(fmt = "{}", _0)]
    Var(String),
    #[display(fmt = "t{}", _0)]
    Temp(u32),
}

#[derive(Clone, Debug, Display, PartialEq, Serialize)]
pub enum Instruction {
    // dest = lhs OP rhs
    #[display(fmt = "{} = {} {} {}", dest, lhs, op, rhs)]
    Binary {
        op: BinaryOp,
        dest: Operand,
        lhs: Operand,
        rhs: Operand,
    },
    // dest = OP operand
    #[display(fmt = "{} = {} {}", dest, op, operand)]
    Unary {
        op: UnaryOp,
        dest: Operand,
        operand: Operand,
    },
    // dest = src
    #[display(fmt = "{} = {}", dest, src)]
    Copy { dest: Operand, src: Operand },
    // dest = base[index]
    #[display(fmt = "{} = {}[{}]", dest, base, index)]
    IndexLoad {
        dest: Operand,
        base: Operand,
        index: Operand,
    },
    // base[index] = src
    #[display(fmt = "{}[{}] = {}", base, index, src)]
    IndexStore {
        base: Operand,
        index: Operand,
        src: Operand,
    },
    #[display(fmt = "{}:", _0)]
    Label(Label),
    #[display(fmt = "goto {}", _0)]
    Jump(Label),
    #[display(fmt = "if {} goto {}", cond, target)]
    BranchTrue { cond: Operand, target: Label },
    #[display(fmt = "ifFalse {} goto {}", cond, target)]
    BranchFalse { cond: Operand, target: Label },
    #[display(fmt = "return {}", _0)]
    Return(Operand),
}

// SECTION: generation

pub fn generate(program: &Program) -> Vec<Instruction> {
    let mut gen = TacGen::new();
    gen.gen_block(&program.body);
    gen.insts
}

struct TacGen {
    insts: Vec<Instruction>,
    tmp_ctr: u32,   // counter for minting temporaries
    label_ctr: u32, // counter for minting labels

    // for translating `break` statements: the exit label of each enclosing
    // loop, innermost last.
    loop_info: Vec<Label>,
}

impl TacGen {
    fn new() -> Self {
        TacGen {
            insts: vec![],
            tmp_ctr: 0,
            label_ctr: 0,
            loop_info: vec![],
        }
    }

    fn fresh_tmp(&mut self) -> Operand {
        self.tmp_ctr += 1;
        Operand::Temp(self.tmp_ctr)
    }

    fn fresh_label(&mut self) -> Label {
        self.label_ctr += 1;
        Label(self.label_ctr)
    }

    // declarations emit no code; only the statements do.
    fn gen_block(&mut self, block: &Block) {
        for stmt in &block.stmts {
            self.gen_stmt(stmt);
        }
    }

    fn gen_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::If { guard, tt, ff } => self.gen_if(guard, tt, ff.as_deref()),
            Stmt::While { guard, body } => self.gen_while(guard, body),
            Stmt::DoWhile { body, guard } => self.gen_do_while(body, guard),
            Stmt::Assign { lhs, rhs } => self.gen_assign(lhs, rhs),
            Stmt::Return(exp) => {
                let value = self.gen_exp(exp);
                self.insts.push(Instruction::Return(value));
            }
            Stmt::Break => {
                // lowering rejects a `break` with no enclosing loop, so the
                // stack is never empty here.
                let target = *self.loop_info.last().unwrap();
                self.insts.push(Instruction::Jump(target));
            }
            Stmt::Block(block) => self.gen_block(block),
        }
    }

    //     <guard>
    //     ifFalse t goto L1
    //     <then>
    //     goto L2        (only with an else branch)
    // L1: <else>
    // L2:
    fn gen_if(&mut self, guard: &Exp, tt: &Stmt, ff: Option<&Stmt>) {
        let cond = self.gen_exp(guard);
        let skip = self.fresh_label();
        self.insts.push(Instruction::BranchFalse {
            cond,
            target: skip,
        });
        self.gen_stmt(tt);

        match ff {
            Some(ff) => {
                let end = self.fresh_label();
                self.insts.push(Instruction::Jump(end));
                self.insts.push(Instruction::Label(skip));
                self.gen_stmt(ff);
                self.insts.push(Instruction::Label(end));
            }
            None => self.insts.push(Instruction::Label(skip)),
        }
    }

    // L1: <guard>
    //     ifFalse t goto L2
    //     <body>
    //     goto L1
    // L2:
    fn gen_while(&mut self, guard: &Exp, body: &Stmt) {
        let head = self.fresh_label();
        let exit = self.fresh_label();

        self.insts.push(Instruction::Label(head));
        let cond = self.gen_exp(guard);
        self.insts.push(Instruction::BranchFalse {
            cond,
            target: exit,
        });

        self.loop_info.push(exit);
        self.gen_stmt(body);
        self.loop_info.pop();

        self.insts.push(Instruction::Jump(head));
        self.insts.push(Instruction::Label(exit));
    }

    // L1: <body>
    //     <guard>
    //     if t goto L1
    // L2:
    fn gen_do_while(&mut self, body: &Stmt, guard: &Exp) {
        let head = self.fresh_label();
        let exit = self.fresh_label();

        self.insts.push(Instruction::Label(head));

        self.loop_info.push(exit);
        self.gen_stmt(body);
        self.loop_info.pop();

        let cond = self.gen_exp(guard);
        self.insts.push(Instruction::BranchTrue {
            cond,
            target: head,
        });
        self.insts.push(Instruction::Label(exit));
    }

    // a plain target gets a Copy; a subscripted target evaluates all leading
    // indices as loads and stores through the last one.
    fn gen_assign(&mut self, lhs: &Var, rhs: &Exp) {
        let src = self.gen_exp(rhs);

        if lhs.indices.is_empty() {
            self.insts.push(Instruction::Copy {
                dest: Operand::Var(lhs.name.clone()),
                src,
            });
            return;
        }

        let mut base = Operand::Var(lhs.name.clone());
        for index in &lhs.indices[..lhs.indices.len() - 1] {
            let index = self.gen_exp(index);
            let dest = self.fresh_tmp();
            self.insts.push(Instruction::IndexLoad {
                dest: dest.clone(),
                base,
                index,
            });
            base = dest;
        }

        let index = self.gen_exp(lhs.indices.last().unwrap());
        self.insts.push(Instruction::IndexStore { base, index, src });
    }

    // evaluates the expression, appending its instructions, and returns the
    // operand holding the result. literals and plain variables produce no
    // instructions.
    fn gen_exp(&mut self, exp: &Exp) -> Operand {
        match exp {
            Exp::Int(value) => Operand::Int(*value),
            Exp::Real(value) => Operand::Real(*value),
            Exp::Var(var) => self.gen_var(var),
            Exp::Unary { op, exp } => {
                let operand = self.gen_exp(exp);
                let dest = self.fresh_tmp();
                self.insts.push(Instruction::Unary {
                    op: *op,
                    dest: dest.clone(),
                    operand,
                });
                dest
            }
            // operands evaluate left to right; && and || are ordinary binary
            // instructions, there is no short-circuit translation.
            Exp::Binary { op, lhs, rhs } => {
                let lhs = self.gen_exp(lhs);
                let rhs = self.gen_exp(rhs);
                let dest = self.fresh_tmp();
                self.insts.push(Instruction::Binary {
                    op: *op,
                    dest: dest.clone(),
                    lhs,
                    rhs,
                });
                dest
            }
        }
    }

    // a subscripted read loads through a chain of temporaries, one per index.
    fn gen_var(&mut self, var: &Var) -> Operand {
        let mut result = Operand::Var(var.name.clone());

        for index in &var.indices {
            let index = self.gen_exp(index);
            let dest = self.fresh_tmp();
            self.insts.push(Instruction::IndexLoad {
                dest: dest.clone(),
                base: result,
                index,
            });
            result = dest;
        }

        result
    }
}
