//! Emits x86-64 assembly in AT&T-syntax out of the AST

use crate::compiler::common::{ast::*, environment::align_by, error::*, token::Token};

/// Argument passing registers of the System-V calling convention, 32-bit wide
const ARG_REGS: [&str; 6] = ["%edi", "%esi", "%edx", "%ecx", "%r8d", "%r9d"];

/// Evaluation model: every expression leaves its result in `%eax`. Binary
/// operators park one operand in a scratch stack-slot while the other side is
/// computed, where the slot index is the current expression-depth. The frame
/// of a function is sized up front to cover the deepest slot any of its
/// expressions touches, so scratch values never live below `%rsp`.
pub struct Codegen {
    /// All the generated code
    output: Vec<String>,

    /// Counter for unique label names
    label_index: usize,
}
impl Codegen {
    pub fn new() -> Self {
        Codegen {
            output: Vec::new(),
            label_index: 0,
        }
    }

    pub fn generate(mut self, funcs: &[FuncDef]) -> Result<String, Error> {
        self.write_out("\t.text");
        for func in funcs {
            self.function_definition(func)?;
        }
        Ok(self.output.join("\n") + "\n")
    }

    fn function_definition(&mut self, func: &FuncDef) -> Result<(), Error> {
        // slots below base_depth belong to declared variables
        let base_depth = func.stack_size / 4 + 1;
        let frame_size = frame_size(func, base_depth);

        self.write_out(format!("\t.global {}", func.name));
        self.write_out(format!("{}:", func.name));
        self.write_out("\tpushq %rbp");
        self.write_out("\tmovq %rsp, %rbp");
        self.write_out(format!("\tsubq ${}, %rsp", frame_size));

        for (i, param) in func.params.iter().enumerate() {
            self.write_out(format!(
                "\tmovl {}, -{}(%rbp)",
                ARG_REGS[i],
                param.borrow().offset
            ));
        }

        self.block(&func.body, base_depth)?;

        // functions falling off the end still have to unwind their frame
        self.epilogue();
        Ok(())
    }

    fn block(&mut self, block: &Block, depth: usize) -> Result<(), Error> {
        for stmt in &block.stmts {
            self.statement(stmt, depth + 1)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Stmt, depth: usize) -> Result<(), Error> {
        match stmt {
            Stmt::Expr(expr) => self.expression(expr, depth),
            Stmt::Return(expr) => {
                self.expression(expr, depth)?;
                self.epilogue();
                Ok(())
            }
            Stmt::If(cond, then_branch, else_branch) => {
                self.if_statement(cond, then_branch, else_branch.as_deref(), depth)
            }
            Stmt::While(cond, body) => self.while_statement(cond, body, depth),
            Stmt::Block(block) => self.block(block, depth),
        }
    }

    fn if_statement(
        &mut self,
        cond: &Expr,
        then_branch: &Stmt,
        else_branch: Option<&Stmt>,
        depth: usize,
    ) -> Result<(), Error> {
        let join_label = self.create_label();

        self.expression(cond, depth)?;
        self.write_out("\tcmpl $0, %eax");

        match else_branch {
            Some(else_branch) => {
                let else_label = self.create_label();
                self.write_out(format!("\tje {}", else_label));
                self.statement(then_branch, depth)?;
                self.write_out(format!("\tjmp {}", join_label));
                self.write_out(format!("{}:", else_label));
                self.statement(else_branch, depth)?;
            }
            None => {
                self.write_out(format!("\tje {}", join_label));
                self.statement(then_branch, depth)?;
            }
        }
        self.write_out(format!("{}:", join_label));
        Ok(())
    }

    fn while_statement(&mut self, cond: &Expr, body: &Stmt, depth: usize) -> Result<(), Error> {
        let head_label = self.create_label();
        let exit_label = self.create_label();

        self.write_out(format!("{}:", head_label));
        self.expression(cond, depth)?;
        self.write_out("\tcmpl $0, %eax");
        self.write_out(format!("\tje {}", exit_label));

        self.statement(body, depth)?;
        self.write_out(format!("\tjmp {}", head_label));
        self.write_out(format!("{}:", exit_label));
        Ok(())
    }

    fn expression(&mut self, expr: &Expr, depth: usize) -> Result<(), Error> {
        match expr {
            Expr::Number(n) => self.write_out(format!("\tmovl ${}, %eax", n)),
            Expr::Var(var) => {
                self.write_out(format!("\tmovl -{}(%rbp), %eax", var.borrow().offset))
            }
            // slots were already assigned during parsing
            Expr::VarDefine(..) | Expr::Nop => (),
            Expr::Binary { op, left, right } => {
                return self.binary_expression(*op, left, right, depth)
            }
            Expr::Call { name, args } => return self.call(name, args, depth),
        }
        Ok(())
    }

    fn binary_expression(
        &mut self,
        op: BinOpKind,
        left: &Expr,
        right: &Expr,
        depth: usize,
    ) -> Result<(), Error> {
        if let BinOpKind::Assign = op {
            let offset = match left {
                Expr::Var(var) => var.borrow().offset,
                _ => unreachable!("assignment target is checked during parsing"),
            };
            // the value stays in %eax, so chained assignments see it
            self.expression(right, depth + 1)?;
            self.write_out(format!("\tmovl %eax, -{}(%rbp)", offset));
            return Ok(());
        }

        let offset = depth * 4;

        // the operand landing in the scratch-slot is the one the instruction
        // reads back, so non-commutative operators compute their right side first
        match op {
            BinOpKind::Sub | BinOpKind::Div => {
                self.expression(right, depth + 1)?;
                self.write_out(format!("\tmovl %eax, -{}(%rbp)", offset));
                self.expression(left, depth + 2)?;
            }
            _ => {
                self.expression(left, depth + 1)?;
                self.write_out(format!("\tmovl %eax, -{}(%rbp)", offset));
                self.expression(right, depth + 2)?;
            }
        }

        match op {
            BinOpKind::Add => self.write_out(format!("\taddl -{}(%rbp), %eax", offset)),
            BinOpKind::Sub => self.write_out(format!("\tsubl -{}(%rbp), %eax", offset)),
            BinOpKind::Mul => self.write_out(format!("\timull -{}(%rbp), %eax", offset)),
            BinOpKind::Div => {
                self.write_out("\tcltd");
                self.write_out(format!("\tidivl -{}(%rbp)", offset));
            }
            BinOpKind::Equal => {
                self.write_out(format!("\tcmpl -{}(%rbp), %eax", offset));
                self.write_out("\tsete %al");
                self.write_out("\tmovzbl %al, %eax");
            }
            BinOpKind::Assign => unreachable!("handled above"),
        }
        Ok(())
    }

    fn call(&mut self, name: &Token, args: &[Expr], depth: usize) -> Result<(), Error> {
        if args.len() > ARG_REGS.len() {
            return Err(Error::new(
                name,
                ErrorKind::TooManyArgs(name.unwrap_string(), args.len()),
            ));
        }

        // the argument registers are live across nested calls, park them
        for (i, reg) in ARG_REGS.iter().take(args.len()).enumerate() {
            self.write_out(format!("\tmovl {}, -{}(%rbp)", reg, (depth + 1 + i) * 4));
        }
        for (i, arg) in args.iter().enumerate() {
            match arg {
                Expr::Number(n) => self.write_out(format!("\tmovl ${}, {}", n, ARG_REGS[i])),
                _ => {
                    // evaluated above the 6 parking slots
                    self.expression(arg, depth + 7)?;
                    self.write_out(format!("\tmovl %eax, {}", ARG_REGS[i]));
                }
            }
        }
        self.write_out(format!("\tcall {}", name.unwrap_string()));

        for (i, reg) in ARG_REGS.iter().take(args.len()).enumerate() {
            self.write_out(format!("\tmovl -{}(%rbp), {}", (depth + 1 + i) * 4, reg));
        }
        Ok(())
    }

    fn epilogue(&mut self) {
        self.write_out("\tmovq %rbp, %rsp");
        self.write_out("\tpopq %rbp");
        self.write_out("\tret");
    }

    fn create_label(&mut self) -> String {
        let label = format!(".L{}", self.label_index);
        self.label_index += 1;
        label
    }

    fn write_out(&mut self, line: impl Into<String>) {
        self.output.push(line.into());
    }
}

/// Bytes to reserve below `%rbp`, covering the variable slots and the deepest
/// scratch-slot the function's expressions spill to, rounded up to the 16-byte
/// stack alignment `call` expects
fn frame_size(func: &FuncDef, base_depth: usize) -> usize {
    let max_slot = block_slots(&func.body, base_depth);
    align_by(usize::max(func.stack_size, max_slot * 4), 16)
}

// the *_slots functions mirror the depth accounting of the emission above
fn block_slots(block: &Block, depth: usize) -> usize {
    block
        .stmts
        .iter()
        .map(|stmt| stmt_slots(stmt, depth + 1))
        .max()
        .unwrap_or(0)
}
fn stmt_slots(stmt: &Stmt, depth: usize) -> usize {
    match stmt {
        Stmt::Expr(expr) | Stmt::Return(expr) => expr_slots(expr, depth),
        Stmt::If(cond, then_branch, else_branch) => expr_slots(cond, depth)
            .max(stmt_slots(then_branch, depth))
            .max(else_branch.as_ref().map_or(0, |e| stmt_slots(e, depth))),
        Stmt::While(cond, body) => expr_slots(cond, depth).max(stmt_slots(body, depth)),
        Stmt::Block(block) => block_slots(block, depth),
    }
}
fn expr_slots(expr: &Expr, depth: usize) -> usize {
    match expr {
        Expr::Number(..) | Expr::Var(..) | Expr::VarDefine(..) | Expr::Nop => 0,
        Expr::Binary {
            op: BinOpKind::Assign,
            right,
            ..
        } => expr_slots(right, depth + 1),
        Expr::Binary { op, left, right } => {
            let (first, second) = match op {
                BinOpKind::Sub | BinOpKind::Div => (right, left),
                _ => (left, right),
            };
            depth
                .max(expr_slots(first, depth + 1))
                .max(expr_slots(second, depth + 2))
        }
        Expr::Call { args, .. } => {
            let mut max = if args.is_empty() { 0 } else { depth + args.len() };
            for arg in args {
                if !matches!(arg, Expr::Number(..)) {
                    max = max.max(expr_slots(arg, depth + 7));
                }
            }
            max
        }
    }
}
