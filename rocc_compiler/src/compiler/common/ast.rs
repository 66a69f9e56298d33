//! The tree produced by the parser and consumed by codegen.
//! All nodes are plain sum-types, built once during parsing and read-only
//! afterwards; variables are shared with the scope-tree through [VarRef].

use crate::compiler::common::environment::{ScopeId, TypeRef, VarRef};
use crate::compiler::common::token::Token;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinOpKind {
    Add,
    Sub,
    Mul,
    Div,
    Assign,
    Equal,
}
impl Display for BinOpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinOpKind::Add => write!(f, "add"),
            BinOpKind::Sub => write!(f, "sub"),
            BinOpKind::Mul => write!(f, "mul"),
            BinOpKind::Div => write!(f, "div"),
            BinOpKind::Assign => write!(f, "assign"),
            BinOpKind::Equal => write!(f, "equal"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Expr {
    Number(i32),
    Var(VarRef),
    VarDefine(VarRef),
    Binary {
        op: BinOpKind,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Call {
        // keeps its token so codegen-diagnostics can point at the call-site
        name: Token,
        args: Vec<Expr>,
    },
    Nop,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
    If(Expr, Box<Stmt>, Option<Box<Stmt>>),
    While(Expr, Box<Stmt>),
    Block(Block),
}

/// Statements of a `{ ... }` region together with the scope created for it
#[derive(Debug, Clone)]
pub struct Block {
    pub stmts: Vec<Stmt>,
    pub scope: ScopeId,
}

#[derive(Debug, Clone)]
pub struct FuncDef {
    pub return_type: TypeRef,
    pub name: String,
    pub params: Vec<VarRef>,
    pub body: Block,
    /// Bytes occupied by all variable slots of the function, parameters included
    pub stack_size: usize,
}

// the s-expression dump emitted by --dump-ast
impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Number(n) => write!(f, "{}", n),
            Expr::Var(var) => write!(f, "{}", var.borrow().name),
            Expr::VarDefine(var) => {
                write!(f, "(define {} {})", var.borrow().ty.name, var.borrow().name)
            }
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", op, left, right),
            Expr::Call { name, args } => {
                write!(f, "(call {}", name.unwrap_string())?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Nop => write!(f, "()"),
        }
    }
}
impl Display for Stmt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stmt::Expr(expr) => write!(f, "{}", expr),
            Stmt::Return(expr) => write!(f, "(return {})", expr),
            Stmt::If(cond, then_branch, None) => write!(f, "(if {} {})", cond, then_branch),
            Stmt::If(cond, then_branch, Some(else_branch)) => {
                write!(f, "(if {} {} {})", cond, then_branch, else_branch)
            }
            Stmt::While(cond, body) => write!(f, "(while {} {})", cond, body),
            Stmt::Block(block) => write!(f, "{}", block),
        }
    }
}
impl Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(block")?;
        for stmt in &self.stmts {
            write!(f, " {}", stmt)?;
        }
        write!(f, ")")
    }
}
impl Display for FuncDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(fundef {} {} (", self.return_type.name, self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "({} {})", param.borrow().ty.name, param.borrow().name)?;
        }
        write!(f, ") {})", self.body)
    }
}
