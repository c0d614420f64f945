//! Checked declarations and their type-annotated bodies.

use serde::Serialize;
use strata_syntax::{BinaryOp, UnaryOp};

use crate::types::TypeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclKind {
    Global,
    Function,
}

/// A module-level declaration that passed semantic analysis.
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub kind: DeclKind,
    /// Value type for globals, function type for functions.
    pub ty: TypeId,
    /// `file:line:column` of the declared name.
    pub location: String,
    /// Parameter names; empty for globals.
    pub params: Vec<String>,
    /// Initializer or function body, set once checked.
    pub body: Option<TypedExpr>,
    /// Position in source order across all files.
    pub(crate) order: usize,
}

impl Decl {
    pub fn is_function(&self) -> bool {
        self.kind == DeclKind::Function
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedExpr {
    pub kind: TypedExprKind,
    pub ty: TypeId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypedExprKind {
    Int(i64),
    Bool(bool),
    Str(String),
    /// Function parameter by position.
    Local(u32),
    Global(String),
    Call {
        func: String,
        args: Vec<TypedExpr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<TypedExpr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<TypedExpr>,
        rhs: Box<TypedExpr>,
    },
    If {
        cond: Box<TypedExpr>,
        then_branch: Box<TypedExpr>,
        else_branch: Box<TypedExpr>,
    },
}

impl TypedExpr {
    pub fn new(kind: TypedExprKind, ty: TypeId) -> Self {
        Self { kind, ty }
    }
}
