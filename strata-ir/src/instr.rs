//! Stack-machine instructions.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::IrType;

/// A single instruction. Operands are popped from and results pushed onto
/// an implicit value stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", content = "arg", rename_all = "snake_case")]
pub enum Instr {
    ConstInt(i64),
    ConstBool(bool),
    ConstStr(String),
    /// Push the value of a parameter.
    LoadLocal(u32),
    /// Push the value of a module global.
    LoadGlobal(String),
    /// Pop `argc` arguments, call `func`, push its result.
    Call { func: String, argc: u32 },
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Not,
    Concat,
    Eq(IrType),
    Ne(IrType),
    Lt,
    Le,
    Gt,
    Ge,
    /// Continue at an absolute instruction index.
    Jump(usize),
    /// Pop a bool; continue at the target when it is false.
    JumpIfFalse(usize),
    Return,
}

impl Instr {
    /// Whether this instruction may transfer control somewhere other than the next one.
    pub fn is_branch(&self) -> bool {
        matches!(self, Instr::Jump(_) | Instr::JumpIfFalse(_))
    }

    /// The callee, for call instructions.
    pub fn callee(&self) -> Option<&str> {
        match self {
            Instr::Call { func, .. } => Some(func),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::ConstInt(value) => write!(f, "const.i64 {}", value),
            Instr::ConstBool(value) => write!(f, "const.bool {}", value),
            Instr::ConstStr(value) => write!(f, "const.str {:?}", value),
            Instr::LoadLocal(index) => write!(f, "load.local {}", index),
            Instr::LoadGlobal(name) => write!(f, "load.global @{}", name),
            Instr::Call { func, argc } => write!(f, "call @{}, {}", func, argc),
            Instr::Add => write!(f, "add.i64"),
            Instr::Sub => write!(f, "sub.i64"),
            Instr::Mul => write!(f, "mul.i64"),
            Instr::Div => write!(f, "div.i64"),
            Instr::Neg => write!(f, "neg.i64"),
            Instr::Not => write!(f, "not"),
            Instr::Concat => write!(f, "concat.str"),
            Instr::Eq(ty) => write!(f, "eq.{}", ty),
            Instr::Ne(ty) => write!(f, "ne.{}", ty),
            Instr::Lt => write!(f, "lt.i64"),
            Instr::Le => write!(f, "le.i64"),
            Instr::Gt => write!(f, "gt.i64"),
            Instr::Ge => write!(f, "ge.i64"),
            Instr::Jump(target) => write!(f, "jump {}", target),
            Instr::JumpIfFalse(target) => write!(f, "jump.false {}", target),
            Instr::Return => write!(f, "ret"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Instr::ConstInt(-3).to_string(), "const.i64 -3");
        assert_eq!(Instr::ConstStr("hi\n".into()).to_string(), r#"const.str "hi\n""#);
        assert_eq!(
            Instr::Call {
                func: "add".into(),
                argc: 2
            }
            .to_string(),
            "call @add, 2"
        );
        assert_eq!(Instr::Eq(IrType::Str).to_string(), "eq.str");
    }

    #[test]
    fn test_is_branch() {
        assert!(Instr::Jump(3).is_branch());
        assert!(Instr::JumpIfFalse(0).is_branch());
        assert!(!Instr::Return.is_branch());
    }

    #[test]
    fn test_serialize_tagged() {
        let json = serde_json::to_string(&Instr::LoadLocal(1)).unwrap();
        assert_eq!(json, r#"{"op":"load_local","arg":1}"#);
    }
}
