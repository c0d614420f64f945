//! Lowered module structure.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Instr;

/// Value types of the IR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IrType {
    I64,
    Bool,
    Str,
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::I64 => write!(f, "i64"),
            IrType::Bool => write!(f, "bool"),
            IrType::Str => write!(f, "str"),
        }
    }
}

/// A lowered compilation unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IrModule {
    /// Module name.
    pub name: String,
    /// Globals in declaration order.
    pub globals: Vec<IrGlobal>,
    /// Functions in declaration order.
    pub functions: Vec<IrFunction>,
}

/// A module global and the code computing its initial value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrGlobal {
    pub name: String,
    pub ty: IrType,
    pub init: Vec<Instr>,
}

/// A function with its parameters addressed as locals `0..params.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrFunction {
    pub name: String,
    pub params: Vec<IrType>,
    pub ret: IrType,
    pub body: Vec<Instr>,
}

impl IrModule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    /// Find a function by name.
    pub fn function(&self, name: &str) -> Option<&IrFunction> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// Find a global by name.
    pub fn global(&self, name: &str) -> Option<&IrGlobal> {
        self.globals.iter().find(|g| g.name == name)
    }

    /// Total number of instructions across globals and functions.
    pub fn instruction_count(&self) -> usize {
        self.globals.iter().map(|g| g.init.len()).sum::<usize>()
            + self.functions.iter().map(|f| f.body.len()).sum::<usize>()
    }

    /// Every instruction of the module, in order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instr> {
        self.globals
            .iter()
            .flat_map(|g| g.init.iter())
            .chain(self.functions.iter().flat_map(|f| f.body.iter()))
    }

    /// Whether any global or function calls `name`.
    pub fn is_called(&self, name: &str) -> bool {
        self.instructions().any(|i| i.callee() == Some(name))
    }
}

fn write_body(f: &mut fmt::Formatter<'_>, body: &[Instr]) -> fmt::Result {
    for (index, instr) in body.iter().enumerate() {
        writeln!(f, "    {}: {}", index, instr)?;
    }
    Ok(())
}

impl fmt::Display for IrModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module {}", self.name)?;

        for global in &self.globals {
            writeln!(f)?;
            writeln!(f, "global @{}: {} {{", global.name, global.ty)?;
            write_body(f, &global.init)?;
            writeln!(f, "}}")?;
        }

        for function in &self.functions {
            let params = function
                .params
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(f)?;
            writeln!(f, "fn @{}({}) -> {} {{", function.name, params, function.ret)?;
            write_body(f, &function.body)?;
            writeln!(f, "}}")?;
        }

        Ok(())
    }
}
