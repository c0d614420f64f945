//! Semantic types, interned in the compilation context.

use std::fmt::Write as _;

use indexmap::IndexSet;
use serde::Serialize;
use strata_ir::IrType;

/// Handle to a type interned in a [`TypeTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Type {
    Int,
    Bool,
    Str,
    Function { params: Vec<TypeId>, ret: TypeId },
}

/// Interning table; each distinct type is stored once.
#[derive(Debug, Clone)]
pub struct TypeTable {
    types: IndexSet<Type>,
}

impl TypeTable {
    pub const INT: TypeId = TypeId(0);
    pub const BOOL: TypeId = TypeId(1);
    pub const STR: TypeId = TypeId(2);

    pub fn new() -> Self {
        let mut types = IndexSet::new();
        types.insert(Type::Int);
        types.insert(Type::Bool);
        types.insert(Type::Str);
        Self { types }
    }

    /// Intern a type, returning the id of the existing entry when present.
    pub fn intern(&mut self, ty: Type) -> TypeId {
        let (index, _) = self.types.insert_full(ty);
        TypeId(index as u32)
    }

    pub fn get(&self, id: TypeId) -> &Type {
        &self.types[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a type as written in source.
    pub fn resolve_name(name: &str) -> Option<TypeId> {
        match name {
            "int" => Some(Self::INT),
            "bool" => Some(Self::BOOL),
            "string" => Some(Self::STR),
            _ => None,
        }
    }

    /// The IR value type of `id`. Function types have none.
    pub fn ir_type(&self, id: TypeId) -> Option<IrType> {
        match self.get(id) {
            Type::Int => Some(IrType::I64),
            Type::Bool => Some(IrType::Bool),
            Type::Str => Some(IrType::Str),
            Type::Function { .. } => None,
        }
    }

    /// Render a type the way it is written in source, e.g. `fn(int, bool) -> string`.
    pub fn display(&self, id: TypeId) -> String {
        match self.get(id) {
            Type::Int => "int".to_string(),
            Type::Bool => "bool".to_string(),
            Type::Str => "string".to_string(),
            Type::Function { params, ret } => {
                let mut out = String::from("fn(");
                for (i, param) in params.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&self.display(*param));
                }
                let _ = write!(out, ") -> {}", self.display(*ret));
                out
            }
        }
    }
}

impl Default for TypeTable {
    fn default() -> Self {
        Self::new()
    }
}
