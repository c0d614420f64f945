//! Syntax of the Strata reference language.
//!
//! ```text
//! source text → lexer (tokens) → parser (SourceUnit) → strata-frontend
//! ```
//!
//! A source unit is a list of `let` and `fn` declarations, each terminated by
//! a semicolon.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod ast;
mod error;
mod lexer;
mod parser;
mod token;

pub use ast::{
    BinaryOp, Expr, ExprKind, FnDecl, Ident, Item, LetDecl, Param, SourceUnit, TypeExpr, UnaryOp,
};
pub use error::{Error, Result, SourceContext};
pub use lexer::tokenize;
pub use parser::{MAX_NESTING, parse_str};
pub use token::{Span, Token, TokenKind};
