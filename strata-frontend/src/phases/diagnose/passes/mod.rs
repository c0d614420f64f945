//! Built-in diagnostic passes.

mod division_by_zero;
mod infinite_recursion;
mod unused_function;

pub use division_by_zero::DivisionByZeroPass;
pub use infinite_recursion::InfiniteRecursionPass;
pub use unused_function::UnusedFunctionPass;
