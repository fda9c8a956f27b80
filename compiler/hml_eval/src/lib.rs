//! Hemlock Eval - tree-walking evaluator for Hemlock programs.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `Environment`: lexical scopes as a parent-linked chain
//! - `Value`: typed scalars plus shared strings, buffers and objects
//! - `Heap`: checked allocations behind raw `ptr` values
//! - `evaluate_binary` / `evaluate_unary`: enum-based operator dispatch
//! - `BUILTINS`: native functions bound in the global scope
//! - `Flow`: `return`/`break`/`continue` propagated as values
//!
//! Module loading lives in `hmlc`; this crate runs one statement list at
//! a time in whatever environment it is handed.

mod builtins;
mod environment;
pub mod errors;
pub mod heap;
mod interpreter;
mod operators;
mod print_handler;
mod unary_operators;
pub mod value;

pub use builtins::{Builtin, BUILTINS};
pub use environment::{AssignError, Environment, LocalScope, Mutability};
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use heap::{Heap, Pointer};
pub use interpreter::{Flow, Interpreter, DEFAULT_MAX_CALL_DEPTH};
pub use operators::{evaluate_binary, values_equal};
pub use print_handler::{
    buffer_handler, silent_handler, stdout_handler, PrintHandlerImpl, SharedPrintHandler,
};
pub use unary_operators::evaluate_unary;
pub use value::{Closure, ObjectRef, SharedBytes, Value};

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
