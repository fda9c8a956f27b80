//! Hemlock IR - syntax tree and shared vocabulary types.
//!
//! This crate contains the data structures shared between the parser,
//! the evaluator and the module loader:
//! - Spans for source locations
//! - AST nodes (`Expr`, `Stmt`, `FunctionDef`)
//! - Operators
//! - `TypeKind`, the scalar type tags used by annotations and `sizeof`
//!
//! Identifiers are stored as [`Name`] (`Rc<str>`) so environments and
//! closures can hold them without copying the text.

pub mod ast;
mod span;
mod type_kind;

pub use ast::{
    BinaryOp, BindingSpec, ExportKind, Expr, ExprKind, FunctionDef, ImportKind, Param, Stmt,
    StmtKind, UnaryOp,
};
pub use span::{line_col, Span};
pub use type_kind::TypeKind;

/// Identifier text shared between AST nodes and runtime bindings.
pub type Name = std::rc::Rc<str>;
