//! Syntax tree for Hemlock programs.
//!
//! The tree is boxed rather than arena-allocated: function bodies are
//! shared through `Rc<FunctionDef>` so a closure value can keep its body
//! alive after the module that declared it has finished executing.

mod operators;

use std::rc::Rc;

pub use operators::{BinaryOp, UnaryOp};

use crate::{Name, Span, TypeKind};

/// An expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

/// Expression variants.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// Integer literal (`42`). Always 32-bit signed.
    Int(i32),
    /// Float literal (`1.5`, `1e3`). Always 64-bit.
    Float(f64),
    Bool(bool),
    Str(String),
    Null,
    Ident(Name),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `name = value`
    Assign {
        name: Name,
        value: Box<Expr>,
    },
    /// `callee(args...)`; a `GetProperty` callee is a method call.
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `object.property`
    GetProperty {
        object: Box<Expr>,
        property: Name,
    },
    /// `object.property = value`, or `object.property op= value` when
    /// `op` is set. The object is evaluated once either way.
    SetProperty {
        object: Box<Expr>,
        property: Name,
        op: Option<BinaryOp>,
        value: Box<Expr>,
    },
    /// `object[index]`
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
    },
    /// `object[index] = value`, or `object[index] op= value` when `op`
    /// is set. Object and index are evaluated once either way.
    IndexAssign {
        object: Box<Expr>,
        index: Box<Expr>,
        op: Option<BinaryOp>,
        value: Box<Expr>,
    },
    /// `{ a: 1, b: 2 }`, fields in source order.
    Object(Vec<(Name, Expr)>),
    /// `fn(params) { body }`
    Function(Rc<FunctionDef>),
    /// `await expr`
    Await(Box<Expr>),
}

/// A function literal: parameters, optional return annotation and body.
#[derive(Debug, PartialEq)]
pub struct FunctionDef {
    pub params: Vec<Param>,
    pub return_type: Option<TypeKind>,
    pub body: Vec<Stmt>,
    pub is_async: bool,
    pub span: Span,
}

/// A function parameter with an optional declared type.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub ty: Option<TypeKind>,
}

/// A statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement variants.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// `let name[: ty] = value;`
    Let {
        name: Name,
        ty: Option<TypeKind>,
        value: Expr,
    },
    /// `const name[: ty] = value;`
    Const {
        name: Name,
        ty: Option<TypeKind>,
        value: Expr,
    },
    Expr(Expr),
    If {
        cond: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },
    While {
        cond: Expr,
        body: Box<Stmt>,
    },
    /// C-style `for (init; cond; step) body`. Every clause is optional.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Box<Stmt>,
    },
    Break,
    Continue,
    Block(Vec<Stmt>),
    Return(Option<Expr>),
    Import {
        kind: ImportKind,
        path: String,
    },
    Export(ExportKind),
}

/// `name` or `name as alias` in an import or export list.
#[derive(Clone, Debug, PartialEq)]
pub struct BindingSpec {
    pub name: Name,
    pub alias: Option<Name>,
}

impl BindingSpec {
    /// The name the binding is visible under after the import/export.
    pub fn local_name(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.name)
    }
}

/// What an `import` statement binds.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportKind {
    /// `import { a, b as c } from "..."`
    Named(Vec<BindingSpec>),
    /// `import * as ns from "..."`
    Namespace(Name),
}

/// The forms an `export` statement can take.
#[derive(Clone, Debug, PartialEq)]
pub enum ExportKind {
    /// `export let/const/fn ...`
    Declaration(Box<Stmt>),
    /// `export { a, b as c };`
    List(Vec<BindingSpec>),
    /// `export { a, b as c } from "...";`
    Reexport { specs: Vec<BindingSpec>, path: String },
}

impl Stmt {
    /// The module path this statement depends on, if it is an import or
    /// a re-export.
    pub fn dependency_path(&self) -> Option<&str> {
        match &self.kind {
            StmtKind::Import { path, .. }
            | StmtKind::Export(ExportKind::Reexport { path, .. }) => Some(path),
            _ => None,
        }
    }

    /// Name bound by a declaration statement (`let`/`const`).
    pub fn declared_name(&self) -> Option<&Name> {
        match &self.kind {
            StmtKind::Let { name, .. } | StmtKind::Const { name, .. } => Some(name),
            _ => None,
        }
    }
}
