//! Statement execution.
//!
//! Blocks, `if` and loops run in the environment they were given; only
//! calls and modules open new scopes, so bindings made inside a loop body
//! stay visible after it.

use hml_ir::{Expr, ExportKind, Name, Stmt, StmtKind, TypeKind};
use hml_stack::ensure_sufficient_stack;

use super::{Flow, Interpreter};
use crate::environment::{Environment, Mutability};
use crate::errors::EvalError;
use crate::value::numeric::convert_to_type;
use crate::value::Value;

impl Interpreter {
    /// Execute one statement.
    pub fn exec_stmt(&mut self, stmt: &Stmt, env: &Environment) -> Result<Flow, EvalError> {
        ensure_sufficient_stack(|| self.exec_stmt_inner(stmt, env))
            .map_err(|err| err.or_span(stmt.span))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt, env: &Environment) -> Result<Flow, EvalError> {
        match &stmt.kind {
            StmtKind::Let { name, ty, value } => {
                self.exec_binding(name, *ty, value, env, Mutability::Mutable)
            }
            StmtKind::Const { name, ty, value } => {
                self.exec_binding(name, *ty, value, env, Mutability::Immutable)
            }
            StmtKind::Expr(expr) => Ok(Flow::Normal(self.eval_expr(expr, env)?)),
            StmtKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond, env)?.is_truthy() {
                    self.exec_stmt(then_branch, env)
                } else if let Some(else_branch) = else_branch {
                    self.exec_stmt(else_branch, env)
                } else {
                    Ok(Flow::Normal(Value::Null))
                }
            }
            StmtKind::While { cond, body } => self.exec_loop(Some(cond), None, body, env),
            StmtKind::For {
                init,
                cond,
                step,
                body,
            } => {
                if let Some(init) = init {
                    self.exec_stmt(init, env)?;
                }
                self.exec_loop(cond.as_ref(), step.as_ref(), body, env)
            }
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),
            StmtKind::Block(stmts) => self.exec_block(stmts, env),
            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            StmtKind::Export(ExportKind::Declaration(decl)) => self.exec_stmt(decl, env),
            StmtKind::Import { .. } | StmtKind::Export(_) => Err(EvalError::new(
                "import and export lists are only valid at the top level of a module",
            )),
        }
    }

    fn exec_binding(
        &mut self,
        name: &Name,
        ty: Option<TypeKind>,
        value: &Expr,
        env: &Environment,
        mutability: Mutability,
    ) -> Result<Flow, EvalError> {
        let mut value = self.eval_expr(value, env)?;
        if let Some(ty) = ty {
            value = convert_to_type(value, ty)?;
        }
        env.define(name.clone(), value, mutability);
        Ok(Flow::Normal(Value::Null))
    }

    /// Shared by `while` and `for`. `continue` still runs the step.
    fn exec_loop(
        &mut self,
        cond: Option<&Expr>,
        step: Option<&Expr>,
        body: &Stmt,
        env: &Environment,
    ) -> Result<Flow, EvalError> {
        loop {
            if let Some(cond) = cond {
                if !self.eval_expr(cond, env)?.is_truthy() {
                    break;
                }
            }
            match self.exec_stmt(body, env)? {
                Flow::Break => break,
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Normal(_) | Flow::Continue => {}
            }
            if let Some(step) = step {
                self.eval_expr(step, env)?;
            }
        }
        Ok(Flow::Normal(Value::Null))
    }

    /// Run statements in order, stopping at the first non-normal outcome.
    pub(crate) fn exec_block(&mut self, stmts: &[Stmt], env: &Environment) -> Result<Flow, EvalError> {
        for stmt in stmts {
            match self.exec_stmt(stmt, env)? {
                Flow::Normal(_) => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal(Value::Null))
    }
}
