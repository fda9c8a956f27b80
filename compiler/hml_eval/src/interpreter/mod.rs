//! Tree-walking interpreter.
//!
//! Statements produce a [`Flow`] instead of setting a shared "returning"
//! flag: `return`, `break` and `continue` travel outward as ordinary
//! return values, loops consume `Break`/`Continue`, and the call boundary
//! is the only place a `Return` is turned back into a value.

mod call;
mod expr;
mod stmt;

use std::ops::ControlFlow;

use hml_ir::Stmt;

use crate::builtins::register_globals;
use crate::environment::Environment;
use crate::errors::EvalError;
use crate::heap::Heap;
use crate::print_handler::{stdout_handler, SharedPrintHandler};
use crate::value::Value;

/// Default limit on nested user-function calls.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

/// Outcome of executing a statement.
#[derive(Clone, Debug, PartialEq)]
pub enum Flow {
    /// Completed normally; carries an expression statement's value.
    Normal(Value),
    /// A `return` is unwinding to the nearest call.
    Return(Value),
    /// A `break` is unwinding to the nearest loop.
    Break,
    /// A `continue` is unwinding to the nearest loop.
    Continue,
}

/// Interpreter state: the global scope, the managed heap, the output
/// destination and the call-depth counter.
pub struct Interpreter {
    global: Environment,
    heap: Heap,
    print_handler: SharedPrintHandler,
    call_depth: usize,
    max_call_depth: usize,
}

impl Interpreter {
    /// An interpreter printing to stdout.
    pub fn new() -> Self {
        Self::with_print_handler(stdout_handler())
    }

    /// An interpreter printing through `handler`.
    pub fn with_print_handler(handler: SharedPrintHandler) -> Self {
        let global = Environment::new();
        register_globals(&global);
        Interpreter {
            global,
            heap: Heap::new(),
            print_handler: handler,
            call_depth: 0,
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }

    /// Override the recursion limit.
    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// The scope holding builtins and type names. Module scopes use it as
    /// their parent.
    pub fn global_env(&self) -> &Environment {
        &self.global
    }

    pub fn print_handler(&self) -> &SharedPrintHandler {
        &self.print_handler
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    pub fn max_call_depth(&self) -> usize {
        self.max_call_depth
    }

    /// Run top-level statements in `env`. A top-level `return` ends the
    /// program early; a stray `break` or `continue` is an error.
    pub fn exec_program(&mut self, program: &[Stmt], env: &Environment) -> Result<(), EvalError> {
        for stmt in program {
            if self.exec_top_level(stmt, env)?.is_break() {
                break;
            }
        }
        Ok(())
    }

    /// Run one top-level statement. `Break` means a `return` asked the
    /// enclosing program or module to stop.
    pub fn exec_top_level(
        &mut self,
        stmt: &Stmt,
        env: &Environment,
    ) -> Result<ControlFlow<()>, EvalError> {
        match self.exec_stmt(stmt, env)? {
            Flow::Normal(_) => Ok(ControlFlow::Continue(())),
            Flow::Return(_) => Ok(ControlFlow::Break(())),
            Flow::Break | Flow::Continue => Err(loop_control_outside_loop().with_span(stmt.span)),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

#[cold]
fn loop_control_outside_loop() -> EvalError {
    EvalError::new("break or continue outside of a loop")
}
