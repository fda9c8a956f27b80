//! Function calls.

use std::rc::Rc;

use super::{Flow, Interpreter};
use crate::environment::Mutability;
use crate::errors::{arity_mismatch, missing_return, not_callable, stack_overflow, EvalResult};
use crate::value::numeric::convert_to_type;
use crate::value::{Closure, Value};

impl Interpreter {
    /// Call a builtin or a closure. `receiver` is the object of a method
    /// call and is bound as `self` inside a closure's frame.
    pub fn call_value(
        &mut self,
        callee: &Value,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> EvalResult {
        match callee {
            Value::Builtin(builtin) => builtin.call(self, &args),
            Value::Function(closure) => self.call_closure(closure, args, receiver),
            other => Err(not_callable(other.type_name())),
        }
    }

    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(arity = args.len(), depth = self.call_depth)
    )]
    fn call_closure(
        &mut self,
        closure: &Rc<Closure>,
        args: Vec<Value>,
        receiver: Option<Value>,
    ) -> EvalResult {
        let def = &closure.def;
        if args.len() != def.params.len() {
            return Err(arity_mismatch("", def.params.len(), args.len()));
        }
        if self.call_depth >= self.max_call_depth {
            return Err(stack_overflow(self.max_call_depth));
        }

        let frame = closure.env.child();
        if let Some(receiver) = receiver {
            frame.define("self".into(), receiver, Mutability::Mutable);
        }
        for (param, arg) in def.params.iter().zip(args) {
            let arg = match param.ty {
                Some(ty) => convert_to_type(arg, ty)?,
                None => arg,
            };
            frame.define(param.name.clone(), arg, Mutability::Mutable);
        }

        self.call_depth += 1;
        let flow = self.exec_block(&def.body, &frame);
        self.call_depth -= 1;

        let result = match flow? {
            Flow::Return(value) => Some(value),
            Flow::Normal(_) => None,
            Flow::Break | Flow::Continue => {
                return Err(super::loop_control_outside_loop());
            }
        };

        match (def.return_type, result) {
            (Some(ty), Some(value)) => convert_to_type(value, ty),
            (Some(ty), None) => Err(missing_return(ty)),
            (None, value) => Ok(value.unwrap_or(Value::Null)),
        }
    }
}
