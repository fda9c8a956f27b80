//! Expression evaluation.

use std::rc::Rc;

use hml_ir::{BinaryOp, Expr, ExprKind, Name};
use hml_stack::ensure_sufficient_stack;

use super::Interpreter;
use crate::environment::{AssignError, Environment, Mutability};
use crate::errors::{
    immutable_binding, index_out_of_bounds, type_mismatch, undefined_field, undefined_property,
    undefined_variable, EvalError, EvalResult,
};
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;
use crate::value::{low_byte, Closure, ObjectRef, Value};

impl Interpreter {
    /// Evaluate an expression. Errors carry the span of the innermost
    /// failing expression.
    pub fn eval_expr(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_expr_inner(expr, env))
            .map_err(|err| err.or_span(expr.span))
    }

    fn eval_expr_inner(&mut self, expr: &Expr, env: &Environment) -> EvalResult {
        match &expr.kind {
            ExprKind::Int(n) => Ok(Value::I32(*n)),
            ExprKind::Float(f) => Ok(Value::F64(*f)),
            ExprKind::Bool(b) => Ok(Value::Bool(*b)),
            // Each evaluation gets fresh storage; literals are never shared.
            ExprKind::Str(text) => Ok(Value::string(text.as_str())),
            ExprKind::Null => Ok(Value::Null),
            ExprKind::Ident(name) => env.get(name).ok_or_else(|| undefined_variable(name)),

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand, env)?;
                evaluate_unary(value, *op)
            }
            ExprKind::Binary {
                op: BinaryOp::And,
                left,
                right,
            } => {
                let result =
                    self.eval_expr(left, env)?.is_truthy() && self.eval_expr(right, env)?.is_truthy();
                Ok(Value::Bool(result))
            }
            ExprKind::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => {
                let result =
                    self.eval_expr(left, env)?.is_truthy() || self.eval_expr(right, env)?.is_truthy();
                Ok(Value::Bool(result))
            }
            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left, env)?;
                let right = self.eval_expr(right, env)?;
                evaluate_binary(left, right, *op)
            }

            ExprKind::Assign { name, value } => {
                let value = self.eval_expr(value, env)?;
                assign_variable(env, name, value.clone())?;
                Ok(value)
            }
            ExprKind::Call { callee, args } => self.eval_call(callee, args, env),

            ExprKind::GetProperty { object, property } => {
                let object = self.eval_expr(object, env)?;
                get_property(&object, property)
            }
            ExprKind::SetProperty {
                object,
                property,
                op,
                value,
            } => {
                let object = self.eval_expr(object, env)?;
                let mut value = self.eval_expr(value, env)?;
                if let Some(op) = op {
                    value = evaluate_binary(get_property(&object, property)?, value, *op)?;
                }
                set_property(&object, property, value.clone())?;
                Ok(value)
            }
            ExprKind::Index { object, index } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                index_get(&object, &index)
            }
            ExprKind::IndexAssign {
                object,
                index,
                op,
                value,
            } => {
                let object = self.eval_expr(object, env)?;
                let index = self.eval_expr(index, env)?;
                let mut value = self.eval_expr(value, env)?;
                if let Some(op) = op {
                    value = evaluate_binary(index_get(&object, &index)?, value, *op)?;
                }
                index_set(&object, &index, value.clone())?;
                Ok(value)
            }

            ExprKind::Object(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    values.push((name.clone(), self.eval_expr(value, env)?));
                }
                Ok(Value::Object(ObjectRef::new(values)))
            }
            ExprKind::Function(def) => Ok(Value::Function(Rc::new(Closure {
                def: Rc::clone(def),
                env: env.clone(),
            }))),
            // Evaluation is synchronous; awaiting yields the operand itself.
            ExprKind::Await(operand) => self.eval_expr(operand, env),
        }
    }

    /// Evaluate a call. A property-access callee is a method call: the
    /// object is evaluated once and bound as `self` in the callee's frame.
    fn eval_call(&mut self, callee: &Expr, args: &[Expr], env: &Environment) -> EvalResult {
        let (function, receiver) = match &callee.kind {
            ExprKind::GetProperty { object, property } => {
                let object = self.eval_expr(object, env)?;
                let function =
                    get_property(&object, property).map_err(|err| err.or_span(callee.span))?;
                (function, Some(object))
            }
            _ => (self.eval_expr(callee, env)?, None),
        };

        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg, env)?);
        }
        self.call_value(&function, values, receiver)
    }
}

/// Plain assignment: overwrite the nearest binding, or define a new
/// mutable one in the current scope.
fn assign_variable(env: &Environment, name: &Name, value: Value) -> Result<(), EvalError> {
    match env.assign(name, value.clone()) {
        Ok(()) => Ok(()),
        Err(AssignError::Undefined) => {
            env.define(name.clone(), value, Mutability::Mutable);
            Ok(())
        }
        Err(AssignError::Immutable) => Err(immutable_binding(name)),
    }
}

fn length_value(len: usize) -> Value {
    Value::I32(i32::try_from(len).unwrap_or(i32::MAX))
}

/// Objects expose their fields; strings expose `length`; buffers expose
/// `length` and `capacity`.
fn get_property(object: &Value, property: &str) -> EvalResult {
    match object {
        Value::Object(obj) => obj.get(property).ok_or_else(|| undefined_field(property)),
        Value::Str(bytes) if property == "length" => Ok(length_value(bytes.len())),
        Value::Buffer(bytes) if property == "length" || property == "capacity" => {
            Ok(length_value(bytes.len()))
        }
        other => Err(undefined_property(property, other.type_name())),
    }
}

/// Only objects accept property writes; unknown fields are appended.
fn set_property(object: &Value, property: &Name, value: Value) -> Result<(), EvalError> {
    match object {
        Value::Object(obj) => {
            obj.set(property.clone(), value);
            Ok(())
        }
        other => Err(EvalError::new(format!(
            "cannot set property '{property}' on {}",
            other.type_name()
        ))),
    }
}

fn byte_index(index: &Value, len: usize) -> Result<usize, EvalError> {
    let Some(i) = index.as_i64() else {
        return Err(type_mismatch("integer index", index.type_name()));
    };
    usize::try_from(i)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| index_out_of_bounds(i, len))
}

/// `s[i]` and `buf[i]` read one byte; `obj["key"]` reads a field and
/// yields `null` when it is missing.
fn index_get(object: &Value, index: &Value) -> EvalResult {
    match (object, index) {
        (Value::Object(obj), Value::Str(key)) => {
            Ok(obj.get(&key.to_string_lossy()).unwrap_or(Value::Null))
        }
        (Value::Str(bytes) | Value::Buffer(bytes), _) => {
            let i = byte_index(index, bytes.len())?;
            Ok(Value::U8(bytes.borrow()[i]))
        }
        (other, _) => Err(type_mismatch(
            "string, buffer or object",
            other.type_name(),
        )),
    }
}

/// Byte writes go to the shared storage, so every alias observes them.
fn index_set(object: &Value, index: &Value, value: Value) -> Result<(), EvalError> {
    match (object, index) {
        (Value::Object(obj), Value::Str(key)) => {
            obj.set(Name::from(key.to_string_lossy()), value);
            Ok(())
        }
        (Value::Str(bytes) | Value::Buffer(bytes), _) => {
            let i = byte_index(index, bytes.len())?;
            let Some(byte) = value.as_i64() else {
                return Err(type_mismatch("integer byte value", value.type_name()));
            };
            bytes.borrow_mut()[i] = low_byte(byte);
            Ok(())
        }
        (other, _) => Err(type_mismatch(
            "string, buffer or object",
            other.type_name(),
        )),
    }
}
