//! Native functions bound in the global scope.
//!
//! Each builtin declares its accepted argument count; [`Builtin::call`]
//! checks it before dispatching, so the implementations index `args`
//! directly.

use std::fmt;

use hml_ir::{Name, TypeKind};

use crate::environment::{Environment, Mutability};
use crate::errors::{arity_mismatch, assertion_failed, panic, type_mismatch, EvalError, EvalResult};
use crate::heap::Pointer;
use crate::interpreter::Interpreter;
use crate::value::{low_byte, Value};

type BuiltinFn = fn(&mut Interpreter, &[Value]) -> EvalResult;

/// A native function.
pub struct Builtin {
    pub name: &'static str,
    min_args: usize,
    max_args: usize,
    func: BuiltinFn,
}

impl Builtin {
    const fn new(name: &'static str, min_args: usize, max_args: usize, func: BuiltinFn) -> Self {
        Builtin {
            name,
            min_args,
            max_args,
            func,
        }
    }

    /// Check the argument count, then run the function.
    pub fn call(&self, interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
        let got = args.len();
        if got < self.min_args {
            return Err(arity_mismatch(self.name, self.min_args, got));
        }
        if got > self.max_args {
            return Err(arity_mismatch(self.name, self.max_args, got));
        }
        (self.func)(interpreter, args)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// Every builtin, in registration order.
pub static BUILTINS: [Builtin; 13] = [
    Builtin::new("print", 1, 1, builtin_print),
    Builtin::new("eprint", 1, 1, builtin_eprint),
    Builtin::new("typeof", 1, 1, builtin_typeof),
    Builtin::new("assert", 1, 2, builtin_assert),
    Builtin::new("panic", 0, 1, builtin_panic),
    Builtin::new("alloc", 1, 1, builtin_alloc),
    Builtin::new("talloc", 2, 2, builtin_talloc),
    Builtin::new("realloc", 2, 2, builtin_realloc),
    Builtin::new("free", 1, 1, builtin_free),
    Builtin::new("memset", 3, 3, builtin_memset),
    Builtin::new("memcpy", 3, 3, builtin_memcpy),
    Builtin::new("sizeof", 1, 1, builtin_sizeof),
    Builtin::new("buffer", 1, 1, builtin_buffer),
];

/// Bind the type names (including aliases) and the builtins as immutable
/// globals. Builtins are bound last so `buffer` names the allocator rather
/// than the type tag.
pub fn register_globals(env: &Environment) {
    for kind in TypeKind::ALL {
        env.define(Name::from(kind.name()), Value::Type(kind), Mutability::Immutable);
    }
    for (alias, kind) in TypeKind::ALIASES {
        env.define(Name::from(alias), Value::Type(kind), Mutability::Immutable);
    }
    for builtin in &BUILTINS {
        env.define(
            Name::from(builtin.name),
            Value::Builtin(builtin),
            Mutability::Immutable,
        );
    }
}

// Argument helpers

fn pointer_arg(builtin: &str, value: &Value) -> Result<Pointer, EvalError> {
    match value {
        Value::Ptr(ptr) => Ok(*ptr),
        other => Err(type_mismatch(&format!("ptr for {builtin}()"), other.type_name())),
    }
}

fn type_arg(builtin: &str, value: &Value) -> Result<TypeKind, EvalError> {
    match value {
        Value::Type(kind) => Ok(*kind),
        other => Err(type_mismatch(&format!("type for {builtin}()"), other.type_name())),
    }
}

fn int_arg(builtin: &str, value: &Value) -> Result<i64, EvalError> {
    value
        .as_i64()
        .ok_or_else(|| type_mismatch(&format!("integer for {builtin}()"), value.type_name()))
}

/// A byte count that must be at least one.
fn positive_size(builtin: &str, value: &Value) -> Result<usize, EvalError> {
    let n = int_arg(builtin, value)?;
    match usize::try_from(n) {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(EvalError::new(format!(
            "{builtin}() requires a positive size, got {n}"
        ))),
    }
}

/// A byte count that may be zero.
fn byte_count(builtin: &str, value: &Value) -> Result<usize, EvalError> {
    let n = int_arg(builtin, value)?;
    usize::try_from(n)
        .map_err(|_| EvalError::new(format!("{builtin}() requires a non-negative size, got {n}")))
}

// Output and reflection

fn builtin_print(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    interpreter.print_handler().println(&args[0].to_string());
    Ok(Value::Null)
}

fn builtin_eprint(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    eprintln!("{}", args[0]);
    Ok(Value::Null)
}

fn builtin_typeof(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(args[0].type_name()))
}

fn builtin_assert(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    if args[0].is_truthy() {
        return Ok(Value::Null);
    }
    let message = args
        .get(1)
        .map_or_else(|| "condition was false".to_string(), ToString::to_string);
    Err(assertion_failed(message))
}

fn builtin_panic(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let message = args
        .first()
        .map_or_else(|| "explicit panic".to_string(), ToString::to_string);
    Err(panic(message))
}

// Memory

fn builtin_alloc(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    let size = positive_size("alloc", &args[0])?;
    Ok(Value::Ptr(interpreter.heap_mut().alloc(size)))
}

fn builtin_talloc(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    let kind = type_arg("talloc", &args[0])?;
    let count = positive_size("talloc", &args[1])?;
    let size = kind
        .size()
        .checked_mul(count)
        .ok_or_else(|| EvalError::new(format!("talloc() of {count} {kind} overflows")))?;
    Ok(Value::Ptr(interpreter.heap_mut().alloc(size)))
}

fn builtin_realloc(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    let ptr = pointer_arg("realloc", &args[0])?;
    let size = positive_size("realloc", &args[1])?;
    interpreter.heap_mut().realloc(ptr, size).map(Value::Ptr)
}

/// Pointers release their allocation. Buffers and objects are reference
/// counted, so freeing them is accepted and does nothing.
fn builtin_free(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::Ptr(ptr) => interpreter.heap_mut().free(*ptr)?,
        Value::Buffer(_) | Value::Object(_) => {}
        other => return Err(type_mismatch("ptr, buffer or object for free()", other.type_name())),
    }
    Ok(Value::Null)
}

fn builtin_memset(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    let ptr = pointer_arg("memset", &args[0])?;
    let byte = low_byte(int_arg("memset", &args[1])?);
    let len = byte_count("memset", &args[2])?;
    interpreter.heap_mut().memset(ptr, byte, len)?;
    Ok(Value::Null)
}

fn builtin_memcpy(interpreter: &mut Interpreter, args: &[Value]) -> EvalResult {
    let dest = pointer_arg("memcpy", &args[0])?;
    let src = pointer_arg("memcpy", &args[1])?;
    let len = byte_count("memcpy", &args[2])?;
    interpreter.heap_mut().memcpy(dest, src, len)?;
    Ok(Value::Null)
}

fn builtin_sizeof(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let kind = type_arg("sizeof", &args[0])?;
    Ok(Value::I32(i32::try_from(kind.size()).unwrap_or(i32::MAX)))
}

fn builtin_buffer(_: &mut Interpreter, args: &[Value]) -> EvalResult {
    let size = positive_size("buffer", &args[0])?;
    Ok(Value::buffer(size))
}
