//! Unary operator implementations.

use hml_ir::{TypeKind, UnaryOp};

use crate::errors::{invalid_operand, range_error, EvalResult};
use crate::value::Value;

/// Evaluate a unary operation on an already-evaluated operand.
pub fn evaluate_unary(value: Value, op: UnaryOp) -> EvalResult {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => negate(value),
    }
}

/// Arithmetic negation.
///
/// Signed widths wrap (`-(-128i8)` stays `-128`). Unsigned widths move to
/// the next signed width that can hold the result: `u8` to `i16`, `u16`
/// and `u32` to `i32`, where a `u32` above `i32::MAX` is a range error.
fn negate(value: Value) -> EvalResult {
    match value {
        Value::I8(n) => Ok(Value::I8(n.wrapping_neg())),
        Value::I16(n) => Ok(Value::I16(n.wrapping_neg())),
        Value::I32(n) => Ok(Value::I32(n.wrapping_neg())),
        Value::U8(n) => Ok(Value::I16(-i16::from(n))),
        Value::U16(n) => Ok(Value::I32(-i32::from(n))),
        Value::U32(n) => match i32::try_from(n) {
            Ok(n) => Ok(Value::I32(-n)),
            Err(_) => Err(range_error(
                i64::from(n),
                TypeKind::I32,
                i64::from(i32::MIN),
                i64::from(i32::MAX),
            )),
        },
        Value::F32(f) => Ok(Value::F32(-f)),
        Value::F64(f) => Ok(Value::F64(-f)),
        other => Err(invalid_operand("-", other.type_name())),
    }
}
