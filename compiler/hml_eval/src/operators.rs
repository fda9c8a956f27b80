//! Binary operator implementations.
//!
//! `&&`/`||` short-circuit in the interpreter before reaching this module.
//! Everything else arrives here with both operands evaluated.

use hml_ir::BinaryOp;

use crate::errors::{division_by_zero, invalid_operand, modulo_by_zero, EvalResult};
use crate::value::numeric::{cast, promote, NumericType};
use crate::value::{SharedBytes, Value};

/// Evaluate a binary operation.
///
/// - `ptr + int`, `int + ptr` and `ptr - int` move the pointer offset.
/// - `+` concatenates when either side is a string and the other is a
///   string, number or bool.
/// - `==`/`!=` never fail; see [`values_equal`].
/// - Remaining operators need two numbers, promoted to a common type.
pub fn evaluate_binary(left: Value, right: Value, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Eq => return Ok(Value::Bool(values_equal(&left, &right))),
        BinaryOp::NotEq => return Ok(Value::Bool(!values_equal(&left, &right))),
        BinaryOp::And => return Ok(Value::Bool(left.is_truthy() && right.is_truthy())),
        BinaryOp::Or => return Ok(Value::Bool(left.is_truthy() || right.is_truthy())),
        _ => {}
    }

    if let Some(result) = pointer_arithmetic(&left, &right, op) {
        return Ok(result);
    }
    if op == BinaryOp::Add {
        if let Some(result) = concatenate(&left, &right) {
            return Ok(result);
        }
    }

    let Some(ty) = promote(&left, &right) else {
        return Err(invalid_operand(
            op.as_symbol(),
            format!("{} and {}", left.type_name(), right.type_name()),
        ));
    };
    if ty.is_float() {
        float_binary(ty, &left, &right, op)
    } else {
        integer_binary(ty, &left, &right, op)
    }
}

/// `==` semantics: numbers compare after promotion; strings and booleans
/// by content; objects, buffers and functions by identity; a null pointer
/// equals `null`; any other mix of kinds is unequal.
#[allow(clippy::float_cmp, reason = "numeric equality is exact")]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match promote(left, right) {
        Some(ty) if ty.is_float() => promoted_float(left, ty) == promoted_float(right, ty),
        Some(ty) => promoted_int(left, ty) == promoted_int(right, ty),
        None => left == right,
    }
}

fn pointer_arithmetic(left: &Value, right: &Value, op: BinaryOp) -> Option<Value> {
    match (left, right, op) {
        (Value::Ptr(ptr), offset, BinaryOp::Add) | (offset, Value::Ptr(ptr), BinaryOp::Add) => {
            Some(Value::Ptr(ptr.offset_by(offset.as_i64()?)))
        }
        (Value::Ptr(ptr), offset, BinaryOp::Sub) => {
            Some(Value::Ptr(ptr.offset_by(offset.as_i64()?.wrapping_neg())))
        }
        _ => None,
    }
}

fn concatenate(left: &Value, right: &Value) -> Option<Value> {
    let printable = |v: &Value| v.is_numeric() || matches!(v, Value::Bool(_) | Value::Str(_));
    if !matches!((left, right), (Value::Str(_), _) | (_, Value::Str(_)))
        || !printable(left)
        || !printable(right)
    {
        return None;
    }
    let mut bytes = text_bytes(left);
    bytes.extend_from_slice(&text_bytes(right));
    Some(Value::Str(SharedBytes::new(bytes)))
}

fn text_bytes(value: &Value) -> Vec<u8> {
    match value {
        Value::Str(s) => s.borrow().clone(),
        other => other.to_string().into_bytes(),
    }
}

fn promoted_int(value: &Value, ty: NumericType) -> i64 {
    cast(value, ty).and_then(|v| v.as_i64()).unwrap_or(0)
}

/// The operand as `ty` would hold it, widened back to f64 for the
/// arithmetic. For `f32` the result is rounded again on the way out.
fn promoted_float(value: &Value, ty: NumericType) -> f64 {
    cast(value, ty).and_then(|v| v.as_f64()).unwrap_or(0.0)
}

fn integer_binary(ty: NumericType, left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    let l = promoted_int(left, ty);
    let r = promoted_int(right, ty);
    let result = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div => {
            if r == 0 {
                return Err(division_by_zero());
            }
            l.wrapping_div(r)
        }
        BinaryOp::Mod => {
            if r == 0 {
                return Err(modulo_by_zero());
            }
            l.wrapping_rem(r)
        }
        BinaryOp::Lt => return Ok(Value::Bool(l < r)),
        BinaryOp::LtEq => return Ok(Value::Bool(l <= r)),
        BinaryOp::Gt => return Ok(Value::Bool(l > r)),
        BinaryOp::GtEq => return Ok(Value::Bool(l >= r)),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            return Err(invalid_operand(op.as_symbol(), ty.type_kind().name()));
        }
    };
    Ok(ty.from_i64(result))
}

fn float_binary(ty: NumericType, left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    let l = promoted_float(left, ty);
    let r = promoted_float(right, ty);
    let result = match op {
        BinaryOp::Add => l + r,
        BinaryOp::Sub => l - r,
        BinaryOp::Mul => l * r,
        BinaryOp::Div => {
            if r == 0.0 {
                return Err(division_by_zero());
            }
            l / r
        }
        BinaryOp::Mod => {
            if r == 0.0 {
                return Err(modulo_by_zero());
            }
            l % r
        }
        BinaryOp::Lt => return Ok(Value::Bool(l < r)),
        BinaryOp::LtEq => return Ok(Value::Bool(l <= r)),
        BinaryOp::Gt => return Ok(Value::Bool(l > r)),
        BinaryOp::GtEq => return Ok(Value::Bool(l >= r)),
        BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::And | BinaryOp::Or => {
            return Err(invalid_operand(op.as_symbol(), ty.type_kind().name()));
        }
    };
    Ok(ty.from_f64(result))
}
