//! Numeric promotion and narrowing conversion.
//!
//! Binary arithmetic promotes both operands to the higher-ranked of their
//! two types, where the rank order is
//! `i8 < u8 < i16 < u16 < i32 < u32 < f32 < f64`. Promotion is a plain
//! C-style cast: integers wrap into the target width.
//!
//! Narrowing (`convert_to_type`) is the checked conversion applied by type
//! annotations on `let`/`const`, parameters and return values.

use hml_ir::TypeKind;

use crate::errors::{conversion_error, range_error, EvalResult};
use crate::value::Value;

/// The eight numeric value kinds, declared in promotion-rank order.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NumericType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
}

impl NumericType {
    pub const ALL: [NumericType; 8] = [
        NumericType::I8,
        NumericType::U8,
        NumericType::I16,
        NumericType::U16,
        NumericType::I32,
        NumericType::U32,
        NumericType::F32,
        NumericType::F64,
    ];

    /// The numeric kind of a value, or `None` for non-numbers.
    pub fn of(value: &Value) -> Option<NumericType> {
        match value {
            Value::I8(_) => Some(NumericType::I8),
            Value::U8(_) => Some(NumericType::U8),
            Value::I16(_) => Some(NumericType::I16),
            Value::U16(_) => Some(NumericType::U16),
            Value::I32(_) => Some(NumericType::I32),
            Value::U32(_) => Some(NumericType::U32),
            Value::F32(_) => Some(NumericType::F32),
            Value::F64(_) => Some(NumericType::F64),
            _ => None,
        }
    }

    pub fn from_type_kind(kind: TypeKind) -> Option<NumericType> {
        match kind {
            TypeKind::I8 => Some(NumericType::I8),
            TypeKind::U8 => Some(NumericType::U8),
            TypeKind::I16 => Some(NumericType::I16),
            TypeKind::U16 => Some(NumericType::U16),
            TypeKind::I32 => Some(NumericType::I32),
            TypeKind::U32 => Some(NumericType::U32),
            TypeKind::F32 => Some(NumericType::F32),
            TypeKind::F64 => Some(NumericType::F64),
            _ => None,
        }
    }

    pub fn type_kind(self) -> TypeKind {
        match self {
            NumericType::I8 => TypeKind::I8,
            NumericType::U8 => TypeKind::U8,
            NumericType::I16 => TypeKind::I16,
            NumericType::U16 => TypeKind::U16,
            NumericType::I32 => TypeKind::I32,
            NumericType::U32 => TypeKind::U32,
            NumericType::F32 => TypeKind::F32,
            NumericType::F64 => TypeKind::F64,
        }
    }

    /// Position in the promotion order.
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn is_float(self) -> bool {
        matches!(self, NumericType::F32 | NumericType::F64)
    }

    /// The common type of a binary operation.
    #[must_use]
    pub fn promote(self, other: NumericType) -> NumericType {
        self.max(other)
    }

    /// Inclusive bounds of an integer kind.
    pub fn integer_range(self) -> Option<(i64, i64)> {
        match self {
            NumericType::I8 => Some((i8::MIN.into(), i8::MAX.into())),
            NumericType::U8 => Some((0, u8::MAX.into())),
            NumericType::I16 => Some((i16::MIN.into(), i16::MAX.into())),
            NumericType::U16 => Some((0, u16::MAX.into())),
            NumericType::I32 => Some((i32::MIN.into(), i32::MAX.into())),
            NumericType::U32 => Some((0, u32::MAX.into())),
            NumericType::F32 | NumericType::F64 => None,
        }
    }

    /// Convert an integer to this kind, wrapping into integer widths.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss,
        reason = "wrapping conversion is the defined promotion behavior"
    )]
    pub fn from_i64(self, n: i64) -> Value {
        match self {
            NumericType::I8 => Value::I8(n as i8),
            NumericType::U8 => Value::U8(n as u8),
            NumericType::I16 => Value::I16(n as i16),
            NumericType::U16 => Value::U16(n as u16),
            NumericType::I32 => Value::I32(n as i32),
            NumericType::U32 => Value::U32(n as u32),
            NumericType::F32 => Value::F32(n as f32),
            NumericType::F64 => Value::F64(n as f64),
        }
    }

    /// Convert a float to this kind; integer kinds truncate then wrap.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "float to integer truncates like a C cast"
    )]
    pub fn from_f64(self, f: f64) -> Value {
        match self {
            NumericType::F32 => Value::F32(f as f32),
            NumericType::F64 => Value::F64(f),
            _ => self.from_i64(f as i64),
        }
    }
}

/// Promoted type of two operands, if both are numeric.
pub fn promote(left: &Value, right: &Value) -> Option<NumericType> {
    Some(NumericType::of(left)?.promote(NumericType::of(right)?))
}

/// Cast a numeric value to `ty` without range checks.
pub fn cast(value: &Value, ty: NumericType) -> Option<Value> {
    if let Some(n) = value.as_i64() {
        return Some(ty.from_i64(n));
    }
    match *value {
        Value::F32(f) => Some(ty.from_f64(f64::from(f))),
        Value::F64(f) => Some(ty.from_f64(f)),
        _ => None,
    }
}

/// Checked conversion of `value` to the declared type `target`.
///
/// Integer targets range-check the source (floats truncate toward zero
/// first; booleans count as 0/1). Float targets accept any number or
/// boolean. `bool`, `string`, `ptr` and `buffer` only accept their own kind.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    reason = "truncation happens after the range check against exact bounds"
)]
pub fn convert_to_type(value: Value, target: TypeKind) -> EvalResult {
    if let Some(ty) = NumericType::from_type_kind(target) {
        if let Some((min, max)) = ty.integer_range() {
            let n = match &value {
                Value::Bool(b) => i64::from(*b),
                Value::F32(_) | Value::F64(_) => {
                    let truncated = value.as_f64().unwrap_or(0.0).trunc();
                    if !(truncated >= min as f64 && truncated <= max as f64) {
                        return Err(range_error(truncated as i64, target, min, max));
                    }
                    truncated as i64
                }
                other => match other.as_i64() {
                    Some(n) => n,
                    None => return Err(conversion_error(other.type_name(), target)),
                },
            };
            if n < min || n > max {
                return Err(range_error(n, target, min, max));
            }
            return Ok(ty.from_i64(n));
        }

        return match &value {
            Value::Bool(b) => Ok(ty.from_i64(i64::from(*b))),
            other => match other.as_f64() {
                Some(f) => Ok(ty.from_f64(f)),
                None => Err(conversion_error(other.type_name(), target)),
            },
        };
    }

    let accepted = match target {
        TypeKind::Bool => matches!(value, Value::Bool(_)),
        TypeKind::String => matches!(value, Value::Str(_)),
        TypeKind::Ptr => matches!(value, Value::Ptr(_)),
        TypeKind::Buffer => matches!(value, Value::Buffer(_)),
        _ => false,
    };
    if accepted {
        Ok(value)
    } else {
        Err(conversion_error(value.type_name(), target))
    }
}
