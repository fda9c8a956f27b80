//! Runtime values.
//!
//! `Value` is a closed tagged union. Cloning a value is cheap: scalars are
//! copied, while strings, buffers, objects and functions clone a reference
//! to shared storage. Two values can therefore alias the same bytes, and an
//! indexed write through one is visible through the other.

mod format;
pub mod numeric;

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use hml_ir::{FunctionDef, Name, TypeKind};

use crate::builtins::Builtin;
use crate::environment::Environment;
use crate::heap::Pointer;

pub use format::format_float;

/// Shared, mutable byte storage backing strings and buffers.
#[derive(Clone, Debug)]
pub struct SharedBytes(Rc<RefCell<Vec<u8>>>);

impl SharedBytes {
    pub fn new(bytes: Vec<u8>) -> Self {
        SharedBytes(Rc::new(RefCell::new(bytes)))
    }

    pub fn borrow(&self) -> Ref<'_, Vec<u8>> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, Vec<u8>> {
        self.0.borrow_mut()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &SharedBytes) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// The bytes decoded as UTF-8, with invalid sequences replaced.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

/// An object's fields in insertion order.
#[derive(Default)]
pub struct ObjectData {
    fields: Vec<(Name, Value)>,
}

impl ObjectData {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| &**field == name)
            .map(|(_, value)| value)
    }

    /// Overwrite an existing field or append a new one.
    pub fn set(&mut self, name: Name, value: Value) {
        if let Some(slot) = self.fields.iter_mut().find(|(field, _)| *field == name) {
            slot.1 = value;
        } else {
            self.fields.push((name, value));
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Name, Value)> {
        self.fields.iter()
    }
}

/// Reference to a heap object. Objects are shared, never copied.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<ObjectData>>);

impl ObjectRef {
    /// Build an object from fields in order; a repeated name overwrites.
    pub fn new(fields: impl IntoIterator<Item = (Name, Value)>) -> Self {
        let mut data = ObjectData::default();
        for (name, value) in fields {
            data.set(name, value);
        }
        ObjectRef(Rc::new(RefCell::new(data)))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.0.borrow().get(name).cloned()
    }

    pub fn set(&self, name: Name, value: Value) {
        self.0.borrow_mut().set(name, value);
    }

    pub fn borrow(&self) -> Ref<'_, ObjectData> {
        self.0.borrow()
    }

    pub fn field_names(&self) -> Vec<Name> {
        self.0.borrow().iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ObjectRef {
    fn default() -> Self {
        ObjectRef(Rc::new(RefCell::new(ObjectData::default())))
    }
}

// Objects can contain themselves; print only the shape.
impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.field_names().iter()).finish()
    }
}

/// A user function: its definition plus the environment it closed over.
pub struct Closure {
    pub def: Rc<FunctionDef>,
    pub env: Environment,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<&str> = self.def.params.iter().map(|p| &*p.name).collect();
        f.debug_struct("Closure").field("params", &params).finish()
    }
}

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
    F64(f64),
    Bool(bool),
    Null,
    /// Growable byte string.
    Str(SharedBytes),
    /// Fixed-size byte buffer.
    Buffer(SharedBytes),
    /// Handle into the interpreter's managed heap.
    Ptr(Pointer),
    /// Type tag, as bound to `i32`, `u8`, ... in the global scope.
    Type(TypeKind),
    Builtin(&'static Builtin),
    Function(Rc<Closure>),
    Object(ObjectRef),
}

impl Value {
    /// A fresh string with its own storage.
    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(SharedBytes::new(text.into().into_bytes()))
    }

    /// A zero-filled buffer of `size` bytes.
    pub fn buffer(size: usize) -> Self {
        Value::Buffer(SharedBytes::new(vec![0; size]))
    }

    /// The name `typeof` reports for this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::I8(_) => "i8",
            Value::U8(_) => "u8",
            Value::I16(_) => "i16",
            Value::U16(_) => "u16",
            Value::I32(_) => "i32",
            Value::U32(_) => "u32",
            Value::F32(_) => "f32",
            Value::F64(_) => "f64",
            Value::Bool(_) => "bool",
            Value::Null => "null",
            Value::Str(_) => "string",
            Value::Buffer(_) => "buffer",
            Value::Ptr(_) => "ptr",
            Value::Type(_) => "type",
            Value::Builtin(_) | Value::Function(_) => "function",
            Value::Object(_) => "object",
        }
    }

    /// Truthiness: false, zero, 0.0 and null are falsy; everything else,
    /// including the empty string, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::I8(n) => *n != 0,
            Value::U8(n) => *n != 0,
            Value::I16(n) => *n != 0,
            Value::U16(n) => *n != 0,
            Value::I32(n) => *n != 0,
            Value::U32(n) => *n != 0,
            Value::F32(n) => *n != 0.0,
            Value::F64(n) => *n != 0.0,
            Value::Bool(b) => *b,
            Value::Null => false,
            _ => true,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Value::I8(_)
                | Value::U8(_)
                | Value::I16(_)
                | Value::U16(_)
                | Value::I32(_)
                | Value::U32(_)
        )
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::F32(_) | Value::F64(_))
    }

    pub fn is_numeric(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// The exact value of an integer-family value.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::I8(n) => Some(i64::from(n)),
            Value::U8(n) => Some(i64::from(n)),
            Value::I16(n) => Some(i64::from(n)),
            Value::U16(n) => Some(i64::from(n)),
            Value::I32(n) => Some(i64::from(n)),
            Value::U32(n) => Some(i64::from(n)),
            _ => None,
        }
    }

    /// Any numeric value widened to f64.
    #[allow(
        clippy::cast_precision_loss,
        reason = "every integer variant fits in 32 bits"
    )]
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::F32(n) => Some(f64::from(n)),
            Value::F64(n) => Some(n),
            _ => self.as_i64().map(|n| n as f64),
        }
    }

    /// Integer conversion of a size or count argument.
    pub fn as_usize(&self) -> Option<usize> {
        self.as_i64().and_then(|n| usize::try_from(n).ok())
    }
}

/// The low eight bits of an integer, as stored by byte writes.
pub fn low_byte(n: i64) -> u8 {
    u8::try_from(n.rem_euclid(256)).unwrap_or(0)
}

/// Equality as the `==` operator sees it for values of the same kind.
/// Numbers of different widths are compared by the operator after
/// promotion, so here they are unequal.
impl PartialEq for Value {
    #[allow(clippy::float_cmp, reason = "value equality is exact")]
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::I8(a), Value::I8(b)) => a == b,
            (Value::U8(a), Value::U8(b)) => a == b,
            (Value::I16(a), Value::I16(b)) => a == b,
            (Value::U16(a), Value::U16(b)) => a == b,
            (Value::I32(a), Value::I32(b)) => a == b,
            (Value::U32(a), Value::U32(b)) => a == b,
            (Value::F32(a), Value::F32(b)) => a == b,
            (Value::F64(a), Value::F64(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Null, Value::Null) => true,
            (Value::Str(a), Value::Str(b)) => a.ptr_eq(b) || *a.borrow() == *b.borrow(),
            (Value::Buffer(a), Value::Buffer(b)) => a.ptr_eq(b),
            (Value::Ptr(a), Value::Ptr(b)) => a == b,
            (Value::Ptr(p), Value::Null) | (Value::Null, Value::Ptr(p)) => p.is_null(),
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Builtin(a), Value::Builtin(b)) => a.name == b.name,
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(n) => write!(f, "{n}"),
            Value::U8(n) => write!(f, "{n}"),
            Value::I16(n) => write!(f, "{n}"),
            Value::U16(n) => write!(f, "{n}"),
            Value::I32(n) => write!(f, "{n}"),
            Value::U32(n) => write!(f, "{n}"),
            Value::F32(n) => f.write_str(&format_float(f64::from(*n))),
            Value::F64(n) => f.write_str(&format_float(*n)),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => f.write_str("null"),
            Value::Str(s) => f.write_str(&s.to_string_lossy()),
            Value::Buffer(b) => {
                let len = b.len();
                write!(f, "<buffer length={len} capacity={len}>")
            }
            Value::Ptr(p) => write!(f, "{p}"),
            Value::Type(t) => write!(f, "<type {t}>"),
            Value::Builtin(_) => f.write_str("<builtin function>"),
            Value::Function(_) => f.write_str("<function>"),
            Value::Object(_) => f.write_str("<object>"),
        }
    }
}

#[cfg(test)]
mod tests;
