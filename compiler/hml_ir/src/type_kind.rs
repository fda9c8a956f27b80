//! Scalar type tags.
//!
//! A `TypeKind` appears in two places: as a declared annotation on
//! `let`/`const`/parameters/returns, and at runtime as the payload of a
//! type-tag value (the pre-bound `i32`, `u8`, ... names consumed by
//! `sizeof` and `talloc`).

use std::fmt;

/// A declarable scalar type.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    F64,
    Bool,
    String,
    Ptr,
    Buffer,
}

impl TypeKind {
    /// Every canonical type, in declaration order.
    pub const ALL: [TypeKind; 12] = [
        TypeKind::I8,
        TypeKind::U8,
        TypeKind::I16,
        TypeKind::U16,
        TypeKind::I32,
        TypeKind::U32,
        TypeKind::F32,
        TypeKind::F64,
        TypeKind::Bool,
        TypeKind::String,
        TypeKind::Ptr,
        TypeKind::Buffer,
    ];

    /// Alias names and the canonical type each one stands for.
    pub const ALIASES: [(&'static str, TypeKind); 4] = [
        ("integer", TypeKind::I32),
        ("number", TypeKind::F64),
        ("byte", TypeKind::U8),
        ("char", TypeKind::U8),
    ];

    /// Resolve a source-level type name, including aliases.
    pub fn from_name(name: &str) -> Option<TypeKind> {
        if let Some(kind) = Self::ALL.iter().find(|k| k.name() == name) {
            return Some(*kind);
        }
        Self::ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, kind)| *kind)
    }

    /// Canonical source-level name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Ptr => "ptr",
            Self::Buffer => "buffer",
        }
    }

    /// Storage size in bytes, as reported by `sizeof`.
    ///
    /// `bool` is stored as a C `int`; strings, pointers and buffers are
    /// reported at pointer width.
    pub const fn size(self) -> usize {
        match self {
            Self::I8 | Self::U8 => 1,
            Self::I16 | Self::U16 => 2,
            Self::I32 | Self::U32 | Self::F32 | Self::Bool => 4,
            Self::F64 | Self::Ptr | Self::Buffer | Self::String => 8,
        }
    }

    /// Whether this is one of the six integer widths.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8 | Self::U8 | Self::I16 | Self::U16 | Self::I32 | Self::U32
        )
    }

    /// Whether this is `f32` or `f64`.
    pub const fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether this is any of the eight numeric types.
    pub const fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
