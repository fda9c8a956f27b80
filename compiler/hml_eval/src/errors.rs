//! Runtime error types.
//!
//! Every runtime failure is an [`EvalError`] carrying a structured
//! [`EvalErrorKind`], the rendered message and, once it has bubbled past an
//! expression, the span of the innermost expression that produced it.
//!
//! Factory functions are the public way to build errors; they keep `kind`
//! and `message` in sync.

use std::fmt;

use hml_ir::{Span, TypeKind};

use crate::value::Value;

/// Result of evaluating an expression.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Arithmetic
    DivisionByZero,
    ModuloByZero,

    // Type/Operator
    TypeMismatch {
        expected: String,
        got: String,
    },
    InvalidOperand {
        op: &'static str,
        operands: String,
    },

    // Access
    UndefinedVariable {
        name: String,
    },
    ImmutableBinding {
        name: String,
    },
    UndefinedField {
        field: String,
    },
    UndefinedProperty {
        property: String,
        type_name: &'static str,
    },
    IndexOutOfBounds {
        index: i64,
        length: usize,
    },

    // Function
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    NotCallable {
        type_name: &'static str,
    },
    MissingReturn {
        expected: TypeKind,
    },
    StackOverflow {
        depth: usize,
    },

    // Conversion
    RangeError {
        value: i64,
        target: TypeKind,
        min: i64,
        max: i64,
    },
    ConversionError {
        from: &'static str,
        target: TypeKind,
    },

    // Memory
    InvalidMemoryAccess {
        message: String,
    },

    // Assertion/Panic
    AssertionFailed {
        message: String,
    },
    Panic {
        message: String,
    },

    Custom {
        message: String,
    },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero => write!(f, "Division by zero"),
            Self::ModuloByZero => write!(f, "Modulo by zero"),

            Self::TypeMismatch { expected, got } => {
                write!(f, "type mismatch: expected {expected}, got {got}")
            }
            Self::InvalidOperand { op, operands } => {
                write!(f, "operator `{op}` cannot be applied to {operands}")
            }

            Self::UndefinedVariable { name } => write!(f, "Undefined variable '{name}'"),
            Self::ImmutableBinding { name } => {
                write!(f, "cannot assign to immutable binding '{name}'")
            }
            Self::UndefinedField { field } => write!(f, "object has no field '{field}'"),
            Self::UndefinedProperty {
                property,
                type_name,
            } => write!(f, "{type_name} has no property '{property}'"),
            Self::IndexOutOfBounds { index, length } => {
                write!(f, "index {index} out of bounds (length {length})")
            }

            Self::ArityMismatch {
                name,
                expected,
                got,
            } => {
                let arg_word = if *expected == 1 {
                    "argument"
                } else {
                    "arguments"
                };
                if name.is_empty() {
                    write!(f, "expected {expected} {arg_word}, got {got}")
                } else {
                    write!(f, "{name}() expects {expected} {arg_word}, got {got}")
                }
            }
            Self::NotCallable { type_name } => write!(f, "{type_name} is not callable"),
            Self::MissingReturn { expected } => {
                write!(f, "function with return type {expected} completed without returning")
            }
            Self::StackOverflow { depth } => {
                write!(f, "maximum call depth exceeded (limit: {depth})")
            }

            Self::RangeError {
                value,
                target,
                min,
                max,
            } => write!(f, "Value {value} out of range for {target} [{min}, {max}]"),
            Self::ConversionError { from, target } => {
                write!(f, "Cannot convert {from} to {target}")
            }

            Self::InvalidMemoryAccess { message } => write!(f, "invalid memory access: {message}"),

            Self::AssertionFailed { message } => write!(f, "assertion failed: {message}"),
            Self::Panic { message } => write!(f, "panic: {message}"),

            Self::Custom { message } => write!(f, "{message}"),
        }
    }
}

/// Evaluation error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    /// Structured error category.
    pub kind: EvalErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Innermost expression or statement that failed.
    pub span: Option<Span>,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        EvalError {
            kind: EvalErrorKind::Custom {
                message: message.clone(),
            },
            message,
            span: None,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        EvalError {
            kind,
            message,
            span: None,
        }
    }

    /// Attach a span, replacing any existing one.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attach a span only if none is recorded yet, so the innermost
    /// location wins as the error unwinds.
    #[must_use]
    pub fn or_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for EvalError {}

// Arithmetic

#[cold]
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

#[cold]
pub fn modulo_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::ModuloByZero)
}

// Type/Operator

#[cold]
pub fn type_mismatch(expected: &str, got: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::TypeMismatch {
        expected: expected.to_string(),
        got: got.to_string(),
    })
}

/// Operator applied to a value (or pair of values) it does not support.
#[cold]
pub fn invalid_operand(op: &'static str, operands: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidOperand {
        op,
        operands: operands.into(),
    })
}

// Access

#[cold]
pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable {
        name: name.to_string(),
    })
}

#[cold]
pub fn immutable_binding(name: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding {
        name: name.to_string(),
    })
}

#[cold]
pub fn undefined_field(field: &str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedField {
        field: field.to_string(),
    })
}

#[cold]
pub fn undefined_property(property: &str, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedProperty {
        property: property.to_string(),
        type_name,
    })
}

#[cold]
pub fn index_out_of_bounds(index: i64, length: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexOutOfBounds { index, length })
}

// Function

#[cold]
pub fn arity_mismatch(name: &str, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.to_string(),
        expected,
        got,
    })
}

#[cold]
pub fn not_callable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

#[cold]
pub fn missing_return(expected: TypeKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::MissingReturn { expected })
}

#[cold]
pub fn stack_overflow(depth: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::StackOverflow { depth })
}

// Conversion

#[cold]
pub fn range_error(value: i64, target: TypeKind, min: i64, max: i64) -> EvalError {
    EvalError::from_kind(EvalErrorKind::RangeError {
        value,
        target,
        min,
        max,
    })
}

#[cold]
pub fn conversion_error(from: &'static str, target: TypeKind) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ConversionError { from, target })
}

// Memory

#[cold]
pub fn invalid_memory_access(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidMemoryAccess {
        message: message.into(),
    })
}

// Assertion/Panic

#[cold]
pub fn assertion_failed(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::AssertionFailed {
        message: message.into(),
    })
}

#[cold]
pub fn panic(message: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Panic {
        message: message.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_matches_kind_display() {
        let err = range_error(300, TypeKind::I8, -128, 127);
        assert_eq!(err.message, "Value 300 out of range for i8 [-128, 127]");
        assert_eq!(err.message, err.kind.to_string());
    }

    #[test]
    fn arity_message_pluralizes() {
        assert_eq!(
            arity_mismatch("print", 1, 2).message,
            "print() expects 1 argument, got 2"
        );
        assert_eq!(
            arity_mismatch("", 2, 0).message,
            "expected 2 arguments, got 0"
        );
    }

    #[test]
    fn or_span_keeps_innermost() {
        let inner = Span::new(4, 5);
        let outer = Span::new(0, 10);
        let err = division_by_zero().or_span(inner).or_span(outer);
        assert_eq!(err.span, Some(inner));
        assert_eq!(err.with_span(outer).span, Some(outer));
    }

    #[test]
    fn custom_errors_use_custom_kind() {
        let err = EvalError::new("boom");
        assert_eq!(
            err.kind,
            EvalErrorKind::Custom {
                message: "boom".to_string()
            }
        );
        assert_eq!(err.to_string(), "boom");
    }
}
