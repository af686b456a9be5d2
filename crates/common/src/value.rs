//! Runtime value representation for the Oker VM.
//!
//! Values are what live on the operand stack, in local slots and in the
//! constant pool.

use crate::type_tag::TypeTag;
use std::fmt;
use std::rc::Rc;

/// Reference to an entry of the compiled function table.
///
/// The name travels with the index so a function value can be printed
/// without access to the table.
#[derive(Debug, Clone)]
pub struct FunctionRef {
    /// Index into `Program::functions`.
    pub index: u16,
    /// Declared name of the function.
    pub name: Rc<str>,
}

/// Runtime value representation.
#[derive(Debug, Clone)]
pub enum Value {
    /// IEEE 754 64-bit float. Oker has no separate integer type.
    Number(f64),
    /// Immutable, reference-counted text.
    Str(Rc<str>),
    /// Boolean value.
    Bool(bool),
    /// The absence of a value. Returned by functions that fall off the end.
    Nil,
    /// A compiled function.
    Function(FunctionRef),
}

// Numbers use IEEE equality, so NaN is never equal to itself and this type
// is deliberately not `Eq`. Values of different kinds are never equal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Function(a), Value::Function(b)) => a.index == b.index,
            _ => false,
        }
    }
}

impl Value {
    /// Build a string value.
    pub fn string(text: impl Into<Rc<str>>) -> Self {
        Value::Str(text.into())
    }

    /// Returns the type tag for this value.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Number(_) => TypeTag::Number,
            Value::Str(_) => TypeTag::String,
            Value::Bool(_) => TypeTag::Bool,
            Value::Nil => TypeTag::Nil,
            Value::Function(_) => TypeTag::Function,
        }
    }

    /// Truthiness used by conditional jumps.
    ///
    /// `false`, `nil`, `0`, the empty string and the string `"false"` are
    /// falsy. Every other number, NaN included, is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Bool(b) => *b,
            Value::Nil => false,
            Value::Number(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty() && &**s != "false",
            Value::Function(_) => true,
        }
    }
}

/// Format a number the way `str()` does.
///
/// Produces the shortest decimal text that parses back to the same `f64`.
/// Integral values have no decimal point: `120`, `-3`, `2.5`, `0.1`.
pub fn format_number(n: f64) -> String {
    // Rust's float Display is already shortest-round-trip and never uses
    // exponent notation, so `120.0` prints as `120`.
    format!("{n}")
}

/// The text form used by `say`, `str()` and string concatenation.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::Str(s) => f.write_str(s),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Nil => f.write_str("nil"),
            Value::Function(func) => write!(f, "<fn {}>", func.name),
        }
    }
}
