//! Runtime kinds of Oker values.
//!
//! Oker is dynamically typed; a type tag is only ever observed at runtime,
//! through the `type()` builtin or in type-mismatch errors.

use std::fmt;

/// Identifies the kind of a runtime value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// IEEE 754 64-bit float.
    Number,
    /// Immutable text.
    String,
    /// `true` or `false`.
    Bool,
    /// The absence of a value.
    Nil,
    /// Reference to a compiled function.
    Function,
}

/// All type tags, in definition order.
pub const ALL_TYPE_TAGS: [TypeTag; 5] = [
    TypeTag::Number,
    TypeTag::String,
    TypeTag::Bool,
    TypeTag::Nil,
    TypeTag::Function,
];

impl TypeTag {
    /// Returns the name reported by `type()` and in error messages.
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Bool => "boolean",
            TypeTag::Nil => "nil",
            TypeTag::Function => "function",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn names_unique() {
        let names: HashSet<&str> = ALL_TYPE_TAGS.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), ALL_TYPE_TAGS.len());
    }

    #[test]
    fn bool_reports_boolean() {
        assert_eq!(TypeTag::Bool.name(), "boolean");
        assert_eq!(TypeTag::Bool.to_string(), "boolean");
    }
}
