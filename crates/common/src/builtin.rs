//! The builtin function table.
//!
//! Builtins are referenced from bytecode by numeric id (`CALL_BUILTIN id
//! argc`). The id is the enum discriminant; the compiler and the VM both go
//! through this table so the two never disagree.

use std::fmt;

/// A builtin function callable from Oker code.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    /// `str(x)`: text form of any value.
    Str = 0,
    /// `num(x)`: number from a number, string or bool.
    Num = 1,
    /// `len(s)`: character count of a string.
    Len = 2,
    /// `type(x)`: kind name of a value.
    Type = 3,
    /// `abs(n)`: absolute value.
    Abs = 4,
    /// `upper(s)`: uppercase copy.
    Upper = 5,
    /// `lower(s)`: lowercase copy.
    Lower = 6,
    /// `bool(x)`: truthiness of any value.
    Bool = 7,
    /// `strip(x)`: text form with surrounding whitespace removed.
    Strip = 8,
    /// `charAt(x, i)`: character `i` of the text form, or `""` when out of range.
    CharAt = 9,
}

/// All builtins, ordered by id.
pub const ALL_BUILTINS: [Builtin; 10] = [
    Builtin::Str,
    Builtin::Num,
    Builtin::Len,
    Builtin::Type,
    Builtin::Abs,
    Builtin::Upper,
    Builtin::Lower,
    Builtin::Bool,
    Builtin::Strip,
    Builtin::CharAt,
];

impl Builtin {
    /// Resolve a source-level name.
    pub fn from_name(name: &str) -> Option<Self> {
        ALL_BUILTINS.iter().copied().find(|b| b.name() == name)
    }

    /// Resolve a bytecode id.
    pub fn from_id(id: u16) -> Option<Self> {
        ALL_BUILTINS.get(usize::from(id)).copied()
    }

    /// Bytecode id.
    pub fn id(self) -> u16 {
        self as u16
    }

    /// Name as written in source.
    pub fn name(self) -> &'static str {
        match self {
            Builtin::Str => "str",
            Builtin::Num => "num",
            Builtin::Len => "len",
            Builtin::Type => "type",
            Builtin::Abs => "abs",
            Builtin::Upper => "upper",
            Builtin::Lower => "lower",
            Builtin::Bool => "bool",
            Builtin::Strip => "strip",
            Builtin::CharAt => "charAt",
        }
    }

    /// Exact number of arguments accepted.
    pub fn arity(self) -> usize {
        match self {
            Builtin::CharAt => 2,
            _ => 1,
        }
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_match_table_position() {
        for (i, b) in ALL_BUILTINS.iter().enumerate() {
            assert_eq!(usize::from(b.id()), i);
            assert_eq!(Builtin::from_id(b.id()), Some(*b));
        }
        assert_eq!(Builtin::from_id(ALL_BUILTINS.len() as u16), None);
    }

    #[test]
    fn names_resolve() {
        for b in &ALL_BUILTINS {
            assert_eq!(Builtin::from_name(b.name()), Some(*b));
        }
        assert_eq!(Builtin::from_name("print"), None);
        assert_eq!(Builtin::from_name("Str"), None);
        assert_eq!(Builtin::from_name("charAt"), Some(Builtin::CharAt));
        assert_eq!(Builtin::from_name("charat"), None);
    }

    #[test]
    fn only_char_at_takes_two_arguments() {
        for b in &ALL_BUILTINS {
            let expected = if *b == Builtin::CharAt { 2 } else { 1 };
            assert_eq!(b.arity(), expected, "{b}");
        }
    }
}
