//! Oker common types.
//!
//! This crate provides the data structures shared by the compiler and the
//! virtual machine:
//!
//! - [`Opcode`]: the instruction set
//! - [`Instruction`]: one instruction with its operands and source line
//! - [`Value`]: runtime value representation for the VM stack
//! - [`TypeTag`]: the kind of a runtime value
//! - [`Builtin`]: the builtin function table
//! - [`Program`] and [`CompiledFunction`]: compiled output
//!
//! # Dependencies
//!
//! None outside `std`.

pub mod builtin;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod type_tag;
pub mod value;

// Re-export commonly used types at the crate root.
pub use builtin::Builtin;
pub use instruction::Instruction;
pub use opcode::Opcode;
pub use program::{CompiledFunction, Program, MAIN_NAME};
pub use type_tag::TypeTag;
pub use value::{format_number, FunctionRef, Value};

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Formatting a finite number and parsing it back yields the same bits.
        #[test]
        fn format_number_roundtrip(n in any::<f64>().prop_filter("finite", |n| n.is_finite())) {
            let text = format_number(n);
            let parsed: f64 = text.parse().unwrap();
            prop_assert_eq!(parsed.to_bits(), n.to_bits());
        }

        /// Integral values never print a decimal point.
        #[test]
        fn integral_has_no_point(n in -1_000_000_000i64..1_000_000_000i64) {
            let text = format_number(n as f64);
            prop_assert!(!text.contains('.'));
            prop_assert_eq!(text, n.to_string());
        }

        /// Equality is reflexive for every non-NaN value.
        #[test]
        fn equality_reflexive(n in any::<f64>().prop_filter("not nan", |n| !n.is_nan()), s in ".*") {
            prop_assert_eq!(Value::Number(n), Value::Number(n));
            prop_assert_eq!(Value::string(s.as_str()), Value::string(s.as_str()));
        }
    }
}
