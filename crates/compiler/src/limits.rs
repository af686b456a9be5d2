//! Hard limits imposed by 16-bit instruction operands.

use crate::error::CompileError;
use oker_common::CompiledFunction;

/// Maximum constant pool size.
pub const MAX_CONSTANTS: usize = 65_536;

/// Maximum number of local slots in one function.
pub const MAX_LOCALS: usize = 65_536;

/// Maximum function table size.
pub const MAX_FUNCTIONS: usize = 65_536;

/// Maximum argument count at one call site.
pub const MAX_ARGUMENTS: usize = 65_535;

/// Maximum body length in instructions. Jump targets must stay addressable.
pub const MAX_FUNCTION_SIZE: usize = 65_536;

/// Convert a table index to an operand, or report `on_overflow`.
pub(crate) fn operand(
    index: usize,
    limit: usize,
    on_overflow: impl FnOnce() -> CompileError,
) -> Result<u16, CompileError> {
    if index >= limit {
        return Err(on_overflow());
    }
    u16::try_from(index).map_err(|_| on_overflow())
}

/// Check a finished function body.
pub fn check_function(function: &CompiledFunction, line: usize) -> Result<(), CompileError> {
    if function.code.len() > MAX_FUNCTION_SIZE {
        return Err(CompileError::FunctionTooLarge {
            function: function.name.clone(),
            size: function.code.len(),
            limit: MAX_FUNCTION_SIZE,
            line,
        });
    }
    if function.local_count > MAX_LOCALS {
        return Err(CompileError::TooManyLocals {
            function: function.name.clone(),
            limit: MAX_LOCALS,
            line,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oker_common::{Instruction, Opcode};

    #[test]
    fn operand_within_limit() {
        let r = operand(10, MAX_CONSTANTS, || CompileError::TooManyConstants {
            limit: MAX_CONSTANTS,
            line: 1,
        });
        assert_eq!(r, Ok(10));
    }

    #[test]
    fn operand_at_limit_fails() {
        let r = operand(MAX_CONSTANTS, MAX_CONSTANTS, || {
            CompileError::TooManyConstants {
                limit: MAX_CONSTANTS,
                line: 3,
            }
        });
        assert!(matches!(r, Err(CompileError::TooManyConstants { line: 3, .. })));
    }

    #[test]
    fn largest_operand_fits() {
        let r = operand(65_535, MAX_FUNCTIONS, || CompileError::TooManyFunctions {
            limit: MAX_FUNCTIONS,
            line: 1,
        });
        assert_eq!(r, Ok(u16::MAX));
    }

    #[test]
    fn small_function_passes() {
        let mut f = CompiledFunction::new("f", &[]);
        f.code.push(Instruction::simple(Opcode::Return, 1));
        assert!(check_function(&f, 1).is_ok());
    }

    #[test]
    fn oversized_function_fails() {
        let mut f = CompiledFunction::new("big", &[]);
        f.code = vec![Instruction::simple(Opcode::Pop, 1); MAX_FUNCTION_SIZE + 1];
        assert!(matches!(
            check_function(&f, 7),
            Err(CompileError::FunctionTooLarge { line: 7, .. })
        ));
    }
}
