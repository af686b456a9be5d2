//! Instruction representation for the Oker instruction set.
//!
//! Instructions are kept as plain structs rather than packed bytes. Each
//! carries up to two 16-bit operands and the source line it was compiled
//! from, which runtime errors report.

use crate::opcode::Opcode;
use std::fmt;

/// A single Oker instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    /// The operation to perform.
    pub opcode: Opcode,
    /// First operand. Meaning depends on opcode.
    pub arg1: u16,
    /// Second operand. Only `CallBuiltin` uses it.
    pub arg2: u16,
    /// 1-based source line this instruction was generated from.
    pub line: usize,
}

impl Instruction {
    /// Create a new instruction.
    pub fn new(opcode: Opcode, arg1: u16, arg2: u16, line: usize) -> Self {
        Self {
            opcode,
            arg1,
            arg2,
            line,
        }
    }

    /// Create an instruction that takes no operands.
    pub fn simple(opcode: Opcode, line: usize) -> Self {
        Self::new(opcode, 0, 0, line)
    }

    /// Create an instruction with a single operand.
    pub fn with_arg(opcode: Opcode, arg1: u16, line: usize) -> Self {
        Self::new(opcode, arg1, 0, line)
    }
}

/// Mnemonic followed by the operands the opcode actually uses.
impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode.operand_count() {
            0 => f.write_str(self.opcode.mnemonic()),
            1 => write!(f, "{} {}", self.opcode.mnemonic(), self.arg1),
            _ => write!(f, "{} {} {}", self.opcode.mnemonic(), self.arg1, self.arg2),
        }
    }
}
