//! Opcode definitions for the Oker instruction set.
//!
//! Operand meaning per opcode:
//!
//! | Opcode          | arg1             | arg2       |
//! |-----------------|------------------|------------|
//! | `Const`         | constant index   | -          |
//! | `LoadLocal`     | slot             | -          |
//! | `StoreLocal`    | slot             | -          |
//! | `LoadFunction`  | function index   | -          |
//! | `Call`          | argument count   | -          |
//! | `CallBuiltin`   | builtin id       | arg count  |
//! | `Jump`          | target offset    | -          |
//! | `JumpIfFalse`   | target offset    | -          |
//!
//! Every other opcode takes no operands.

/// Identifies the operation to perform.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    // Constants & variables
    /// Push constant `arg1` from the program's constant pool.
    Const = 0x01,
    /// Push the value held in local slot `arg1`.
    LoadLocal = 0x02,
    /// Pop the top of stack into local slot `arg1`.
    StoreLocal = 0x03,
    /// Push a reference to function-table entry `arg1`.
    LoadFunction = 0x04,

    // Arithmetic
    /// Pop two values, push their sum (or string concatenation).
    Add = 0x10,
    /// Pop two values, push (second_popped - first_popped).
    Sub = 0x11,
    /// Pop two values, push their product.
    Mul = 0x12,
    /// Pop two values, push quotient. Division by zero is a runtime error.
    Div = 0x13,
    /// Pop two values, push truncating remainder. Zero divisor is a runtime error.
    Mod = 0x14,
    /// Pop one number, push its negation.
    Neg = 0x15,

    // Comparison
    /// Pop two values, push BOOL (true if equal).
    Eq = 0x20,
    /// Pop two values, push BOOL (true if not equal).
    Neq = 0x21,
    /// Pop two numbers, push BOOL (second_popped < first_popped).
    Lt = 0x22,
    /// Pop two numbers, push BOOL (second_popped > first_popped).
    Gt = 0x23,
    /// Pop two numbers, push BOOL (second_popped <= first_popped).
    Lte = 0x24,
    /// Pop two numbers, push BOOL (second_popped >= first_popped).
    Gte = 0x25,

    // Functions
    /// Call the function sitting below `arg1` arguments.
    Call = 0x30,
    /// Call builtin `arg1` with `arg2` arguments.
    CallBuiltin = 0x31,
    /// Return top of stack from the current function.
    Return = 0x32,

    // Control flow
    /// Continue at offset `arg1`.
    Jump = 0x40,
    /// Pop a condition; continue at offset `arg1` if it is falsy.
    JumpIfFalse = 0x41,

    // Statements
    /// Discard the top of stack.
    Pop = 0x50,
    /// Pop a value and append its text form plus a newline to the output.
    Print = 0x51,
}

/// All opcodes, in declaration order.
pub const ALL_OPCODES: [Opcode; 23] = [
    Opcode::Const,
    Opcode::LoadLocal,
    Opcode::StoreLocal,
    Opcode::LoadFunction,
    Opcode::Add,
    Opcode::Sub,
    Opcode::Mul,
    Opcode::Div,
    Opcode::Mod,
    Opcode::Neg,
    Opcode::Eq,
    Opcode::Neq,
    Opcode::Lt,
    Opcode::Gt,
    Opcode::Lte,
    Opcode::Gte,
    Opcode::Call,
    Opcode::CallBuiltin,
    Opcode::Return,
    Opcode::Jump,
    Opcode::JumpIfFalse,
    Opcode::Pop,
    Opcode::Print,
];

impl Opcode {
    /// Returns the assembly mnemonic for this opcode.
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Const => "CONST",
            Opcode::LoadLocal => "LOAD_LOCAL",
            Opcode::StoreLocal => "STORE_LOCAL",
            Opcode::LoadFunction => "LOAD_FUNCTION",
            Opcode::Add => "ADD",
            Opcode::Sub => "SUB",
            Opcode::Mul => "MUL",
            Opcode::Div => "DIV",
            Opcode::Mod => "MOD",
            Opcode::Neg => "NEG",
            Opcode::Eq => "EQ",
            Opcode::Neq => "NEQ",
            Opcode::Lt => "LT",
            Opcode::Gt => "GT",
            Opcode::Lte => "LTE",
            Opcode::Gte => "GTE",
            Opcode::Call => "CALL",
            Opcode::CallBuiltin => "CALL_BUILTIN",
            Opcode::Return => "RETURN",
            Opcode::Jump => "JUMP",
            Opcode::JumpIfFalse => "JUMP_IF_FALSE",
            Opcode::Pop => "POP",
            Opcode::Print => "PRINT",
        }
    }

    /// Number of operands this opcode reads (0, 1 or 2).
    pub fn operand_count(self) -> usize {
        match self {
            Opcode::Const
            | Opcode::LoadLocal
            | Opcode::StoreLocal
            | Opcode::LoadFunction
            | Opcode::Call
            | Opcode::Jump
            | Opcode::JumpIfFalse => 1,
            Opcode::CallBuiltin => 2,
            _ => 0,
        }
    }

    /// True for opcodes whose `arg1` is an instruction offset.
    pub fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpIfFalse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_opcodes_count() {
        assert_eq!(ALL_OPCODES.len(), 23);
    }

    #[test]
    fn byte_values_unique() {
        let bytes: HashSet<u8> = ALL_OPCODES.iter().map(|&op| op as u8).collect();
        assert_eq!(bytes.len(), ALL_OPCODES.len());
    }

    #[test]
    fn mnemonics_unique() {
        let names: HashSet<&str> = ALL_OPCODES.iter().map(|op| op.mnemonic()).collect();
        assert_eq!(names.len(), ALL_OPCODES.len());
    }

    #[test]
    fn mnemonics_are_uppercase() {
        for op in &ALL_OPCODES {
            let m = op.mnemonic();
            assert_eq!(m, m.to_uppercase(), "{op:?} mnemonic not uppercase");
        }
    }

    #[test]
    fn operand_counts() {
        assert_eq!(Opcode::Add.operand_count(), 0);
        assert_eq!(Opcode::Const.operand_count(), 1);
        assert_eq!(Opcode::CallBuiltin.operand_count(), 2);
        assert_eq!(Opcode::Return.operand_count(), 0);
    }

    #[test]
    fn jumps() {
        assert!(Opcode::Jump.is_jump());
        assert!(Opcode::JumpIfFalse.is_jump());
        assert!(!Opcode::Call.is_jump());
    }
}
