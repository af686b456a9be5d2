//! Compilation errors for the Oker compiler.
//!
//! Every error carries the source line it was raised for. Compilation stops
//! at the first error.

use thiserror::Error;

/// Errors found while lowering a syntax tree to bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    // --- Names ---
    /// An identifier that is neither a local nor a declared function.
    #[error("line {line}: undefined variable '{name}'")]
    UndefinedVariable { name: String, line: usize },

    /// A call to a name that is not a local, a declared function or a builtin.
    #[error("line {line}: undefined function '{name}'")]
    UndefinedFunction { name: String, line: usize },

    /// `return` in `<main>`. The parser rejects this, so it only shows up
    /// for syntax trees built by hand.
    #[error("line {line}: 'return' outside of a function")]
    ReturnOutsideFunction { line: usize },

    /// The same parameter name listed twice.
    #[error("line {line}: duplicate parameter '{name}' in function '{function}'")]
    DuplicateParameter {
        function: String,
        name: String,
        line: usize,
    },

    // --- Limits ---
    /// Constant pool does not fit 16-bit operands.
    #[error("line {line}: too many constants (max {limit})")]
    TooManyConstants { limit: usize, line: usize },

    /// One function binds more slots than 16-bit operands can address.
    #[error("line {line}: too many local variables in '{function}' (max {limit})")]
    TooManyLocals {
        function: String,
        limit: usize,
        line: usize,
    },

    /// Function table does not fit 16-bit operands.
    #[error("line {line}: too many functions (max {limit})")]
    TooManyFunctions { limit: usize, line: usize },

    /// A call site passes more arguments than 16-bit operands can count.
    #[error("line {line}: too many arguments in call ({count}, max {limit})")]
    TooManyArguments {
        count: usize,
        limit: usize,
        line: usize,
    },

    /// A body too long for 16-bit jump targets.
    #[error("line {line}: function '{function}' is too large ({size} instructions, max {limit})")]
    FunctionTooLarge {
        function: String,
        size: usize,
        limit: usize,
        line: usize,
    },
}

impl CompileError {
    /// Source line the error was raised for.
    pub fn line(&self) -> usize {
        match self {
            CompileError::UndefinedVariable { line, .. }
            | CompileError::UndefinedFunction { line, .. }
            | CompileError::ReturnOutsideFunction { line }
            | CompileError::DuplicateParameter { line, .. }
            | CompileError::TooManyConstants { line, .. }
            | CompileError::TooManyLocals { line, .. }
            | CompileError::TooManyFunctions { line, .. }
            | CompileError::TooManyArguments { line, .. }
            | CompileError::FunctionTooLarge { line, .. } => *line,
        }
    }
}
