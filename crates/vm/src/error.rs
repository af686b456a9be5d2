//! Runtime errors for the Oker VM.
//!
//! Every error carries the source line of the instruction that failed.

use thiserror::Error;

/// Errors that occur during program execution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// `/` or `%` with a zero divisor.
    #[error("line {line}: division by zero")]
    DivisionByZero { line: usize },

    /// An operator, call or builtin applied to values of the wrong kind.
    #[error("line {line}: type mismatch: {message}")]
    TypeMismatch { message: String, line: usize },

    /// A slot read before any assignment reached it.
    #[error("line {line}: variable '{name}' used before assignment")]
    UndefinedVariable { name: String, line: usize },

    /// Argument count differs from the callee's arity.
    #[error("line {line}: '{function}' expects {expected} argument(s), got {found}")]
    ArityMismatch {
        function: String,
        expected: usize,
        found: usize,
        line: usize,
    },

    /// Call depth reached the configured limit.
    #[error("line {line}: stack overflow (call depth limit {limit})")]
    StackOverflow { limit: usize, line: usize },

    /// Instruction budget or wall-clock limit exhausted.
    #[error("line {line}: execution timed out: {reason}")]
    ExecutionTimeout { reason: String, line: usize },

    /// A string or the output grew past its configured cap.
    #[error("line {line}: {what} exceeds the limit of {limit} bytes")]
    SizeLimit {
        what: &'static str,
        limit: usize,
        line: usize,
    },

    /// Bytecode that breaks compiler invariants: bad operand index, stack
    /// underflow, falling off the end of a body.
    #[error("line {line}: malformed bytecode: {reason}")]
    MalformedBytecode { reason: String, line: usize },
}

impl RuntimeError {
    /// Source line of the failing instruction.
    pub fn line(&self) -> usize {
        match self {
            RuntimeError::DivisionByZero { line }
            | RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::StackOverflow { line, .. }
            | RuntimeError::ExecutionTimeout { line, .. }
            | RuntimeError::SizeLimit { line, .. }
            | RuntimeError::MalformedBytecode { line, .. } => *line,
        }
    }

    pub(crate) fn type_mismatch(message: impl Into<String>, line: usize) -> Self {
        RuntimeError::TypeMismatch {
            message: message.into(),
            line,
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>, line: usize) -> Self {
        RuntimeError::MalformedBytecode {
            reason: reason.into(),
            line,
        }
    }
}
