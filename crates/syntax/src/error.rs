//! Error types for the Oker front end.

use thiserror::Error;

/// Errors produced while turning source text into tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// End of input reached inside a string literal. Points at the opening quote.
    #[error("line {line}:{column}: unterminated string literal")]
    UnterminatedString { line: usize, column: usize },

    /// A character that cannot start any token.
    #[error("line {line}:{column}: unexpected character '{ch}'")]
    UnexpectedCharacter { ch: char, line: usize, column: usize },
}

/// Errors produced while building the syntax tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    /// A token appeared where something else was required.
    #[error("line {line}:{column}: expected {expected}, found {found}")]
    Unexpected {
        expected: String,
        found: String,
        line: usize,
        column: usize,
    },

    /// End of input before the `end` closing a block.
    #[error("line {line}:{column}: '{block}' block opened on line {opened_line} is missing 'end'")]
    UnclosedBlock {
        block: &'static str,
        opened_line: usize,
        line: usize,
        column: usize,
    },

    /// `return` at top level.
    #[error("line {line}:{column}: 'return' outside of a function")]
    ReturnOutsideFunction { line: usize, column: usize },

    /// Blocks or expressions nested deeper than the parser allows.
    #[error("line {line}:{column}: nesting exceeds the limit of {limit} levels")]
    TooDeeplyNested {
        limit: usize,
        line: usize,
        column: usize,
    },
}

impl SyntaxError {
    /// Source line the error points at.
    pub fn line(&self) -> usize {
        match self {
            SyntaxError::Unexpected { line, .. }
            | SyntaxError::UnclosedBlock { line, .. }
            | SyntaxError::ReturnOutsideFunction { line, .. }
            | SyntaxError::TooDeeplyNested { line, .. } => *line,
        }
    }
}
