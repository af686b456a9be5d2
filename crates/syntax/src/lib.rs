//! Oker front end: source text → tokens → syntax tree.
//!
//! # Usage
//!
//! ```
//! use oker_syntax::{parse, tokenize};
//!
//! let tokens = tokenize("let x = 1 + 2\nsay x").unwrap();
//! let program = parse(&tokens).unwrap();
//! assert_eq!(program.statements.len(), 2);
//! ```
//!
//! Both stages stop at the first error.

pub mod ast;
pub mod error;
pub mod token;

mod lexer;
mod parser;

pub use error::{LexError, SyntaxError};
pub use lexer::tokenize;
pub use parser::{parse, MAX_NESTING_DEPTH};
pub use token::{Token, TokenCategory, TokenKind};
