//! Oker virtual machine: executes compiled programs.
//!
//! The VM is a stack-based machine with:
//! - One operand stack shared by every frame
//! - A frame stack holding each activation's local slots
//! - An output buffer collecting everything `say` prints
//!
//! # Usage
//!
//! ```
//! use oker_compiler::compile;
//! use oker_syntax::{parse, tokenize};
//! use oker_vm::run;
//!
//! let ast = parse(&tokenize("say \"n = \" + str(6 * 7)").unwrap()).unwrap();
//! let program = compile(&ast).unwrap();
//! assert_eq!(run(&program).unwrap(), "n = 42\n");
//! ```
//!
//! Runs are bounded by [`VmConfig`]: call depth, instruction budget and an
//! optional wall-clock limit.

pub mod config;
pub mod error;
pub mod execute;
pub mod machine;

mod builtins;
mod ops;

pub use config::VmConfig;
pub use error::RuntimeError;
pub use machine::{CallFrame, VM};

use oker_common::Program;

/// Execute a program with default limits and return its output.
///
/// # Errors
///
/// Returns [`RuntimeError`] if execution fails (division by zero, type
/// mismatch, stack overflow, timeout, etc.). Output produced before the
/// failure is discarded.
pub fn run(program: &Program) -> Result<String, RuntimeError> {
    run_with(program, VmConfig::default())
}

/// Execute a program with the given limits and return its output.
pub fn run_with(program: &Program, config: VmConfig) -> Result<String, RuntimeError> {
    let mut vm = VM::with_config(program, config);
    let result = vm.execute();
    if let Err(e) = &result {
        tracing::debug!(error = %e, steps = vm.steps(), "program failed");
    }
    result
}
