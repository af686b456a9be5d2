//! Oker compiler: syntax tree → bytecode program.
//!
//! # Usage
//!
//! ```
//! use oker_compiler::compile;
//! use oker_syntax::{parse, tokenize};
//!
//! let ast = parse(&tokenize("say 1 + 2").unwrap()).unwrap();
//! let program = compile(&ast).unwrap();
//! assert!(program.functions.is_empty());
//! ```
//!
//! # Passes
//!
//! 1. **Declare**: register every `makef`, wherever it appears, in a flat
//!    function table. A later declaration of a name replaces the earlier.
//! 2. **Codegen**: compile `<main>` and each table entry with its own slot
//!    table, sharing one deduplicated constant pool.
//!
//! Name resolution is static: an identifier is a local slot, a function
//! table entry or an error. Compilation stops at the first error.

pub mod declare;
pub mod error;
pub mod limits;

mod codegen;
mod scope;

pub use error::CompileError;

use codegen::{ConstantPool, FunctionCompiler};
use oker_common::{Program, MAIN_NAME};
use oker_syntax::ast;

/// Compile a parsed program.
pub fn compile(program: &ast::Program) -> Result<Program, CompileError> {
    // Pass 1: Declare
    let table = declare::declare_functions(&program.statements)?;

    // Pass 2: Bodies
    let mut pool = ConstantPool::default();
    let main = FunctionCompiler::new(&mut pool, &table, MAIN_NAME, &[], false, 1)?
        .finish(&program.statements, 1)?;

    let mut functions = Vec::with_capacity(table.len());
    for entry in table.iter() {
        let decl = entry.decl;
        let function =
            FunctionCompiler::new(&mut pool, &table, &decl.name, &decl.params, true, entry.line)?
                .finish(&decl.body, entry.line)?;
        functions.push(function);
    }

    let constants = pool.into_values();
    tracing::debug!(
        constants = constants.len(),
        functions = functions.len(),
        main_len = main.code.len(),
        "compiled program"
    );
    Ok(Program::new(constants, functions, main))
}
