//! Compiled program representation.
//!
//! A program is a shared constant pool, a function table and the code of the
//! implicit top-level function `<main>`.

use crate::instruction::Instruction;
use crate::value::Value;

/// Name given to the implicit top-level function.
pub const MAIN_NAME: &str = "<main>";

/// One compiled function body.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledFunction {
    /// Declared name, or [`MAIN_NAME`] for the top level.
    pub name: String,
    /// Number of declared parameters. Parameters occupy slots `0..arity`.
    pub arity: usize,
    /// Total number of local slots, parameters included.
    pub local_count: usize,
    /// Name bound to each slot, indexed by slot number.
    pub local_names: Vec<String>,
    /// The instruction stream. Jump targets index into this vector.
    pub code: Vec<Instruction>,
}

impl CompiledFunction {
    /// Create an empty function with the given name and parameters.
    pub fn new(name: impl Into<String>, params: &[String]) -> Self {
        Self {
            name: name.into(),
            arity: params.len(),
            local_count: params.len(),
            local_names: params.to_vec(),
            code: Vec::new(),
        }
    }

    /// Number of instructions in the body.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Returns true if the body has no instructions.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }
}

/// A compiled Oker program.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Constant pool shared by every function.
    pub constants: Vec<Value>,
    /// Function table. `LOAD_FUNCTION` operands index into it.
    pub functions: Vec<CompiledFunction>,
    /// The implicit top-level function.
    pub main: CompiledFunction,
}

impl Program {
    /// Create a program.
    pub fn new(
        constants: Vec<Value>,
        functions: Vec<CompiledFunction>,
        main: CompiledFunction,
    ) -> Self {
        Self {
            constants,
            functions,
            main,
        }
    }

    /// Look up a function table entry by index.
    pub fn function(&self, index: u16) -> Option<&CompiledFunction> {
        self.functions.get(usize::from(index))
    }

    /// Look up a constant by index.
    pub fn constant(&self, index: u16) -> Option<&Value> {
        self.constants.get(usize::from(index))
    }

    /// Total instruction count across `<main>` and every function.
    pub fn instruction_count(&self) -> usize {
        self.main.len() + self.functions.iter().map(CompiledFunction::len).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Opcode;

    fn body(name: &str, params: &[&str], len: usize) -> CompiledFunction {
        let params: Vec<String> = params.iter().map(|p| p.to_string()).collect();
        let mut func = CompiledFunction::new(name, &params);
        for _ in 0..len {
            func.code.push(Instruction::simple(Opcode::Pop, 1));
        }
        func
    }

    #[test]
    fn new_function_binds_params_to_first_slots() {
        let func = body("add", &["a", "b"], 0);
        assert_eq!(func.arity, 2);
        assert_eq!(func.local_count, 2);
        assert_eq!(func.local_names, vec!["a", "b"]);
        assert!(func.is_empty());
    }

    #[test]
    fn lookups_by_index() {
        let program = Program::new(
            vec![Value::Number(1.0)],
            vec![body("f", &[], 2)],
            body(MAIN_NAME, &[], 3),
        );
        assert_eq!(program.constant(0), Some(&Value::Number(1.0)));
        assert_eq!(program.constant(1), None);
        assert_eq!(program.function(0).map(|f| f.name.as_str()), Some("f"));
        assert!(program.function(1).is_none());
        assert_eq!(program.instruction_count(), 5);
    }
}
