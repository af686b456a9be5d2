//! Pass 1: collect every `makef` in the program into the function table.
//!
//! Declarations are found wherever they appear: top level, inside other
//! function bodies and inside `if`/`while` bodies. The table is flat, so a
//! nested function is callable from anywhere.

use crate::error::CompileError;
use crate::limits::{self, MAX_FUNCTIONS};
use oker_syntax::ast::{FunctionDecl, Stmt, StmtKind};
use std::collections::HashMap;

/// One function table entry.
#[derive(Debug, Clone, Copy)]
pub struct Declared<'a> {
    pub decl: &'a FunctionDecl,
    /// Line of the `makef` keyword.
    pub line: usize,
}

/// Function table built by pass 1, indexed by `LOAD_FUNCTION` operand.
#[derive(Debug, Default)]
pub struct FunctionTable<'a> {
    entries: Vec<Declared<'a>>,
    by_name: HashMap<&'a str, u16>,
}

impl<'a> FunctionTable<'a> {
    /// Table index for a function name.
    pub fn lookup(&self, name: &str) -> Option<u16> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Declared<'a>> {
        self.entries.iter()
    }

    fn declare(&mut self, decl: &'a FunctionDecl, line: usize) -> Result<(), CompileError> {
        let entry = Declared { decl, line };
        if let Some(&index) = self.by_name.get(decl.name.as_str()) {
            tracing::debug!(
                name = %decl.name,
                line,
                "function redefined; later definition replaces earlier"
            );
            self.entries[usize::from(index)] = entry;
            return Ok(());
        }
        let index = limits::operand(self.entries.len(), MAX_FUNCTIONS, || {
            CompileError::TooManyFunctions {
                limit: MAX_FUNCTIONS,
                line,
            }
        })?;
        self.by_name.insert(decl.name.as_str(), index);
        self.entries.push(entry);
        Ok(())
    }
}

/// Walk `statements` recursively and register every function declaration.
pub fn declare_functions(statements: &[Stmt]) -> Result<FunctionTable<'_>, CompileError> {
    let mut table = FunctionTable::default();
    walk(statements, &mut table)?;
    tracing::debug!(functions = table.len(), "declared functions");
    Ok(table)
}

fn walk<'a>(statements: &'a [Stmt], table: &mut FunctionTable<'a>) -> Result<(), CompileError> {
    for stmt in statements {
        match &stmt.kind {
            StmtKind::Function(decl) => {
                table.declare(decl, stmt.line)?;
                walk(&decl.body, table)?;
            }
            StmtKind::If {
                then_branch,
                else_branch,
                ..
            } => {
                walk(then_branch, table)?;
                if let Some(else_branch) = else_branch {
                    walk(else_branch, table)?;
                }
            }
            StmtKind::While { body, .. } => walk(body, table)?,
            StmtKind::Let { .. }
            | StmtKind::Say { .. }
            | StmtKind::Return { .. }
            | StmtKind::Expr(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use oker_syntax::{parse, tokenize};

    fn program(source: &str) -> oker_syntax::ast::Program {
        parse(&tokenize(source).unwrap()).unwrap()
    }

    #[test]
    fn top_level_functions_in_order() {
        let p = program("makef a(): end\nmakef b(x): end");
        let table = declare_functions(&p.statements).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("a"), Some(0));
        assert_eq!(table.lookup("b"), Some(1));
        assert_eq!(table.lookup("c"), None);
    }

    #[test]
    fn nested_and_conditional_declarations_found() {
        let p = program(
            "makef outer():\n  makef inner(): end\nend\nif true:\n  makef cond(): end\nend\nwhile false:\n  makef looped(): end\nend",
        );
        let table = declare_functions(&p.statements).unwrap();
        let names: Vec<&str> = table.iter().map(|d| d.decl.name.as_str()).collect();
        assert_eq!(names, vec!["outer", "inner", "cond", "looped"]);
    }

    #[test]
    fn redefinition_replaces_in_place() {
        let p = program("makef f(): return 1 end\nmakef g(): end\nmakef f(a, b): return 2 end");
        let table = declare_functions(&p.statements).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("f"), Some(0));
        let first = table.iter().next().unwrap();
        assert_eq!(first.decl.params.len(), 2);
        assert_eq!(first.line, 3);
    }

    #[test]
    fn empty_program_has_empty_table() {
        let p = program("say 1");
        assert!(declare_functions(&p.statements).unwrap().is_empty());
    }
}
