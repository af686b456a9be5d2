//! Per-function slot table.
//!
//! Each function gets one flat scope: parameters take slots `0..arity`, and
//! every `let` of a new name appends a slot. `if` and `while` bodies share
//! the enclosing function's scope, so `let` on a bound name rebinds it.

use crate::error::CompileError;
use crate::limits::{self, MAX_LOCALS};
use std::collections::HashMap;

#[derive(Debug)]
pub(crate) struct Scope {
    function: String,
    slots: HashMap<String, u16>,
    names: Vec<String>,
}

impl Scope {
    /// Scope for a function body with its parameters already bound.
    pub(crate) fn new(function: &str, params: &[String], line: usize) -> Result<Self, CompileError> {
        let mut scope = Self {
            function: function.to_string(),
            slots: HashMap::new(),
            names: Vec::with_capacity(params.len()),
        };
        for param in params {
            if scope.lookup(param).is_some() {
                return Err(CompileError::DuplicateParameter {
                    function: function.to_string(),
                    name: param.clone(),
                    line,
                });
            }
            scope.bind(param, line)?;
        }
        Ok(scope)
    }

    pub(crate) fn lookup(&self, name: &str) -> Option<u16> {
        self.slots.get(name).copied()
    }

    /// Slot for `name`, allocating one if it is not bound yet.
    pub(crate) fn bind(&mut self, name: &str, line: usize) -> Result<u16, CompileError> {
        if let Some(slot) = self.lookup(name) {
            return Ok(slot);
        }
        let slot = limits::operand(self.names.len(), MAX_LOCALS, || {
            CompileError::TooManyLocals {
                function: self.function.clone(),
                limit: MAX_LOCALS,
                line,
            }
        })?;
        self.slots.insert(name.to_string(), slot);
        self.names.push(name.to_string());
        Ok(slot)
    }

    /// Slot names indexed by slot number.
    pub(crate) fn into_names(self) -> Vec<String> {
        self.names
    }
}
