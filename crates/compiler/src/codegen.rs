//! Pass 2: lower statement lists to bytecode.
//!
//! Each function body (and the implicit `<main>`) is compiled by its own
//! [`FunctionCompiler`] against a shared constant pool and the function
//! table from pass 1.

use crate::declare::FunctionTable;
use crate::error::CompileError;
use crate::limits::{self, MAX_ARGUMENTS, MAX_CONSTANTS, MAX_FUNCTION_SIZE};
use crate::scope::Scope;
use oker_common::{Builtin, CompiledFunction, Instruction, Opcode, Value};
use oker_syntax::ast::{BinaryOp, Expr, ExprKind, Stmt, StmtKind, UnaryOp};
use std::collections::HashMap;

/// Dedup key for the constant pool. Numbers compare by bit pattern so `0`
/// and `-0` stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ConstKey {
    Number(u64),
    Str(String),
    Bool(bool),
    Nil,
}

/// Program-wide deduplicated constant pool.
#[derive(Debug, Default)]
pub(crate) struct ConstantPool {
    values: Vec<Value>,
    index: HashMap<ConstKey, u16>,
}

impl ConstantPool {
    fn intern(&mut self, key: ConstKey, line: usize) -> Result<u16, CompileError> {
        if let Some(&k) = self.index.get(&key) {
            return Ok(k);
        }
        let k = limits::operand(self.values.len(), MAX_CONSTANTS, || {
            CompileError::TooManyConstants {
                limit: MAX_CONSTANTS,
                line,
            }
        })?;
        let value = match &key {
            ConstKey::Number(bits) => Value::Number(f64::from_bits(*bits)),
            ConstKey::Str(s) => Value::string(s.as_str()),
            ConstKey::Bool(b) => Value::Bool(*b),
            ConstKey::Nil => Value::Nil,
        };
        self.values.push(value);
        self.index.insert(key, k);
        Ok(k)
    }

    pub(crate) fn into_values(self) -> Vec<Value> {
        self.values
    }
}

/// Compiles one function body.
pub(crate) struct FunctionCompiler<'p, 'a> {
    pool: &'p mut ConstantPool,
    functions: &'p FunctionTable<'a>,
    scope: Scope,
    code: Vec<Instruction>,
    name: String,
    arity: usize,
    /// False for `<main>`.
    in_function: bool,
}

impl<'p, 'a> FunctionCompiler<'p, 'a> {
    pub(crate) fn new(
        pool: &'p mut ConstantPool,
        functions: &'p FunctionTable<'a>,
        name: &str,
        params: &[String],
        in_function: bool,
        line: usize,
    ) -> Result<Self, CompileError> {
        Ok(Self {
            pool,
            functions,
            scope: Scope::new(name, params, line)?,
            code: Vec::new(),
            name: name.to_string(),
            arity: params.len(),
            in_function,
        })
    }

    /// Compile `body` and append the implicit `CONST nil; RETURN`.
    pub(crate) fn finish(
        mut self,
        body: &[Stmt],
        line: usize,
    ) -> Result<CompiledFunction, CompileError> {
        self.block(body)?;
        let end_line = body.last().map_or(line, |s| s.line);
        self.emit_const(ConstKey::Nil, end_line)?;
        self.emit(Opcode::Return, end_line);

        let local_names = self.scope.into_names();
        let function = CompiledFunction {
            name: self.name,
            arity: self.arity,
            local_count: local_names.len(),
            local_names,
            code: self.code,
        };
        limits::check_function(&function, line)?;
        Ok(function)
    }

    // ---- emission helpers ----

    fn emit(&mut self, opcode: Opcode, line: usize) {
        self.code.push(Instruction::simple(opcode, line));
    }

    fn emit_arg(&mut self, opcode: Opcode, arg: u16, line: usize) {
        self.code.push(Instruction::with_arg(opcode, arg, line));
    }

    fn emit_const(&mut self, key: ConstKey, line: usize) -> Result<(), CompileError> {
        let k = self.pool.intern(key, line)?;
        self.emit_arg(Opcode::Const, k, line);
        Ok(())
    }

    /// Emit a jump with a placeholder target; returns its offset for patching.
    fn emit_jump(&mut self, opcode: Opcode, line: usize) -> usize {
        self.emit_arg(opcode, 0, line);
        self.code.len() - 1
    }

    /// Current offset as a jump target.
    fn here(&self, line: usize) -> Result<u16, CompileError> {
        u16::try_from(self.code.len()).map_err(|_| CompileError::FunctionTooLarge {
            function: self.name.clone(),
            size: self.code.len(),
            limit: MAX_FUNCTION_SIZE,
            line,
        })
    }

    fn patch_to_here(&mut self, at: usize, line: usize) -> Result<(), CompileError> {
        let target = self.here(line)?;
        self.code[at].arg1 = target;
        Ok(())
    }

    // ---- statements ----

    fn block(&mut self, statements: &[Stmt]) -> Result<(), CompileError> {
        for stmt in statements {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        let line = stmt.line;
        match &stmt.kind {
            StmtKind::Let { name, value } => {
                self.expression(value)?;
                let slot = self.scope.bind(name, line)?;
                self.emit_arg(Opcode::StoreLocal, slot, line);
            }
            StmtKind::Say { value } => {
                self.expression(value)?;
                self.emit(Opcode::Print, line);
            }
            // Compiled separately from the function table.
            StmtKind::Function(_) => {}
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.expression(condition)?;
                let to_else = self.emit_jump(Opcode::JumpIfFalse, line);
                self.block(then_branch)?;
                match else_branch {
                    Some(else_branch) => {
                        let to_end = self.emit_jump(Opcode::Jump, line);
                        self.patch_to_here(to_else, line)?;
                        self.block(else_branch)?;
                        self.patch_to_here(to_end, line)?;
                    }
                    None => self.patch_to_here(to_else, line)?,
                }
            }
            StmtKind::While { condition, body } => {
                let top = self.here(line)?;
                self.expression(condition)?;
                let exit = self.emit_jump(Opcode::JumpIfFalse, line);
                self.block(body)?;
                self.emit_arg(Opcode::Jump, top, line);
                self.patch_to_here(exit, line)?;
            }
            StmtKind::Return { value } => {
                if !self.in_function {
                    return Err(CompileError::ReturnOutsideFunction { line });
                }
                match value {
                    Some(value) => self.expression(value)?,
                    None => self.emit_const(ConstKey::Nil, line)?,
                }
                self.emit(Opcode::Return, line);
            }
            StmtKind::Expr(expr) => {
                self.expression(expr)?;
                self.emit(Opcode::Pop, line);
            }
        }
        Ok(())
    }

    // ---- expressions ----

    fn expression(&mut self, expr: &Expr) -> Result<(), CompileError> {
        let line = expr.line;
        match &expr.kind {
            ExprKind::Number(n) => self.emit_const(ConstKey::Number(n.to_bits()), line)?,
            ExprKind::Str(s) => self.emit_const(ConstKey::Str(s.clone()), line)?,
            ExprKind::Bool(b) => self.emit_const(ConstKey::Bool(*b), line)?,
            ExprKind::Nil => self.emit_const(ConstKey::Nil, line)?,
            ExprKind::Identifier(name) => {
                if let Some(slot) = self.scope.lookup(name) {
                    self.emit_arg(Opcode::LoadLocal, slot, line);
                } else if let Some(index) = self.functions.lookup(name) {
                    self.emit_arg(Opcode::LoadFunction, index, line);
                } else {
                    return Err(CompileError::UndefinedVariable {
                        name: name.clone(),
                        line,
                    });
                }
            }
            ExprKind::Binary { op, left, right } => {
                self.expression(left)?;
                self.expression(right)?;
                self.emit(binary_opcode(*op), line);
            }
            ExprKind::Unary { op, operand } => {
                self.expression(operand)?;
                match op {
                    UnaryOp::Neg => self.emit(Opcode::Neg, line),
                }
            }
            ExprKind::Call { callee, args } => self.call(callee, args, line)?,
        }
        Ok(())
    }

    fn call(&mut self, callee: &str, args: &[Expr], line: usize) -> Result<(), CompileError> {
        let argc = limits::operand(args.len(), MAX_ARGUMENTS + 1, || {
            CompileError::TooManyArguments {
                count: args.len(),
                limit: MAX_ARGUMENTS,
                line,
            }
        })?;

        let callee_load = if let Some(slot) = self.scope.lookup(callee) {
            Some((Opcode::LoadLocal, slot))
        } else {
            self.functions
                .lookup(callee)
                .map(|index| (Opcode::LoadFunction, index))
        };

        if let Some((opcode, operand)) = callee_load {
            self.emit_arg(opcode, operand, line);
            for arg in args {
                self.expression(arg)?;
            }
            self.emit_arg(Opcode::Call, argc, line);
            return Ok(());
        }

        let Some(builtin) = Builtin::from_name(callee) else {
            return Err(CompileError::UndefinedFunction {
                name: callee.to_string(),
                line,
            });
        };
        for arg in args {
            self.expression(arg)?;
        }
        self.code.push(Instruction::new(
            Opcode::CallBuiltin,
            builtin.id(),
            argc,
            line,
        ));
        Ok(())
    }
}

fn binary_opcode(op: BinaryOp) -> Opcode {
    match op {
        BinaryOp::Add => Opcode::Add,
        BinaryOp::Sub => Opcode::Sub,
        BinaryOp::Mul => Opcode::Mul,
        BinaryOp::Div => Opcode::Div,
        BinaryOp::Mod => Opcode::Mod,
        BinaryOp::Eq => Opcode::Eq,
        BinaryOp::Neq => Opcode::Neq,
        BinaryOp::Lt => Opcode::Lt,
        BinaryOp::Gt => Opcode::Gt,
        BinaryOp::Lte => Opcode::Lte,
        BinaryOp::Gte => Opcode::Gte,
    }
}
