//! Main execution loop and opcode dispatch for the Oker VM.

use crate::builtins;
use crate::error::RuntimeError;
use crate::machine::{CallFrame, VM};
use crate::ops;
use oker_common::{Builtin, Instruction, Opcode, Value};

impl<'a> VM<'a> {
    /// Run `<main>` to completion and return everything `say` printed.
    pub fn execute(&mut self) -> Result<String, RuntimeError> {
        let program = self.program;
        self.frames.push(CallFrame::new(&program.main, 0));

        loop {
            let instr = self.fetch()?;
            self.tick()?;

            match instr.opcode {
                // Constants & variables
                Opcode::Const => self.exec_const(&instr)?,
                Opcode::LoadLocal => self.exec_load_local(&instr)?,
                Opcode::StoreLocal => self.exec_store_local(&instr)?,
                Opcode::LoadFunction => {
                    let value = self.function_value(instr.arg1)?;
                    self.push(value);
                }

                // Arithmetic & comparison
                Opcode::Add
                | Opcode::Sub
                | Opcode::Mul
                | Opcode::Div
                | Opcode::Mod
                | Opcode::Eq
                | Opcode::Neq
                | Opcode::Lt
                | Opcode::Gt
                | Opcode::Lte
                | Opcode::Gte => self.exec_binary(instr.opcode)?,
                Opcode::Neg => {
                    let a = self.pop()?;
                    let result = ops::negate(&a, self.line)?;
                    self.push(result);
                }

                // Functions
                Opcode::Call => self.exec_call(&instr)?,
                Opcode::CallBuiltin => self.exec_call_builtin(&instr)?,
                Opcode::Return => {
                    if let Some(value) = self.exec_return()? {
                        tracing::debug!(
                            steps = self.steps,
                            result = %value,
                            "program finished"
                        );
                        return Ok(std::mem::take(&mut self.output));
                    }
                }

                // Control flow
                Opcode::Jump => self.jump_to(instr.arg1)?,
                Opcode::JumpIfFalse => {
                    let condition = self.pop()?;
                    if !condition.is_truthy() {
                        self.jump_to(instr.arg1)?;
                    }
                }

                // Statements
                Opcode::Pop => {
                    self.pop()?;
                }
                Opcode::Print => {
                    let value = self.pop()?;
                    self.print_line(&value.to_string())?;
                }
            }
        }
    }

    // ---- Constants & variables ----

    fn exec_const(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.program.constant(instr.arg1).cloned().ok_or_else(|| {
            RuntimeError::malformed(format!("constant {} out of range", instr.arg1), self.line)
        })?;
        self.push(value);
        Ok(())
    }

    fn exec_load_local(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let line = self.line;
        let frame = self.frame()?;
        let slot = usize::from(instr.arg1);
        let value = match frame.locals.get(slot) {
            Some(Some(value)) => value.clone(),
            Some(None) => {
                let name = frame
                    .function
                    .local_names
                    .get(slot)
                    .cloned()
                    .unwrap_or_else(|| format!("slot {slot}"));
                return Err(RuntimeError::UndefinedVariable { name, line });
            }
            None => {
                return Err(RuntimeError::malformed(
                    format!("local slot {slot} out of range"),
                    line,
                ))
            }
        };
        self.push(value);
        Ok(())
    }

    fn exec_store_local(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let value = self.pop()?;
        let line = self.line;
        let slot = usize::from(instr.arg1);
        let target = self
            .frame_mut()?
            .locals
            .get_mut(slot)
            .ok_or_else(|| RuntimeError::malformed(format!("local slot {slot} out of range"), line))?;
        *target = Some(value);
        Ok(())
    }

    // ---- Operators ----

    fn exec_binary(&mut self, op: Opcode) -> Result<(), RuntimeError> {
        let b = self.pop()?;
        let a = self.pop()?;
        let result = ops::binary(op, &a, &b, self.line)?;
        self.check_string(&result)?;
        self.push(result);
        Ok(())
    }

    // ---- Functions ----

    fn exec_call(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let argc = usize::from(instr.arg1);
        let args = self.pop_n(argc)?;
        let callee = self.pop()?;

        let func_ref = match callee {
            Value::Function(func_ref) => func_ref,
            other => {
                return Err(RuntimeError::type_mismatch(
                    format!("cannot call a {}", other.type_tag()),
                    self.line,
                ))
            }
        };
        let program = self.program;
        let function = program.function(func_ref.index).ok_or_else(|| {
            RuntimeError::malformed(
                format!("function index {} out of range", func_ref.index),
                self.line,
            )
        })?;

        if argc != function.arity {
            return Err(RuntimeError::ArityMismatch {
                function: function.name.clone(),
                expected: function.arity,
                found: argc,
                line: self.line,
            });
        }
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                limit: self.config.max_call_depth,
                line: self.line,
            });
        }

        let mut frame = CallFrame::new(function, self.stack.len());
        for (slot, arg) in frame.locals.iter_mut().zip(args) {
            *slot = Some(arg);
        }
        tracing::trace!(
            function = %function.name,
            depth = self.frames.len() + 1,
            "enter frame"
        );
        self.frames.push(frame);
        Ok(())
    }

    fn exec_call_builtin(&mut self, instr: &Instruction) -> Result<(), RuntimeError> {
        let builtin = Builtin::from_id(instr.arg1).ok_or_else(|| {
            RuntimeError::malformed(format!("unknown builtin id {}", instr.arg1), self.line)
        })?;
        let args = self.pop_n(usize::from(instr.arg2))?;
        let result = builtins::call(builtin, &args, self.line)?;
        self.check_string(&result)?;
        self.push(result);
        Ok(())
    }

    /// Pop the current frame. Returns the value when `<main>` returns.
    fn exec_return(&mut self) -> Result<Option<Value>, RuntimeError> {
        let value = self.pop()?;
        let frame = self
            .frames
            .pop()
            .ok_or_else(|| RuntimeError::malformed("return without a frame", self.line))?;
        self.stack.truncate(frame.base);

        if self.frames.is_empty() {
            return Ok(Some(value));
        }
        self.push(value);
        Ok(None)
    }

    // ---- Control flow ----

    fn jump_to(&mut self, target: u16) -> Result<(), RuntimeError> {
        let line = self.line;
        let frame = self.frame_mut()?;
        let target = usize::from(target);
        if target >= frame.function.code.len() {
            return Err(RuntimeError::malformed(
                format!("jump target {target} out of range"),
                line,
            ));
        }
        frame.pc = target;
        Ok(())
    }
}
