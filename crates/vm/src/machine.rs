//! VM state management: operand stack, frame stack, output buffer, budgets.

use crate::config::VmConfig;
use crate::error::RuntimeError;
use oker_common::{CompiledFunction, FunctionRef, Instruction, Program, Value};
use std::rc::Rc;
use std::time::Instant;

/// The wall clock is consulted once every this many instructions.
pub(crate) const CLOCK_CHECK_INTERVAL: u64 = 4096;

/// One function activation.
#[derive(Debug, Clone)]
pub struct CallFrame<'a> {
    /// The function being executed.
    pub function: &'a CompiledFunction,
    /// Index of the next instruction in `function.code`.
    pub pc: usize,
    /// Operand stack height when the frame was entered, callee excluded.
    pub base: usize,
    /// Local slots. `None` until first assigned.
    pub locals: Vec<Option<Value>>,
}

impl<'a> CallFrame<'a> {
    pub(crate) fn new(function: &'a CompiledFunction, base: usize) -> Self {
        Self {
            function,
            pc: 0,
            base,
            locals: vec![None; function.local_count],
        }
    }
}

/// The Oker virtual machine.
///
/// A VM runs one program once. Nothing is shared between runs.
pub struct VM<'a> {
    /// The program being executed.
    pub(crate) program: &'a Program,
    pub(crate) config: VmConfig,
    /// Operand stack shared by all frames.
    pub(crate) stack: Vec<Value>,
    /// Frame stack. `frames[0]` is `<main>`.
    pub(crate) frames: Vec<CallFrame<'a>>,
    /// Text produced by `say`.
    pub(crate) output: String,
    /// Function names, shared by every function value pushed.
    pub(crate) function_names: Vec<Rc<str>>,
    /// Source line of the instruction being executed.
    pub(crate) line: usize,
    /// Instructions executed so far.
    pub(crate) steps: u64,
    pub(crate) started: Instant,
}

impl<'a> VM<'a> {
    /// Create a VM with default limits.
    pub fn new(program: &'a Program) -> Self {
        Self::with_config(program, VmConfig::default())
    }

    /// Create a VM with the given limits.
    pub fn with_config(program: &'a Program, config: VmConfig) -> Self {
        Self {
            program,
            config,
            stack: Vec::new(),
            frames: Vec::new(),
            output: String::new(),
            function_names: program
                .functions
                .iter()
                .map(|f| Rc::from(f.name.as_str()))
                .collect(),
            line: 0,
            steps: 0,
            started: Instant::now(),
        }
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Push a value onto the operand stack.
    pub(crate) fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    /// Pop a value, refusing to dip below the current frame's base.
    pub(crate) fn pop(&mut self) -> Result<Value, RuntimeError> {
        let base = self.frames.last().map_or(0, |f| f.base);
        if self.stack.len() <= base {
            return Err(RuntimeError::malformed("stack underflow", self.line));
        }
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::malformed("stack underflow", self.line))
    }

    /// Pop `count` values, returned in push order.
    pub(crate) fn pop_n(&mut self, count: usize) -> Result<Vec<Value>, RuntimeError> {
        let base = self.frames.last().map_or(0, |f| f.base);
        if self.stack.len() < base + count {
            return Err(RuntimeError::malformed("stack underflow", self.line));
        }
        Ok(self.stack.split_off(self.stack.len() - count))
    }

    pub(crate) fn frame(&self) -> Result<&CallFrame<'a>, RuntimeError> {
        self.frames
            .last()
            .ok_or_else(|| RuntimeError::malformed("no active frame", self.line))
    }

    pub(crate) fn frame_mut(&mut self) -> Result<&mut CallFrame<'a>, RuntimeError> {
        let line = self.line;
        self.frames
            .last_mut()
            .ok_or_else(|| RuntimeError::malformed("no active frame", line))
    }

    /// Fetch the next instruction of the current frame and advance its pc.
    pub(crate) fn fetch(&mut self) -> Result<Instruction, RuntimeError> {
        let line = self.line;
        let frame = self.frame_mut()?;
        let instr = frame.function.code.get(frame.pc).copied().ok_or_else(|| {
            RuntimeError::malformed(
                format!("fell off the end of '{}'", frame.function.name),
                line,
            )
        })?;
        frame.pc += 1;
        self.line = instr.line;
        Ok(instr)
    }

    /// Charge one instruction against the budgets.
    pub(crate) fn tick(&mut self) -> Result<(), RuntimeError> {
        self.steps += 1;
        if self.steps > self.config.max_instructions {
            return Err(RuntimeError::ExecutionTimeout {
                reason: format!(
                    "instruction budget of {} exhausted",
                    self.config.max_instructions
                ),
                line: self.line,
            });
        }
        if let Some(limit) = self.config.time_limit {
            if self.steps % CLOCK_CHECK_INTERVAL == 0 && self.started.elapsed() > limit {
                return Err(RuntimeError::ExecutionTimeout {
                    reason: format!("time limit of {} ms exceeded", limit.as_millis()),
                    line: self.line,
                });
            }
        }
        Ok(())
    }

    /// Refuse a string result longer than the configured cap.
    pub(crate) fn check_string(&self, value: &Value) -> Result<(), RuntimeError> {
        match value {
            Value::Str(s) if s.len() > self.config.max_string_len => Err(RuntimeError::SizeLimit {
                what: "string",
                limit: self.config.max_string_len,
                line: self.line,
            }),
            _ => Ok(()),
        }
    }

    /// Append one `say` line to the output, within the output cap.
    pub(crate) fn print_line(&mut self, text: &str) -> Result<(), RuntimeError> {
        if self.output.len() + text.len() + 1 > self.config.max_output_len {
            return Err(RuntimeError::SizeLimit {
                what: "output",
                limit: self.config.max_output_len,
                line: self.line,
            });
        }
        self.output.push_str(text);
        self.output.push('\n');
        Ok(())
    }

    /// Function value for table entry `index`.
    pub(crate) fn function_value(&self, index: u16) -> Result<Value, RuntimeError> {
        let name = self
            .function_names
            .get(usize::from(index))
            .ok_or_else(|| {
                RuntimeError::malformed(format!("function index {index} out of range"), self.line)
            })?;
        Ok(Value::Function(FunctionRef {
            index,
            name: Rc::clone(name),
        }))
    }
}
