//! Operator semantics, keyed by operator and operand kinds.

use crate::error::RuntimeError;
use oker_common::{Opcode, Value};

/// Apply a binary operator. `a` was pushed first.
pub(crate) fn binary(op: Opcode, a: &Value, b: &Value, line: usize) -> Result<Value, RuntimeError> {
    use Value::{Number, Str};

    let result = match (op, a, b) {
        (Opcode::Add, Number(x), Number(y)) => Number(x + y),
        (Opcode::Add, Str(_), _) | (Opcode::Add, _, Str(_)) => {
            Value::string(format!("{a}{b}"))
        }
        (Opcode::Sub, Number(x), Number(y)) => Number(x - y),
        (Opcode::Mul, Number(x), Number(y)) => Number(x * y),
        (Opcode::Div | Opcode::Mod, Number(_), Number(y)) if *y == 0.0 => {
            return Err(RuntimeError::DivisionByZero { line });
        }
        (Opcode::Div, Number(x), Number(y)) => Number(x / y),
        // Rust's `%` on floats truncates toward zero, so the sign follows the dividend.
        (Opcode::Mod, Number(x), Number(y)) => Number(x % y),

        (Opcode::Eq, _, _) => Value::Bool(equals(a, b)),
        (Opcode::Neq, _, _) => Value::Bool(!equals(a, b)),
        (Opcode::Lt, Number(x), Number(y)) => Value::Bool(x < y),
        (Opcode::Gt, Number(x), Number(y)) => Value::Bool(x > y),
        (Opcode::Lte, Number(x), Number(y)) => Value::Bool(x <= y),
        (Opcode::Gte, Number(x), Number(y)) => Value::Bool(x >= y),

        _ => {
            return Err(RuntimeError::type_mismatch(
                format!(
                    "cannot apply '{}' to {} and {}",
                    symbol(op),
                    a.type_tag(),
                    b.type_tag()
                ),
                line,
            ))
        }
    };
    Ok(result)
}

/// `==` on any pair. Values of one kind compare directly; values of
/// different kinds compare by their text forms, so `1 == "1"` holds.
pub(crate) fn equals(a: &Value, b: &Value) -> bool {
    if a.type_tag() == b.type_tag() {
        a == b
    } else {
        a.to_string() == b.to_string()
    }
}

/// Apply unary minus.
pub(crate) fn negate(a: &Value, line: usize) -> Result<Value, RuntimeError> {
    match a {
        Value::Number(x) => Ok(Value::Number(-x)),
        other => Err(RuntimeError::type_mismatch(
            format!("cannot negate {}", other.type_tag()),
            line,
        )),
    }
}

fn symbol(op: Opcode) -> &'static str {
    match op {
        Opcode::Add => "+",
        Opcode::Sub => "-",
        Opcode::Mul => "*",
        Opcode::Div => "/",
        Opcode::Mod => "%",
        Opcode::Eq => "==",
        Opcode::Neq => "!=",
        Opcode::Lt => "<",
        Opcode::Gt => ">",
        Opcode::Lte => "<=",
        Opcode::Gte => ">=",
        other => other.mnemonic(),
    }
}
