//! Builtin function implementations.

use crate::error::RuntimeError;
use oker_common::{Builtin, Value};

/// Call `builtin` with `args` in source order.
pub(crate) fn call(builtin: Builtin, args: &[Value], line: usize) -> Result<Value, RuntimeError> {
    if args.len() != builtin.arity() {
        return Err(RuntimeError::ArityMismatch {
            function: builtin.name().to_string(),
            expected: builtin.arity(),
            found: args.len(),
            line,
        });
    }
    let wrong_kind = |expected: &str, got: &Value| {
        RuntimeError::type_mismatch(
            format!("{}() expects {expected}, got {}", builtin.name(), got.type_tag()),
            line,
        )
    };

    let result = match (builtin, args) {
        (Builtin::Str, [x]) => Value::string(x.to_string()),
        (Builtin::Type, [x]) => Value::string(x.type_tag().name()),
        (Builtin::Bool, [x]) => Value::Bool(x.is_truthy()),
        (Builtin::Strip, [x]) => Value::string(x.to_string().trim()),

        (Builtin::Num, [Value::Number(n)]) => Value::Number(*n),
        (Builtin::Num, [Value::Bool(b)]) => Value::Number(if *b { 1.0 } else { 0.0 }),
        (Builtin::Num, [Value::Str(s)]) => match s.trim().parse::<f64>() {
            Ok(n) => Value::Number(n),
            Err(_) => Value::Nil,
        },
        (Builtin::Num, [x]) => return Err(wrong_kind("a number, string or boolean", x)),

        (Builtin::Len, [Value::Str(s)]) => Value::Number(s.chars().count() as f64),
        (Builtin::Len, [x]) => return Err(wrong_kind("a string", x)),

        (Builtin::Abs, [Value::Number(n)]) => Value::Number(n.abs()),
        (Builtin::Abs, [x]) => return Err(wrong_kind("a number", x)),

        (Builtin::Upper, [Value::Str(s)]) => Value::string(s.to_uppercase()),
        (Builtin::Lower, [Value::Str(s)]) => Value::string(s.to_lowercase()),
        (Builtin::Upper | Builtin::Lower, [x]) => return Err(wrong_kind("a string", x)),

        (Builtin::CharAt, [x, Value::Number(i)]) => char_at(&x.to_string(), *i),
        (Builtin::CharAt, [_, i]) => return Err(wrong_kind("a number index", i)),

        _ => {
            return Err(RuntimeError::malformed(
                format!("{builtin}() called with {} arguments", args.len()),
                line,
            ))
        }
    };
    Ok(result)
}

/// Character `index` (truncated) of `text`, or an empty string when out of range.
fn char_at(text: &str, index: f64) -> Value {
    let index = index.trunc();
    if index.is_nan() || index < 0.0 {
        return Value::string("");
    }
    let picked = text.chars().nth(index as usize);
    Value::string(picked.map(String::from).unwrap_or_default())
}
