//! Integration tests for the Oker VM.
//!
//! Organized by concern: whole programs compiled from source, operator
//! semantics, calls and frames, limits, and hand-built bytecode that breaks
//! compiler invariants.

use oker_common::{CompiledFunction, Instruction, Opcode, Program, Value, MAIN_NAME};
use oker_compiler::compile;
use oker_syntax::{parse, tokenize};
use oker_vm::{run, run_with, RuntimeError, VmConfig};
use proptest::prelude::*;
use std::time::Duration;

// ============================================================
// Helper functions
// ============================================================

fn compile_src(source: &str) -> Program {
    let tokens = tokenize(source).unwrap();
    compile(&parse(&tokens).unwrap()).unwrap()
}

/// Compile and run with default limits.
fn run_src(source: &str) -> Result<String, RuntimeError> {
    run(&compile_src(source))
}

fn output(source: &str) -> String {
    run_src(source).unwrap()
}

fn instr(op: Opcode, arg1: u16) -> Instruction {
    Instruction::with_arg(op, arg1, 1)
}

/// Program with only a `<main>` body.
fn main_only(constants: Vec<Value>, code: Vec<Instruction>) -> Program {
    let mut main = CompiledFunction::new(MAIN_NAME, &[]);
    main.code = code;
    Program::new(constants, vec![], main)
}

// ============================================================
// Whole programs
// ============================================================

#[test]
fn hello_world() {
    assert_eq!(output("say \"Hello, World!\""), "Hello, World!\n");
}

#[test]
fn empty_program_prints_nothing() {
    assert_eq!(output(""), "");
    assert_eq!(output("~ only a comment"), "");
}

#[test]
fn counting_loop_rebinds() {
    let src = "let i = 0\nwhile i < 3:\n  say str(i)\n  let i = i + 1\nend";
    assert_eq!(output(src), "0\n1\n2\n");
}

#[test]
fn factorial_of_five() {
    let src = "\
makef factorial(n):
    if n <= 1:
        return 1
    else:
        return n * factorial(n - 1)
    end
end
say factorial(5)";
    assert_eq!(output(src), "120\n");
}

#[test]
fn fibonacci_sequence() {
    let src = "\
makef fibonacci(n):
    if n <= 1:
        return n
    end
    return fibonacci(n - 1) + fibonacci(n - 2)
end
let i = 0
while i < 10:
    say fibonacci(i)
    let i = i + 1
end";
    assert_eq!(output(src), "0\n1\n1\n2\n3\n5\n8\n13\n21\n34\n");
}

#[test]
fn function_without_return_yields_nil() {
    assert_eq!(output("makef f(): let x = 1 end\nsay f()"), "nil\n");
    assert_eq!(output("makef f(): return end\nsay f()"), "nil\n");
}

#[test]
fn nested_function_is_globally_callable() {
    let src = "makef outer():\n  makef inner(x): return x + 1 end\n  return inner(1)\nend\nsay outer()\nsay inner(10)";
    assert_eq!(output(src), "2\n11\n");
}

#[test]
fn redeclared_function_last_wins_everywhere() {
    let src = "makef f(): return 1 end\nsay f()\nmakef f(): return 2 end\nsay f()";
    assert_eq!(output(src), "2\n2\n");
}

#[test]
fn functions_are_values() {
    let src = "makef twice(x): return x * 2 end\nlet g = twice\nsay g(21)\nsay g\nsay type(1) + \" \" + str(g)";
    assert_eq!(output(src), "42\n<fn twice>\nnumber <fn twice>\n");
}

#[test]
fn locals_are_per_activation() {
    let src = "\
makef countdown(n):
    let label = \"n=\" + str(n)
    if n > 0:
        countdown(n - 1)
    end
    say label
end
countdown(2)";
    assert_eq!(output(src), "n=0\nn=1\nn=2\n");
}

#[test]
fn statement_expressions_leave_stack_balanced() {
    let src = "makef f(): return 1 end\nlet i = 0\nwhile i < 1000:\n  f()\n  1 + 2\n  let i = i + 1\nend\nsay i";
    assert_eq!(output(src), "1000\n");
}

// ============================================================
// Values and operators
// ============================================================

#[test]
fn number_formatting() {
    assert_eq!(output("say 10 / 4"), "2.5\n");
    assert_eq!(output("say 3 * 40"), "120\n");
    assert_eq!(output("say 0.1 + 0.2"), "0.30000000000000004\n");
    assert_eq!(output("say -0"), "-0\n");
}

#[test]
fn concatenation_with_numbers() {
    assert_eq!(output("say \"total: \" + 5"), "total: 5\n");
    assert_eq!(output("say 1 + 2 + \"x\""), "3x\n");
    assert_eq!(output("say \"x\" + 1 + 2"), "x12\n");
}

#[test]
fn modulo_truncates_toward_zero() {
    assert_eq!(output("say -7 % 3\nsay 7 % -3\nsay 7 % 3"), "-1\n1\n1\n");
}

#[test]
fn equality_across_kinds() {
    let src = "\
say 1 == \"1\"
say 2.5 == \"2.5\"
say true == \"true\"
say nil == \"nil\"
say nil == nil
say true != 1
say 1 == \"01\"";
    assert_eq!(output(src), "true\ntrue\ntrue\ntrue\ntrue\ntrue\nfalse\n");
}

#[test]
fn equality_with_converted_input() {
    let src = "\
let answer = \"42\"
if answer == 42: say \"match\" else: say \"differ\" end";
    assert_eq!(output(src), "match\n");
}

#[test]
fn truthiness_in_conditions() {
    let src = "\
if 0: say \"zero\" else: say \"no zero\" end
if \"\": say \"empty\" else: say \"no empty\" end
if nil: say \"nil\" else: say \"no nil\" end
if \"text\": say \"text\" end
if 2: say \"two\" end
if \"false\": say \"false text\" else: say \"no false text\" end
if num(\"NaN\"): say \"nan\" end";
    assert_eq!(
        output(src),
        "no zero\nno empty\nno nil\ntext\ntwo\nno false text\nnan\n"
    );
}

#[test]
fn while_stops_on_false_text() {
    let src = "\
let flag = \"true\"
let n = 0
while flag:
    let n = n + 1
    if n == 3: let flag = str(false) end
end
say n";
    assert_eq!(output(src), "3\n");
}

#[test]
fn builtins_from_source() {
    assert_eq!(output("say len(\"hello\")"), "5\n");
    assert_eq!(output("say upper(\"oker\") + lower(\"OKER\")"), "OKERoker\n");
    assert_eq!(output("say num(\"12.5\") * 2"), "25\n");
    assert_eq!(output("say num(\"twelve\")"), "nil\n");
    assert_eq!(output("say abs(-3)"), "3\n");
    assert_eq!(output("say type(\"s\") + type(true) + type(nil)"), "stringbooleannil\n");
}

#[test]
fn text_builtins_from_source() {
    assert_eq!(output("say bool(0) + \" \" + bool(\"yes\") + \" \" + bool(\"false\")"), "false true false\n");
    assert_eq!(output("say \"[\" + strip(\"  padded  \") + \"]\""), "[padded]\n");
    let src = "\
let word = \"oker\"
let i = 0
let out = \"\"
while i < len(word):
    let out = charAt(word, i) + out
    let i = i + 1
end
say out
say charAt(word, 10) == \"\"";
    assert_eq!(output(src), "reko\ntrue\n");
}

#[test]
fn char_at_arity_checked_at_runtime() {
    assert!(matches!(
        run_src("say charAt(\"oker\")"),
        Err(RuntimeError::ArityMismatch { expected: 2, found: 1, line: 1, .. })
    ));
}

#[test]
fn division_by_zero() {
    assert_eq!(
        run_src("say 1\nsay 1 / 0"),
        Err(RuntimeError::DivisionByZero { line: 2 })
    );
    assert_eq!(
        run_src("say 5 % 0"),
        Err(RuntimeError::DivisionByZero { line: 1 })
    );
}

#[test]
fn failed_run_does_not_affect_next() {
    let bad = compile_src("say 1 / 0");
    let good = compile_src("say 6 / 3");
    assert!(run(&bad).is_err());
    assert_eq!(run(&good).unwrap(), "2\n");
    assert!(run(&bad).is_err());
}

#[test]
fn type_mismatch_reports_kinds() {
    let err = run_src("say \"a\" - 1").unwrap_err();
    assert_eq!(
        err.to_string(),
        "line 1: type mismatch: cannot apply '-' to string and number"
    );
    assert!(matches!(
        run_src("say -\"a\""),
        Err(RuntimeError::TypeMismatch { .. })
    ));
    assert!(matches!(
        run_src("say \"a\" < \"b\""),
        Err(RuntimeError::TypeMismatch { .. })
    ));
}

#[test]
fn builtin_arity_checked_at_runtime() {
    assert!(matches!(
        run_src("say len(\"a\", \"b\")"),
        Err(RuntimeError::ArityMismatch { expected: 1, found: 2, .. })
    ));
}

// ============================================================
// Calls and frames
// ============================================================

#[test]
fn arity_mismatch() {
    let err = run_src("makef add(a, b): return a + b end\nsay add(1)").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::ArityMismatch {
            function: "add".into(),
            expected: 2,
            found: 1,
            line: 2
        }
    );
}

#[test]
fn calling_a_non_function() {
    let err = run_src("let x = 5\nx()").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::TypeMismatch {
            message: "cannot call a number".into(),
            line: 2
        }
    );
}

#[test]
fn conditional_assignment_then_read() {
    let err = run_src("if false:\n  let x = 1\nend\nsay x").unwrap_err();
    assert_eq!(
        err,
        RuntimeError::UndefinedVariable {
            name: "x".into(),
            line: 4
        }
    );
}

#[test]
fn unbounded_recursion_overflows_at_limit() {
    let program = compile_src("makef f(n): return f(n + 1) end\nf(0)");
    let err = run_with(&program, VmConfig::default().with_max_call_depth(50)).unwrap_err();
    assert_eq!(err, RuntimeError::StackOverflow { limit: 50, line: 1 });

    let err = run(&program).unwrap_err();
    assert!(matches!(err, RuntimeError::StackOverflow { limit: 1024, .. }));
}

#[test]
fn recursion_within_limit_succeeds() {
    let program = compile_src("makef down(n):\n  if n == 0: return 0 end\n  return down(n - 1)\nend\nsay down(40)");
    let out = run_with(&program, VmConfig::default().with_max_call_depth(42)).unwrap();
    assert_eq!(out, "0\n");
}

// ============================================================
// Limits
// ============================================================

#[test]
fn infinite_loop_hits_instruction_budget() {
    let program = compile_src("while true:\nend");
    let config = VmConfig::default().with_max_instructions(10_000);
    let err = run_with(&program, config).unwrap_err();
    assert!(matches!(err, RuntimeError::ExecutionTimeout { .. }));
    assert!(err.to_string().contains("instruction budget of 10000"));
}

#[test]
fn infinite_loop_hits_wall_clock() {
    let program = compile_src("let i = 0\nwhile true:\n  let i = i + 1\nend");
    let config = VmConfig::default()
        .with_max_instructions(u64::MAX)
        .with_time_limit(Some(Duration::from_millis(20)));
    let err = run_with(&program, config).unwrap_err();
    assert!(err.to_string().contains("time limit of 20 ms"));
}

#[test]
fn budget_is_exact() {
    // CONST; PRINT; CONST nil; RETURN
    let program = compile_src("say 1");
    assert!(run_with(&program, VmConfig::default().with_max_instructions(4)).is_ok());
    assert!(run_with(&program, VmConfig::default().with_max_instructions(3)).is_err());
}

#[test]
fn doubling_string_hits_default_size_cap() {
    let src = "let s = \"x\"\nwhile true:\n  let s = s + s\nend";
    let err = run_src(src).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::SizeLimit {
            what: "string",
            limit: 16 * 1024 * 1024,
            line: 3
        }
    );
}

#[test]
fn string_cap_is_inclusive() {
    let config = VmConfig::default().with_max_string_len(8);
    let ok = compile_src("say \"abcd\" + \"efgh\"");
    assert_eq!(run_with(&ok, config).unwrap(), "abcdefgh\n");

    let too_long = compile_src("say 1\nsay \"abcd\" + \"efgh\" + 1");
    let err = run_with(&too_long, config).unwrap_err();
    assert_eq!(err.to_string(), "line 2: string exceeds the limit of 8 bytes");
}

#[test]
fn builtin_results_are_capped() {
    let config = VmConfig::default().with_max_string_len(4);
    // "ß" upper-cases to "SS" at the same byte length; "ΐ" grows from two bytes to six.
    let fits = compile_src("say upper(\"ßß\")");
    assert_eq!(run_with(&fits, config).unwrap(), "SSSS\n");
    let grows = compile_src("say upper(\"ΐ\")");
    assert!(matches!(
        run_with(&grows, config),
        Err(RuntimeError::SizeLimit { what: "string", limit: 4, .. })
    ));
}

#[test]
fn endless_say_hits_output_cap() {
    let program = compile_src("while true:\n  say \"hello\"\nend");
    let config = VmConfig::default().with_max_output_len(20);
    let err = run_with(&program, config).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::SizeLimit {
            what: "output",
            limit: 20,
            line: 2
        }
    );
}

#[test]
fn output_cap_counts_newlines() {
    let program = compile_src("say 1234");
    assert_eq!(
        run_with(&program, VmConfig::default().with_max_output_len(5)).unwrap(),
        "1234\n"
    );
    assert!(run_with(&program, VmConfig::default().with_max_output_len(4)).is_err());
}

// ============================================================
// Malformed bytecode
// ============================================================

#[test]
fn empty_main_falls_off_end() {
    let err = run(&main_only(vec![], vec![])).unwrap_err();
    assert!(matches!(err, RuntimeError::MalformedBytecode { .. }));
}

#[test]
fn stack_underflow_is_malformed() {
    let program = main_only(vec![], vec![Instruction::simple(Opcode::Add, 1)]);
    let err = run(&program).unwrap_err();
    assert_eq!(
        err,
        RuntimeError::MalformedBytecode {
            reason: "stack underflow".into(),
            line: 1
        }
    );
}

#[test]
fn constant_out_of_range() {
    let program = main_only(vec![], vec![instr(Opcode::Const, 3)]);
    assert!(matches!(
        run(&program),
        Err(RuntimeError::MalformedBytecode { .. })
    ));
}

#[test]
fn jump_out_of_range() {
    let program = main_only(vec![], vec![instr(Opcode::Jump, 40)]);
    assert!(matches!(
        run(&program),
        Err(RuntimeError::MalformedBytecode { .. })
    ));
}

#[test]
fn unknown_builtin_id() {
    let program = main_only(
        vec![Value::Nil],
        vec![
            instr(Opcode::Const, 0),
            Instruction::new(Opcode::CallBuiltin, 99, 1, 1),
        ],
    );
    assert!(matches!(
        run(&program),
        Err(RuntimeError::MalformedBytecode { .. })
    ));
}

#[test]
fn callee_cannot_pop_caller_values() {
    let mut f = CompiledFunction::new("f", &[]);
    f.code = vec![Instruction::simple(Opcode::Pop, 2)];
    let mut main = CompiledFunction::new(MAIN_NAME, &[]);
    main.code = vec![
        instr(Opcode::Const, 0),
        instr(Opcode::LoadFunction, 0),
        instr(Opcode::Call, 0),
    ];
    let program = Program::new(vec![Value::Number(1.0)], vec![f], main);
    assert_eq!(
        run(&program),
        Err(RuntimeError::MalformedBytecode {
            reason: "stack underflow".into(),
            line: 2
        })
    );
}

// ============================================================
// Properties
// ============================================================

#[derive(Debug, Clone)]
enum Arith {
    Lit(u32),
    Bin(Box<Arith>, char, Box<Arith>),
}

fn arb_arith() -> impl Strategy<Value = Arith> {
    let leaf = (0u32..10_000).prop_map(Arith::Lit);
    leaf.prop_recursive(5, 48, 2, |inner| {
        (inner.clone(), prop::sample::select(vec!['+', '-', '*', '/']), inner)
            .prop_map(|(l, op, r)| Arith::Bin(Box::new(l), op, Box::new(r)))
    })
}

/// Source text with minimal parentheses: only where precedence or left
/// associativity requires them.
fn render(a: &Arith) -> String {
    fn prec(op: char) -> u8 {
        if op == '+' || op == '-' {
            1
        } else {
            2
        }
    }
    match a {
        Arith::Lit(n) => n.to_string(),
        Arith::Bin(l, op, r) => {
            let left = match &**l {
                Arith::Bin(_, lop, _) if prec(*lop) < prec(*op) => format!("({})", render(l)),
                _ => render(l),
            };
            let right = match &**r {
                Arith::Bin(_, rop, _) if prec(*rop) <= prec(*op) => format!("({})", render(r)),
                _ => render(r),
            };
            format!("{left} {op} {right}")
        }
    }
}

/// IEEE evaluation, or `None` where the VM reports division by zero.
fn eval(a: &Arith) -> Option<f64> {
    match a {
        Arith::Lit(n) => Some(f64::from(*n)),
        Arith::Bin(l, op, r) => {
            let x = eval(l)?;
            let y = eval(r)?;
            match op {
                '+' => Some(x + y),
                '-' => Some(x - y),
                '*' => Some(x * y),
                _ if y == 0.0 => None,
                _ => Some(x / y),
            }
        }
    }
}

proptest! {
    /// Literal arithmetic agrees with IEEE evaluation under the stated
    /// precedence and left associativity.
    #[test]
    fn arithmetic_matches_ieee(a in arb_arith()) {
        let source = format!("say {}", render(&a));
        match (eval(&a), run_src(&source)) {
            (Some(expected), Ok(out)) => {
                let printed = out.trim_end().to_string();
                let expected_text = oker_common::format_number(expected);
                prop_assert_eq!(printed, expected_text);
            }
            (None, Err(RuntimeError::DivisionByZero { .. })) => {}
            (expected, got) => prop_assert!(false, "expected {:?}, got {:?}", expected, got),
        }
    }

    /// `str(x)` printed as source re-parses to an equal number.
    #[test]
    fn str_round_trips_numbers(n in 0f64..1e12) {
        let text = output(&format!("say str({})", oker_common::format_number(n)));
        let printed: f64 = text.trim_end().parse().unwrap();
        prop_assert_eq!(printed.to_bits(), n.to_bits());
    }

    /// `str(s)` of a string literal is the string itself.
    #[test]
    fn str_round_trips_strings(s in "[a-zA-Z0-9 .,!?]{0,40}") {
        let text = output(&format!("say str(\"{s}\") == \"{s}\""));
        prop_assert_eq!(text, "true\n");
    }
}
