//! End-to-end tests of the engine boundary: source and stage in, response out.

use oker_cli::{handle, process, EngineError, Request, Response, Stage};
use oker_syntax::MAX_NESTING_DEPTH;
use oker_vm::{RuntimeError, VmConfig};
use proptest::prelude::*;
use std::path::Path;

// ============================================================
// Helper functions
// ============================================================

const SAMPLES: [&str; 4] = ["hello", "factorial", "fibonacci", "class"];

fn sample(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tests/programs")
        .join(format!("{name}.oker"));
    std::fs::read_to_string(path).unwrap()
}

fn run(source: &str) -> Result<String, EngineError> {
    process(source, Stage::Run, &VmConfig::default())
}

fn respond(json: &str) -> Response {
    let request: Request = serde_json::from_str(json).unwrap();
    handle(&request, &VmConfig::default())
}

// ============================================================
// Stages
// ============================================================

#[test]
fn every_stage_accepts_every_sample() {
    for name in SAMPLES {
        let source = sample(name);
        for stage in [Stage::Tokens, Stage::Ast, Stage::Bytecode, Stage::Run] {
            let result = process(&source, stage, &VmConfig::default());
            assert!(result.is_ok(), "{name} failed at {stage}: {result:?}");
        }
    }
}

#[test]
fn token_stage_ends_with_eof() {
    let listing = process("say 1", Stage::Tokens, &VmConfig::default()).unwrap();
    let last = listing.lines().last().unwrap();
    assert!(last.contains("EOF"));
    assert_eq!(listing.lines().count(), 3);
}

#[test]
fn bytecode_stage_lists_every_function() {
    let listing = process(&sample("class"), Stage::Bytecode, &VmConfig::default()).unwrap();
    for name in ["<main>", "create_person", "person_greet", "person_birthday"] {
        assert!(listing.contains(&format!("fn {name} (")), "missing {name}");
    }
}

#[test]
fn empty_source_runs_to_empty_output() {
    assert_eq!(run("").unwrap(), "");
    assert_eq!(run("\n\n~ nothing\n").unwrap(), "");
}

// ============================================================
// Errors
// ============================================================

#[test]
fn first_error_wins() {
    // Undefined name on line 1 and division by zero on line 2: compile fails first.
    let err = run("say ghost\nsay 1 / 0").unwrap_err();
    assert!(matches!(err, EngineError::Compile(_)));
}

#[test]
fn runtime_errors_keep_their_kind() {
    let err = run("makef f(a): return a end\nf()").unwrap_err();
    assert!(matches!(
        err,
        EngineError::Runtime(RuntimeError::ArityMismatch { expected: 1, found: 0, .. })
    ));
}

#[test]
fn runs_are_independent() {
    assert!(run("say 1 % 0").is_err());
    assert_eq!(run("say 9 % 4").unwrap(), "1\n");
}

#[test]
fn deep_nesting_is_a_syntax_error_at_every_stage() {
    let depth = 100_000;
    let source = format!("say {}1{}", "(".repeat(depth), ")".repeat(depth));
    for stage in [Stage::Ast, Stage::Bytecode, Stage::Run] {
        let response = handle(&Request::new(source.clone(), stage), &VmConfig::default());
        assert!(!response.success);
        let error = response.error.unwrap();
        assert!(error.starts_with("syntax error: line 1:"), "{error}");
        assert!(error.contains("nesting exceeds the limit"), "{error}");
    }
}

#[test]
fn nesting_at_the_limit_runs() {
    // Each pair of parentheses holds one '+', so the innermost sum sits at the limit.
    let pairs = MAX_NESTING_DEPTH - 1;
    let source = format!("say {}1{}", "(".repeat(pairs), " + 1)".repeat(pairs));
    assert_eq!(run(&source).unwrap(), format!("{}\n", pairs + 1));
    assert!(process(&source, Stage::Ast, &VmConfig::default()).is_ok());
}

#[test]
fn limits_come_from_config() {
    let config = VmConfig::default().with_max_call_depth(8);
    let err = process("makef f(): return f() end\nf()", Stage::Run, &config).unwrap_err();
    assert_eq!(
        err.to_string(),
        "runtime error: line 1: stack overflow (call depth limit 8)"
    );
}

// ============================================================
// Requests
// ============================================================

#[test]
fn response_for_success() {
    let response = respond(r#"{"source": "say \"hi\""}"#);
    assert_eq!(response, Response::ok("hi\n"));
}

#[test]
fn response_for_failure() {
    let response = respond(r#"{"code": "let = 1", "action": "ast"}"#);
    assert!(!response.success);
    let error = response.error.unwrap();
    assert!(error.starts_with("syntax error: line 1:5: expected variable name"), "{error}");
}

#[test]
fn response_round_trips_through_json() {
    let response = respond(r#"{"source": "say 1 + 1", "stage": "run"}"#);
    let json = serde_json::to_string(&response).unwrap();
    let back: Response = serde_json::from_str(&json).unwrap();
    assert_eq!(back, response);
}

// ============================================================
// Properties
// ============================================================

proptest! {
    /// Any printable source text gets an answer, never a panic.
    #[test]
    fn handle_never_panics(source in "[ -~\n]{0,80}") {
        let config = VmConfig::default().with_max_instructions(10_000);
        let response = handle(&Request::new(source, Stage::Run), &config);
        prop_assert_eq!(response.success, response.output.is_some());
        prop_assert_eq!(response.success, response.error.is_none());
    }

    /// A string that survives `str()` prints back unchanged.
    #[test]
    fn say_prints_strings_verbatim(s in "[a-zA-Z0-9 _.,:;!?()+*/-]{0,40}") {
        let out = run(&format!("say str(\"{s}\")")).unwrap();
        prop_assert_eq!(out, format!("{s}\n"));
    }
}
