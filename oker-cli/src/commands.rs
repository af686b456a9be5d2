//! CLI command implementations.

use oker_cli::{EngineError, Request, Stage};
use oker_vm::VmConfig;
use std::fs;
use std::io::Read;
use std::time::{Duration, Instant};

/// Compile and execute a source file, printing what it says.
pub fn run(args: &[String]) -> Result<(), i32> {
    let opts = parse_options(args, true)?;
    let Some(input) = opts.input.as_deref() else {
        eprintln!("error: run requires an input file");
        eprintln!("Usage: oker run <file.oker> [--time] [limits]");
        return Err(1);
    };

    let source = read_source(input)?;
    let program = oker_cli::compile_source(&source).map_err(report)?;

    let started = Instant::now();
    let output = oker_vm::run_with(&program, opts.config).map_err(|e| report(e.into()))?;
    let elapsed = started.elapsed();

    print!("{output}");
    if opts.time {
        eprintln!(
            "--- Execution time: {:.3} ms ---",
            elapsed.as_secs_f64() * 1000.0
        );
    }
    Ok(())
}

/// Print the token listing of a source file.
pub fn tokens(args: &[String]) -> Result<(), i32> {
    show_stage(args, Stage::Tokens)
}

/// Print the syntax tree of a source file.
pub fn ast(args: &[String]) -> Result<(), i32> {
    show_stage(args, Stage::Ast)
}

/// Print the compiled bytecode of a source file.
pub fn bytecode(args: &[String]) -> Result<(), i32> {
    show_stage(args, Stage::Bytecode)
}

/// Answer a JSON request read from a file, or stdin when no file is given.
///
/// The response goes to stdout. Engine failures are part of the response,
/// so only an unreadable request fails the command.
pub fn request(args: &[String]) -> Result<(), i32> {
    let opts = parse_options(args, false)?;

    let text = match opts.input.as_deref() {
        None | Some("-") => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text).map_err(|e| {
                eprintln!("error: cannot read stdin: {e}");
                1
            })?;
            text
        }
        Some(path) => read_source(path)?,
    };

    let request: Request = serde_json::from_str(&text).map_err(|e| {
        eprintln!("error: invalid request: {e}");
        1
    })?;

    let response = oker_cli::handle(&request, &opts.config);
    let json = serde_json::to_string(&response).map_err(|e| {
        eprintln!("error: cannot encode response: {e}");
        1
    })?;
    println!("{json}");
    Ok(())
}

// --- Helpers ---

fn show_stage(args: &[String], stage: Stage) -> Result<(), i32> {
    let Some(input) = args.first() else {
        eprintln!("error: {stage} requires an input file");
        eprintln!("Usage: oker {stage} <file.oker>");
        return Err(1);
    };
    let source = read_source(input)?;
    let text = oker_cli::process(&source, stage, &VmConfig::default()).map_err(report)?;
    print!("{text}");
    Ok(())
}

fn read_source(path: &str) -> Result<String, i32> {
    fs::read_to_string(path).map_err(|e| {
        eprintln!("error: cannot read '{path}': {e}");
        1
    })
}

/// Print an engine error and map it to the process exit code.
fn report(e: EngineError) -> i32 {
    eprintln!("{e}");
    e.exit_code()
}

#[derive(Debug, Default)]
struct Options {
    input: Option<String>,
    time: bool,
    config: VmConfig,
}

/// Parse the input path and limit flags shared by `run` and `request`.
fn parse_options(args: &[String], allow_time: bool) -> Result<Options, i32> {
    let mut opts = Options::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--time" if allow_time => opts.time = true,
            "--max-depth" => {
                let depth = flag_value(arg, iter.next())?;
                opts.config = opts.config.with_max_call_depth(depth);
            }
            "--max-steps" => {
                let steps = flag_value(arg, iter.next())?;
                opts.config = opts.config.with_max_instructions(steps);
            }
            "--timeout-ms" => {
                let ms: u64 = flag_value(arg, iter.next())?;
                opts.config = opts.config.with_time_limit(Some(Duration::from_millis(ms)));
            }
            "--max-string" => {
                let bytes = flag_value(arg, iter.next())?;
                opts.config = opts.config.with_max_string_len(bytes);
            }
            "--max-output" => {
                let bytes = flag_value(arg, iter.next())?;
                opts.config = opts.config.with_max_output_len(bytes);
            }
            flag if flag.starts_with("--") => {
                eprintln!("error: unknown option '{flag}'");
                return Err(1);
            }
            path if opts.input.is_none() => opts.input = Some(path.to_string()),
            extra => {
                eprintln!("error: unexpected argument '{extra}'");
                return Err(1);
            }
        }
    }
    Ok(opts)
}

fn flag_value<T: std::str::FromStr>(flag: &str, value: Option<&String>) -> Result<T, i32> {
    let Some(value) = value else {
        eprintln!("error: {flag} requires a value");
        return Err(1);
    };
    value.parse().map_err(|_| {
        eprintln!("error: {flag} expects a non-negative integer, got '{value}'");
        1
    })
}
