//! Oker CLI: run programs and inspect each pipeline stage.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Usage, input, lex or syntax error
//! - 2: Compile error
//! - 3: Runtime error
//!
//! Set `OKER_LOG` (or `RUST_LOG`) to an `EnvFilter` directive such as
//! `oker_vm=trace` to see engine logs on stderr.

mod commands;

use std::process;

fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "run" => commands::run(&args[2..]),
        "tokens" => commands::tokens(&args[2..]),
        "ast" => commands::ast(&args[2..]),
        "bytecode" => commands::bytecode(&args[2..]),
        "request" => commands::request(&args[2..]),
        "--help" | "-h" | "help" => {
            print_usage();
            process::exit(0);
        }
        other => {
            eprintln!("error: unknown command '{other}'");
            eprintln!();
            print_usage();
            process::exit(1);
        }
    };

    if let Err(code) = result {
        process::exit(code);
    }
}

/// Install a stderr subscriber when a log filter is configured.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let Ok(directives) = std::env::var("OKER_LOG").or_else(|_| std::env::var("RUST_LOG")) else {
        return;
    };
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true),
        )
        .with(EnvFilter::new(directives))
        .init();
}

fn print_usage() {
    eprintln!("Usage: oker <command> [args]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  run <file.oker> [--time] [limits]   Compile and execute a program");
    eprintln!("  tokens <file.oker>                  Print the token listing");
    eprintln!("  ast <file.oker>                     Print the syntax tree");
    eprintln!("  bytecode <file.oker>                Print the compiled bytecode");
    eprintln!("  request [<request.json>] [limits]   Answer a JSON request (stdin if no file)");
    eprintln!();
    eprintln!("Limits:");
    eprintln!("  --max-depth N     Maximum call depth");
    eprintln!("  --max-steps N     Instruction budget");
    eprintln!("  --timeout-ms N    Wall-clock limit in milliseconds");
    eprintln!("  --max-string N    Longest string a program may build, in bytes");
    eprintln!("  --max-output N    Largest output a program may print, in bytes");
}
