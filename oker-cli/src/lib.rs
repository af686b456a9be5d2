//! Oker engine boundary: one request in, one response out.
//!
//! A request names a source text and a stage. The pipeline runs up to that
//! stage and returns either its rendering (tokens, AST, bytecode) or the
//! program's printed output.
//!
//! ```
//! use oker_cli::{handle, Request, Stage};
//! use oker_vm::VmConfig;
//!
//! let request = Request::new("say 1 + 2", Stage::Run);
//! let response = handle(&request, &VmConfig::default());
//! assert!(response.success);
//! assert_eq!(response.output.as_deref(), Some("3\n"));
//! ```

pub mod render;

use oker_common::Program;
use oker_compiler::CompileError;
use oker_syntax::{LexError, SyntaxError};
use oker_vm::{RuntimeError, VmConfig};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How far a request takes the pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Tokens,
    Ast,
    Bytecode,
    #[default]
    Run,
}

impl Stage {
    pub fn name(self) -> &'static str {
        match self {
            Stage::Tokens => "tokens",
            Stage::Ast => "ast",
            Stage::Bytecode => "bytecode",
            Stage::Run => "run",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tokens" => Ok(Stage::Tokens),
            "ast" => Ok(Stage::Ast),
            "bytecode" => Ok(Stage::Bytecode),
            "run" => Ok(Stage::Run),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

/// A request to the engine.
///
/// The field names `code` and `action` are accepted for `source` and `stage`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    #[serde(alias = "code")]
    pub source: String,
    #[serde(default, alias = "action")]
    pub stage: Stage,
}

impl Request {
    pub fn new(source: impl Into<String>, stage: Stage) -> Self {
        Self {
            source: source.into(),
            stage,
        }
    }
}

/// The engine's answer. Exactly one of `output` and `error` is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: Some(output.into()),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: None,
            error: Some(error.into()),
        }
    }
}

/// The first error any stage reported, tagged with the stage.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    #[error("lex error: {0}")]
    Lex(#[from] LexError),

    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    #[error("compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl EngineError {
    /// Process exit code used by the `oker` binary.
    pub fn exit_code(&self) -> i32 {
        match self {
            EngineError::Lex(_) | EngineError::Syntax(_) => 1,
            EngineError::Compile(_) => 2,
            EngineError::Runtime(_) => 3,
        }
    }
}

/// Run the pipeline on `source` up to `stage`.
///
/// # Errors
///
/// Returns the first error reported by the lexer, parser, compiler or VM.
pub fn process(source: &str, stage: Stage, config: &VmConfig) -> Result<String, EngineError> {
    let tokens = oker_syntax::tokenize(source)?;
    if stage == Stage::Tokens {
        return Ok(render::tokens(&tokens));
    }

    let ast = oker_syntax::parse(&tokens)?;
    if stage == Stage::Ast {
        return Ok(render::ast(&ast));
    }

    let program = oker_compiler::compile(&ast)?;
    if stage == Stage::Bytecode {
        return Ok(render::bytecode(&program));
    }

    Ok(oker_vm::run_with(&program, *config)?)
}

/// Lex, parse and compile `source` without running it.
pub fn compile_source(source: &str) -> Result<Program, EngineError> {
    let tokens = oker_syntax::tokenize(source)?;
    let ast = oker_syntax::parse(&tokens)?;
    Ok(oker_compiler::compile(&ast)?)
}

/// Answer one request. Never fails: errors become `success: false`.
pub fn handle(request: &Request, config: &VmConfig) -> Response {
    tracing::debug!(
        stage = %request.stage,
        bytes = request.source.len(),
        "handling request"
    );
    match process(&request.source, request.stage, config) {
        Ok(output) => Response::ok(output),
        Err(e) => Response::failure(e.to_string()),
    }
}
