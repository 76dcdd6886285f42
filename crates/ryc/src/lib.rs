//! ryc interpreter: orchestrates the full pipeline.
//!
//! ```text
//! source → Lexer → Parser (+ constant folding) → Evaluator → value / output
//! ```
//!
//! Every error leaving this crate carries the file name and the offending
//! source line.

use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, instrument};

use ryc_eval::{Evaluator, NativeRegistry};
use ryc_types::ast::Program;
use ryc_types::{Result, SourceFile};

pub use ryc_eval::{BufferHost, EvalConfig, Host, StdHost, Value, DEFAULT_MAX_CALL_DEPTH};
pub use ryc_types::{ErrorCode, ErrorKind, RycError};

/// Options for a single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub config: EvalConfig,
}

/// Outcome of a run against a captured host, serializable for tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    /// Rendered value of the last top-level statement.
    pub value: Option<String>,
    /// Everything the program wrote.
    pub output: String,
    pub error: Option<RycError>,
}

/// Lex and parse without running.
#[instrument(level = "debug", skip(source), fields(bytes = source.len()))]
pub fn check_source(name: &str, source: &str) -> Result<Program> {
    let file = SourceFile::new(name, source);
    ryc_parser::parse(&file).map_err(|e| e.with_source(&file))
}

/// Parse and run a program against `host` with the default natives.
#[instrument(level = "debug", skip(source, options, host), fields(bytes = source.len()))]
pub fn run_source(
    name: &str,
    source: &str,
    options: &RunOptions,
    host: &mut dyn Host,
) -> Result<Value> {
    let file = SourceFile::new(name, source);
    let program = ryc_parser::parse(&file).map_err(|e| e.with_source(&file))?;
    debug!(statements = program.stmts.len(), "parsed");

    let _span = info_span!("evaluate", file = name).entered();
    let mut evaluator = Evaluator::with_config(host, options.config, NativeRegistry::with_defaults());
    evaluator.run(&program).map_err(|e| e.with_source(&file))
}

/// Run with scripted `input` lines and capture everything into a report.
pub fn run_to_report<I, S>(name: &str, source: &str, options: &RunOptions, input: I) -> RunReport
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut host = BufferHost::with_input(input);
    let result = run_source(name, source, options, &mut host);
    let output = host.into_output();
    match result {
        Ok(value) => RunReport {
            success: true,
            value: Some(value.to_string()),
            output,
            error: None,
        },
        Err(error) => RunReport {
            success: false,
            value: None,
            output,
            error: Some(error),
        },
    }
}
