use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use ryc::{run_source, EvalConfig, RunOptions, RycError, StdHost, DEFAULT_MAX_CALL_DEPTH};

/// ryc - run a program written in the ryc language
#[derive(Parser, Debug)]
#[command(name = "ryc")]
#[command(about = "Interpret a ryc source file", long_about = None)]
struct Args {
    /// Maximum depth of nested function calls
    #[arg(long, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// How errors are printed on stderr
    #[arg(long, value_enum, default_value_t = ErrorFormat::Human)]
    error_format: ErrorFormat,

    /// Source file to run
    file: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ErrorFormat {
    Human,
    Json,
}

fn main() -> ExitCode {
    let args = Args::parse();

    use tracing_subscriber::{fmt, EnvFilter};

    // Silent unless RUST_LOG asks for something.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("off"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("ryc: cannot read '{}': {e}", args.file);
            return ExitCode::FAILURE;
        }
    };

    let options = RunOptions {
        config: EvalConfig {
            max_call_depth: args.max_depth,
        },
    };
    match run_source(&args.file, &source, &options, &mut StdHost) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err, args.error_format);
            ExitCode::FAILURE
        }
    }
}

fn report(err: &RycError, format: ErrorFormat) {
    match format {
        ErrorFormat::Human => {
            eprintln!("ryc: {err}");
            if !err.source_line.is_empty() {
                eprintln!("  {} | {}", err.line(), err.source_line.trim_end());
            }
        }
        ErrorFormat::Json => match serde_json::to_string(err) {
            Ok(json) => eprintln!("{json}"),
            Err(_) => eprintln!("ryc: {err}"),
        },
    }
}
