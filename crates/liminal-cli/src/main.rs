//! liminal — command-line driver for the liminal VM.
//!
//! Usage:
//!   liminal run program.lmn [--trace] [--json] [--max-ops N] [--max-stack N]
//!   liminal check program.lmn [--dump-ast]
//!
//! Exit codes: 0 for `COMPLETE`/`HALTED` (or a clean check), 1 for any
//! other status, 2 for driver failures (unreadable file, encoding).

use clap::{Parser, Subcommand};
use liminal_types::VmConfig;
use liminal_vm::RunResult;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{error, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "liminal")]
#[command(about = "Execute deterministic phase programs", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Execute a program and print the result record
    Run {
        /// Path to the program file
        file: PathBuf,

        /// Record WITNESS checkpoints in the result
        #[arg(long)]
        trace: bool,

        /// Emit the result record as JSON
        #[arg(long)]
        json: bool,

        /// Operation budget
        #[arg(long, default_value_t = 100_000)]
        max_ops: u64,

        /// Maximum stack depth
        #[arg(long, default_value_t = 256)]
        max_stack: usize,

        /// Maximum SATURATE iterations
        #[arg(long, default_value_t = 1_000)]
        max_saturate: u64,

        /// Maximum number of bindings
        #[arg(long, default_value_t = 1_024)]
        max_bindings: usize,
    },
    /// Validate a program without executing it
    Check {
        /// Path to the program file
        file: PathBuf,

        /// Dump the parsed AST as JSON
        #[arg(long)]
        dump_ast: bool,
    },
}

/// Driver-level failures, distinct from program statuses.
#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    init_logging();
    match dispatch(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            error!("{err}");
            ExitCode::from(2)
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn dispatch(cli: Cli) -> Result<ExitCode, CliError> {
    match cli.command {
        Command::Run {
            file,
            trace,
            json,
            max_ops,
            max_stack,
            max_saturate,
            max_bindings,
        } => {
            let source = read_source(&file)?;
            let config = VmConfig {
                max_ops,
                max_stack,
                max_saturate,
                max_bindings,
                trace_enabled: trace,
                ..VmConfig::default()
            };
            let result = liminal_vm::run(&source, &config);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_result(&result);
            }
            Ok(if result.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Check { file, dump_ast } => {
            let source = read_source(&file)?;
            match liminal_vm::check(&source, &VmConfig::default()) {
                Ok(report) => {
                    for warning in &report.warnings {
                        warn!("{warning}");
                    }
                    println!("{} is valid", file.display());
                    if dump_ast {
                        println!("{}", serde_json::to_string_pretty(&report.program)?);
                    }
                    Ok(ExitCode::SUCCESS)
                }
                Err(err) => {
                    eprintln!("{err}");
                    Ok(ExitCode::FAILURE)
                }
            }
        }
    }
}

fn read_source(path: &PathBuf) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::ReadSource {
        path: path.clone(),
        source,
    })
}

fn print_result(result: &RunResult) {
    println!("status: {}", result.status);
    if let Some(message) = &result.message {
        println!("reason: {message}");
    }
    if let Some(phase) = &result.phase_name {
        println!("phase: {phase}");
    }
    println!("phases entered: {}", result.phases_entered);
    println!("operations: {}", result.op_count);
    for warning in &result.warnings {
        println!("{warning}");
    }
    println!("stack ({}): {:?}", result.final_stack.len(), result.final_stack);
    println!("bindings ({}): {:?}", result.final_bindings.len(), result.final_bindings);
    if let Some(trace) = &result.trace {
        println!("trace ({} checkpoints):", trace.len());
        for (i, cp) in trace.iter().enumerate() {
            println!(
                "  [{}] phase {}, op {}: stack {:?}, bindings {:?}",
                i + 1,
                cp.phase_name,
                cp.op_count,
                cp.stack,
                cp.bindings
            );
        }
    }
}
