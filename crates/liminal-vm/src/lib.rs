//! liminal VM: orchestrates the full pipeline.
//!
//! ```text
//! source text → Lexer → Parser → Executor → Finalizer → RunResult
//! ```
//!
//! # Two entry points
//!
//! - [`check`] — lexer + parser only, returning the AST and warnings.
//! - [`run`] — the full pipeline. Total: every invocation produces a
//!   [`RunResult`], including configuration and parse failures.
//!
//! Execution is pure and deterministic: the same (source, config) pair
//! produces a byte-identical serialized result on every invocation.

mod executor;
mod result;
mod snapshot;

pub use executor::Executor;
pub use result::{CheckReport, Checkpoint, RunResult};

use liminal_lexer::Lexer;
use liminal_parser::{ParseOutcome, Parser};
use liminal_types::{VmConfig, VmError};
use sha2::{Digest, Sha256};

// ── Version constants ─────────────────────────────────────────────────────────

/// Phase-language version.
pub const LANGUAGE_VERSION: &str = "0.1.0";

/// VM version (matches the Cargo package version).
pub const VM_VERSION: &str = env!("CARGO_PKG_VERSION");

// ── check ─────────────────────────────────────────────────────────────────────

/// Validate a program without executing it.
///
/// Runs configuration validation, the lexer, and the parser. Returns the
/// parsed program plus warnings, or the first structural error.
pub fn check(source: &str, config: &VmConfig) -> Result<CheckReport, VmError> {
    config.validate()?;
    let outcome = frontend(source, config)?;
    Ok(CheckReport {
        program: outcome.program,
        warnings: outcome.warnings,
    })
}

// ── run ───────────────────────────────────────────────────────────────────────

/// Execute a program under the given resource configuration.
///
/// Total: configuration errors, structural errors, resource terminations,
/// and clean completions all come back as a [`RunResult`]; callers never
/// need a second error path.
pub fn run(source: &str, config: &VmConfig) -> RunResult {
    let source_hash = sha256_hex(source.as_bytes());

    if let Err(error) = config.validate() {
        return RunResult::before_execution(error, source_hash);
    }

    let outcome = match frontend(source, config) {
        Ok(outcome) => outcome,
        Err(error) => return RunResult::before_execution(error, source_hash),
    };

    let mut executor = Executor::new(config);
    let run_outcome = executor.execute(&outcome.program);
    result::finalize(executor, run_outcome, outcome.warnings, source_hash)
}

// ── Pipeline pieces ───────────────────────────────────────────────────────────

/// Lex + parse. The shared frontend of both entry points.
fn frontend(source: &str, config: &VmConfig) -> Result<ParseOutcome, VmError> {
    let tokens = Lexer::new(source, config).lex()?;
    Parser::new(tokens, config).parse()
}

fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    let mut s = String::with_capacity(digest.len() * 2);
    for b in digest {
        use std::fmt::Write;
        write!(s, "{b:02x}").unwrap();
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use liminal_types::ExitStatus;

    #[test]
    fn test_sha256_hex_known_vector() {
        // SHA-256 of the empty string.
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_check_accepts_valid_program() {
        let report = check("T { HALT }", &VmConfig::default()).unwrap();
        assert_eq!(report.program.phases.len(), 1);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_check_rejects_invalid_config() {
        let config = VmConfig {
            max_ops: 0,
            ..VmConfig::default()
        };
        let err = check("T { HALT }", &config).unwrap_err();
        assert_eq!(err.status, ExitStatus::ErrConfig);
    }

    #[test]
    fn test_run_is_total_on_config_error() {
        let config = VmConfig {
            max_stack: 5_000,
            ..VmConfig::default()
        };
        let result = run("T { HALT }", &config);
        assert_eq!(result.status, ExitStatus::ErrConfig);
        assert_eq!(result.op_count, 0);
    }

    #[test]
    fn test_run_is_total_on_parse_error() {
        let result = run("T {", &VmConfig::default());
        assert_eq!(result.status, ExitStatus::ErrParse);
        assert_eq!(result.phases_entered, 0);
        assert!(result.final_stack.is_empty());
    }
}
