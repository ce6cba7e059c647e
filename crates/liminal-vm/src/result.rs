//! The result record and the finalizer that produces it.
//!
//! The finalizer is total: whatever state the executor stopped in
//! (clean completion, HALT, or a guard firing mid-phase), it folds into
//! one serializable [`RunResult`]. With `BTreeMap` bindings and a fixed
//! field order, serializing the record is byte-identical across runs.

use liminal_types::{ExitStatus, VmError, Warning};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::executor::Executor;

/// One WITNESS checkpoint: the observable state at a point in execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub phase_name: String,
    /// Operation counter with the WITNESS itself counted.
    pub op_count: u64,
    pub stack: Vec<String>,
    pub bindings: BTreeMap<String, String>,
}

/// The structured outcome of a full `run`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Terminal status code.
    pub status: ExitStatus,
    /// Human-readable reason, present for every non-`COMPLETE`/`HALTED`
    /// status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// The phase the VM was in when execution ended, if any phase was
    /// entered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Operations executed.
    pub op_count: u64,
    /// Phases entered.
    pub phases_entered: u64,
    /// Final stack, bottom first.
    pub final_stack: Vec<String>,
    /// Final bindings, serialized in key order.
    pub final_bindings: BTreeMap<String, String>,
    /// Non-fatal diagnostics (duplicate phase names).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
    /// WITNESS checkpoints; present only when tracing was enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Vec<Checkpoint>>,
    /// Hex SHA-256 of the source text.
    pub source_hash: String,
}

impl RunResult {
    /// `true` for `COMPLETE` and `HALTED`.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// A result for a failure before any execution began (config or
    /// structural error): empty state, zero counters.
    pub(crate) fn before_execution(error: VmError, source_hash: String) -> Self {
        Self {
            status: error.status,
            message: Some(error.to_string()),
            phase_name: None,
            op_count: 0,
            phases_entered: 0,
            final_stack: Vec::new(),
            final_bindings: BTreeMap::new(),
            warnings: Vec::new(),
            trace: None,
            source_hash,
        }
    }
}

/// Fold the executor's terminal state into a result record.
pub(crate) fn finalize(
    executor: Executor<'_>,
    outcome: Result<(), VmError>,
    warnings: Vec<Warning>,
    source_hash: String,
) -> RunResult {
    let trace_enabled = executor.config.trace_enabled;
    let (status, message) = match outcome {
        Ok(()) => {
            let status = if executor.halted {
                ExitStatus::Halted
            } else {
                ExitStatus::Complete
            };
            (status, None)
        }
        Err(error) => (error.status, Some(error.message)),
    };

    RunResult {
        status,
        message,
        phase_name: executor.current_phase,
        op_count: executor.op_count,
        phases_entered: executor.phases_entered,
        final_stack: executor.stack,
        final_bindings: executor.bindings,
        warnings,
        trace: if trace_enabled {
            Some(executor.trace)
        } else {
            None
        },
        source_hash,
    }
}

/// The outcome of `check`: the program parsed, with any warnings.
///
/// Carries the AST so callers (the CLI's `--dump-ast`) can render it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    pub program: liminal_types::ast::Program,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<Warning>,
}
