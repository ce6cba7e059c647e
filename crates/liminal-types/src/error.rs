//! Structured error record and warnings.
//!
//! A [`VmError`] is the single error currency of the whole pipeline:
//! the lexer and parser build one with a [`Span`], the executor builds one
//! with phase context and the operation counter at the failure point, and
//! config validation builds one with neither. The finalizer folds it into
//! the result record without loss.

use crate::{ExitStatus, Span};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A terminal error, carrying everything the result record needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmError {
    /// The exit status this error maps to.
    pub status: ExitStatus,
    /// Human-readable reason.
    pub message: String,
    /// Source position, when the error is anchored to the source text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
    /// Phase being executed when the error fired, if execution began.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase_name: Option<String>,
    /// Operation counter value at the failure point.
    pub op_count: u64,
}

impl VmError {
    /// A structural error anchored to a source position (lexer/parser).
    pub fn at(status: ExitStatus, message: impl Into<String>, span: Span) -> Self {
        Self {
            status,
            message: message.into(),
            span: Some(span),
            phase_name: None,
            op_count: 0,
        }
    }

    /// An error with no source anchor (configuration validation).
    pub fn bare(status: ExitStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            span: None,
            phase_name: None,
            op_count: 0,
        }
    }

    /// Attach runtime context (phase + counter) to an error.
    pub fn in_phase(mut self, phase: impl Into<String>, op_count: u64) -> Self {
        self.phase_name = Some(phase.into());
        self.op_count = op_count;
        self
    }
}

impl fmt::Display for VmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.status, self.message)?;
        if let Some(span) = &self.span {
            write!(f, " at {span}")?;
        }
        if let Some(phase) = &self.phase_name {
            write!(f, " (phase {phase}, op {})", self.op_count)?;
        }
        Ok(())
    }
}

impl std::error::Error for VmError {}

/// A non-fatal diagnostic surfaced in the result record.
///
/// The only warning currently produced is a duplicate phase name: both
/// phases still execute in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Warning {
    pub message: String,
    pub line: u32,
}

impl Warning {
    pub fn new(message: impl Into<String>, line: u32) -> Self {
        Self {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "warning (line {}): {}", self.line, self.message)
    }
}
