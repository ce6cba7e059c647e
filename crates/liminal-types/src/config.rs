//! VM configuration: the immutable resource-bound record.
//!
//! Every limit has a hard floor and ceiling; there is no way to express
//! "unlimited". Out-of-range values are rejected with `ERR_CONFIG` before
//! any source text is touched.

use crate::{ExitStatus, VmError};
use serde::{Deserialize, Serialize};

/// Resource bounds for one VM invocation.
///
/// The record is plain data: construct it with struct-update syntax from
/// [`VmConfig::default`], then pass it to the pipeline, which calls
/// [`VmConfig::validate`] before doing anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmConfig {
    /// Global operation budget.
    pub max_ops: u64,
    /// Maximum stack depth.
    pub max_stack: usize,
    /// Maximum iterations of a single SATURATE invocation.
    pub max_saturate: u64,
    /// Maximum number of entries in the bindings map.
    pub max_bindings: usize,
    /// Maximum block nesting depth (the phase body is depth 1).
    pub max_nesting: u32,
    /// Maximum number of tokens the lexer will emit.
    pub max_tokens: usize,
    /// Maximum source length in bytes.
    pub max_source_bytes: usize,
    /// Maximum length of a single symbol, in bytes.
    pub max_symbol_len: usize,
    /// Record WITNESS checkpoints in the result.
    pub trace_enabled: bool,
}

/// (field, min, max) rows for every bounded field.
const BOUNDS: &[(&str, u64, u64)] = &[
    ("max_ops", 1, 1_000_000),
    ("max_stack", 1, 4_096),
    ("max_saturate", 1, 10_000),
    ("max_bindings", 1, 8_192),
    ("max_nesting", 1, 64),
    ("max_tokens", 1, 1_000_000),
    ("max_source_bytes", 1, 16_777_216),
    ("max_symbol_len", 1, 65_536),
];

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_ops: 100_000,
            max_stack: 256,
            max_saturate: 1_000,
            max_bindings: 1_024,
            max_nesting: 32,
            max_tokens: 100_000,
            max_source_bytes: 1_048_576,
            max_symbol_len: 4_096,
            trace_enabled: false,
        }
    }
}

impl VmConfig {
    /// Check every field against its permitted range.
    ///
    /// Returns the first violation as an `ERR_CONFIG` error naming the
    /// field and its bounds.
    pub fn validate(&self) -> Result<(), VmError> {
        let values: [u64; 8] = [
            self.max_ops,
            self.max_stack as u64,
            self.max_saturate,
            self.max_bindings as u64,
            self.max_nesting as u64,
            self.max_tokens as u64,
            self.max_source_bytes as u64,
            self.max_symbol_len as u64,
        ];
        for (&value, &(name, min, max)) in values.iter().zip(BOUNDS) {
            if value < min || value > max {
                return Err(VmError::bare(
                    ExitStatus::ErrConfig,
                    format!("{name} must be in {min}..={max}, got {value}"),
                ));
            }
        }
        Ok(())
    }

    /// Validate and return the config itself, for one-expression setup.
    pub fn validated(self) -> Result<Self, VmError> {
        self.validate()?;
        Ok(self)
    }
}
