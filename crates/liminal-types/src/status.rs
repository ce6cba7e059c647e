//! Exit status taxonomy for a VM invocation.
//!
//! Every run terminates with exactly one of these codes. The two success
//! codes (`Complete`, `Halted`) and the two budget terminations
//! (`TermOpLimit`, `TermCycleLimit`) still produce a full result record
//! with the state at the point execution stopped; the `Err*` codes
//! indicate a structural or resource violation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Terminal status of a VM invocation.
///
/// Serialized in SCREAMING_SNAKE_CASE so result records carry the exact
/// wire names (`"COMPLETE"`, `"ERR_STACK_OVERFLOW"`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExitStatus {
    /// All phases ran to the end without HALT or a guard firing.
    Complete,
    /// A HALT operation ended execution cleanly.
    Halted,
    /// The global operation budget (`max_ops`) was exhausted.
    TermOpLimit,
    /// A SATURATE loop hit its iteration budget (`max_saturate`).
    TermCycleLimit,
    /// PUSH would have grown the stack past `max_stack`.
    ErrStackOverflow,
    /// BIND would have grown the bindings map past `max_bindings`.
    ErrBindingsOverflow,
    /// Lexical or grammatical error in the source text.
    ErrParse,
    /// An operator was given the wrong number of arguments.
    ErrArity,
    /// A GATE argument is not one of the recognised condition forms.
    ErrCondition,
    /// An uppercase word in operation position is not a known operator.
    ErrInvalidOp,
    /// Block nesting exceeded `max_nesting`.
    ErrNestingTooDeep,
    /// A configuration field is outside its permitted range.
    ErrConfig,
}

impl ExitStatus {
    /// `true` for the two clean-completion codes.
    pub fn is_success(self) -> bool {
        matches!(self, ExitStatus::Complete | ExitStatus::Halted)
    }

    /// `true` for codes detected before any execution (parse/config time).
    pub fn is_structural(self) -> bool {
        matches!(
            self,
            ExitStatus::ErrParse
                | ExitStatus::ErrArity
                | ExitStatus::ErrCondition
                | ExitStatus::ErrInvalidOp
                | ExitStatus::ErrNestingTooDeep
                | ExitStatus::ErrConfig
        )
    }

    /// The wire name of this status.
    pub fn as_str(self) -> &'static str {
        match self {
            ExitStatus::Complete => "COMPLETE",
            ExitStatus::Halted => "HALTED",
            ExitStatus::TermOpLimit => "TERM_OP_LIMIT",
            ExitStatus::TermCycleLimit => "TERM_CYCLE_LIMIT",
            ExitStatus::ErrStackOverflow => "ERR_STACK_OVERFLOW",
            ExitStatus::ErrBindingsOverflow => "ERR_BINDINGS_OVERFLOW",
            ExitStatus::ErrParse => "ERR_PARSE",
            ExitStatus::ErrArity => "ERR_ARITY",
            ExitStatus::ErrCondition => "ERR_CONDITION",
            ExitStatus::ErrInvalidOp => "ERR_INVALID_OP",
            ExitStatus::ErrNestingTooDeep => "ERR_NESTING_TOO_DEEP",
            ExitStatus::ErrConfig => "ERR_CONFIG",
        }
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: &[ExitStatus] = &[
        ExitStatus::Complete,
        ExitStatus::Halted,
        ExitStatus::TermOpLimit,
        ExitStatus::TermCycleLimit,
        ExitStatus::ErrStackOverflow,
        ExitStatus::ErrBindingsOverflow,
        ExitStatus::ErrParse,
        ExitStatus::ErrArity,
        ExitStatus::ErrCondition,
        ExitStatus::ErrInvalidOp,
        ExitStatus::ErrNestingTooDeep,
        ExitStatus::ErrConfig,
    ];

    #[test]
    fn test_twelve_statuses() {
        assert_eq!(ALL.len(), 12);
    }

    #[test]
    fn test_display_matches_wire_name() {
        assert_eq!(ExitStatus::Complete.to_string(), "COMPLETE");
        assert_eq!(ExitStatus::TermCycleLimit.to_string(), "TERM_CYCLE_LIMIT");
        assert_eq!(
            ExitStatus::ErrNestingTooDeep.to_string(),
            "ERR_NESTING_TOO_DEEP"
        );
    }

    #[test]
    fn test_serde_uses_wire_name() {
        for &status in ALL {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            let back: ExitStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
    }

    #[test]
    fn test_success_partition() {
        assert!(ExitStatus::Complete.is_success());
        assert!(ExitStatus::Halted.is_success());
        for &status in ALL {
            if !matches!(status, ExitStatus::Complete | ExitStatus::Halted) {
                assert!(!status.is_success(), "{status} should not be success");
            }
        }
    }

    #[test]
    fn test_structural_partition() {
        assert!(ExitStatus::ErrParse.is_structural());
        assert!(ExitStatus::ErrConfig.is_structural());
        assert!(!ExitStatus::TermOpLimit.is_structural());
        assert!(!ExitStatus::ErrStackOverflow.is_structural());
    }
}
