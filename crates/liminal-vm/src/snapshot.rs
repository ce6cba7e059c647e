//! State snapshots for fixed-point detection.

use std::collections::BTreeMap;

/// A deep copy of the observable machine state at one instant.
///
/// Stacks compare element-by-element in order. Bindings compare as a set
/// of key→value pairs: `BTreeMap` equality is keyed, so the order in
/// which a program inserted entries can never leak into fixed-point
/// detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Snapshot {
    stack: Vec<String>,
    bindings: BTreeMap<String, String>,
}

impl Snapshot {
    pub(crate) fn capture(stack: &[String], bindings: &BTreeMap<String, String>) -> Self {
        Self {
            stack: stack.to_vec(),
            bindings: bindings.clone(),
        }
    }
}
