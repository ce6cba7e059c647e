//! AST node types for the phase language.
//!
//! The AST is immutable after parsing: the executor walks it by reference
//! and never mutates it. Every node carries a [`Span`] for error context.
//! Symbols are plain `String`s: integer literals are already normalized
//! to their decimal text by the parser, so the value model is
//! single-sorted by the time it reaches this tree.

use crate::Span;
use serde::{Deserialize, Serialize};

/// A complete program: one or more phases, executed in source order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub phases: Vec<Phase>,
}

/// `NAME { operation+ }` — the top-level unit of execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase {
    /// Uppercase identifier. Duplicates are allowed (they warn).
    pub name: String,
    /// Non-empty operation sequence.
    pub body: Vec<Op>,
    pub span: Span,
}

/// A single operation: operator kind plus source position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Op {
    pub kind: OpKind,
    pub span: Span,
}

impl Op {
    pub fn new(kind: OpKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// The eight operators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OpKind {
    /// `PUSH sym` — append a symbol to the stack top.
    Push(String),
    /// `INVERT` — reverse the stack in place.
    Invert,
    /// `BIND key value` — insert or overwrite a binding.
    Bind(String, String),
    /// `RELEASE key` — remove a binding if present.
    Release(String),
    /// `GATE cond` — continue on true, break the enclosing block on false.
    Gate(GateCond),
    /// `SATURATE { operation+ }` — repeat the block until fixed point.
    Saturate(Vec<Op>),
    /// `WITNESS` — record a checkpoint when tracing is enabled.
    Witness,
    /// `HALT` — stop the program; remaining phases are skipped.
    Halt,
}

/// The five GATE condition forms. Evaluation is side-effect free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GateCond {
    /// `depth < n`
    DepthLt(u64),
    /// `depth > n`
    DepthGt(u64),
    /// `depth == n`
    DepthEq(u64),
    /// `bound key`
    Bound(String),
    /// `unbound key`
    Unbound(String),
}
