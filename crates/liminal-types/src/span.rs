use serde::{Deserialize, Serialize};
use std::fmt;

/// Source position of a token or AST node.
///
/// `line` and `col` are 1-based for human-readable messages; `offset` is
/// the 0-based byte offset into the source, which is what error records
/// report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub offset: usize,
    pub line: u32,
    pub col: u32,
}

impl Span {
    /// Create a new span.
    pub fn new(offset: usize, line: u32, col: u32) -> Self {
        Self { offset, line, col }
    }

    /// The span of the very first byte of a source.
    pub fn start() -> Self {
        Self::new(0, 1, 1)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} (byte {})", self.line, self.col, self.offset)
    }
}
