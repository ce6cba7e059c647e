//! Core parser infrastructure: token cursor and error helpers.

use liminal_lexer::{Token, TokenKind};
use liminal_types::ast::Program;
use liminal_types::{ExitStatus, Span, VmConfig, VmError, Warning};

/// The recursive-descent parser.
///
/// Consumes a token stream produced by the lexer and builds an AST.
/// Fails fast: the first violation aborts with a structured error and no
/// partial AST is returned.
pub struct Parser<'cfg> {
    tokens: Vec<Token>,
    pos: usize,
    pub(crate) config: &'cfg VmConfig,
    /// Current block nesting depth; the phase body is depth 1.
    pub(crate) depth: u32,
    /// Non-fatal diagnostics (duplicate phase names).
    pub(crate) warnings: Vec<Warning>,
}

/// A successfully parsed program plus its warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub program: Program,
    pub warnings: Vec<Warning>,
}

impl<'cfg> Parser<'cfg> {
    pub fn new(tokens: Vec<Token>, config: &'cfg VmConfig) -> Self {
        Self {
            tokens,
            pos: 0,
            config,
            depth: 0,
            warnings: Vec::new(),
        }
    }

    /// Parse the token stream into a [`ParseOutcome`].
    pub fn parse(mut self) -> Result<ParseOutcome, VmError> {
        let program = self.parse_program()?;
        Ok(ParseOutcome {
            program,
            warnings: self.warnings,
        })
    }

    // ── Token cursor ──────────────────────────────────────────────────────

    /// Returns the current token without advancing.
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("token stream should end with Eof")
        })
    }

    pub(crate) fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    /// Advance the cursor by one and return the consumed token.
    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn current_span(&self) -> Span {
        self.peek().span
    }

    pub(crate) fn at_end(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    /// Consume the expected token kind or fail with `ERR_PARSE`.
    pub(crate) fn expect(&mut self, expected: &TokenKind) -> Result<Token, VmError> {
        if self.peek_kind() == expected {
            Ok(self.advance())
        } else {
            Err(self.error(
                ExitStatus::ErrParse,
                format!("expected '{expected}', got '{}'", self.peek_kind()),
            ))
        }
    }

    // ── Errors ────────────────────────────────────────────────────────────

    /// Build an error anchored at the current token.
    pub(crate) fn error(&self, status: ExitStatus, message: impl Into<String>) -> VmError {
        VmError::at(status, message, self.current_span())
    }
}
