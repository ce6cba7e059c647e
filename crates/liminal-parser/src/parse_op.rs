//! Grammar productions: program, phase, operation, and GATE condition.
//!
//! Validation performed while building the AST:
//! - phase and SATURATE bodies are non-empty
//! - operator arity is exact (`ERR_ARITY`)
//! - GATE arguments are one of the five condition forms (`ERR_CONDITION`)
//! - unknown uppercase words in operation position are `ERR_INVALID_OP`
//! - block nesting stays within `max_nesting` (`ERR_NESTING_TOO_DEEP`)
//! - duplicate phase names warn and still execute in source order

use liminal_lexer::{is_op_word, TokenKind};
use liminal_types::ast::{GateCond, Op, OpKind, Phase, Program};
use liminal_types::{ExitStatus, VmError, Warning};
use std::collections::BTreeMap;

use crate::parser::Parser;

impl Parser<'_> {
    // ══════════════════════════════════════════════════════════════════════════
    // Program & phases
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a complete program: `phase+`.
    pub(crate) fn parse_program(&mut self) -> Result<Program, VmError> {
        let mut phases: Vec<Phase> = Vec::new();
        let mut first_lines: BTreeMap<String, u32> = BTreeMap::new();

        while !self.at_end() {
            let phase = self.parse_phase()?;
            match first_lines.get(&phase.name) {
                Some(&first_line) => {
                    self.warnings.push(Warning::new(
                        format!(
                            "duplicate phase name '{}' (first declared on line {}); both run in source order",
                            phase.name, first_line
                        ),
                        phase.span.line,
                    ));
                }
                None => {
                    first_lines.insert(phase.name.clone(), phase.span.line);
                }
            }
            phases.push(phase);
        }

        if phases.is_empty() {
            return Err(self.error(
                ExitStatus::ErrParse,
                "program must contain at least one phase",
            ));
        }

        Ok(Program { phases })
    }

    /// Parse `NAME { operation+ }`.
    fn parse_phase(&mut self) -> Result<Phase, VmError> {
        let span = self.current_span();
        let name = match self.peek_kind().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                name
            }
            other => {
                return Err(self.error(
                    ExitStatus::ErrParse,
                    format!("expected phase name, got '{other}'"),
                ));
            }
        };

        self.expect(&TokenKind::LBrace)?;
        self.depth = 1;

        let mut body = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error(
                    ExitStatus::ErrParse,
                    format!("unclosed phase '{name}'"),
                ));
            }
            body.push(self.parse_operation()?);
        }
        self.expect(&TokenKind::RBrace)?;

        if body.is_empty() {
            return Err(VmError::at(
                ExitStatus::ErrParse,
                format!("phase '{name}' must contain at least one operation"),
                span,
            ));
        }

        Ok(Phase { name, body, span })
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Operations
    // ══════════════════════════════════════════════════════════════════════════

    /// Parse a single operation with its fixed-arity arguments.
    fn parse_operation(&mut self) -> Result<Op, VmError> {
        let span = self.current_span();
        let word = match self.peek_kind().clone() {
            TokenKind::Ident(word) => {
                if !is_op_word(&word) {
                    return Err(self.error(
                        ExitStatus::ErrInvalidOp,
                        format!("unknown operator '{word}'"),
                    ));
                }
                self.advance();
                word
            }
            kind @ (TokenKind::Str(_) | TokenKind::Int(_) | TokenKind::Ref(_)) => {
                return Err(self.error(
                    ExitStatus::ErrArity,
                    format!("stray argument '{kind}' in operation position"),
                ));
            }
            other => {
                return Err(self.error(
                    ExitStatus::ErrParse,
                    format!("expected operation, got '{other}'"),
                ));
            }
        };

        let kind = match word.as_str() {
            "PUSH" => OpKind::Push(self.expect_symbol(&word)?),
            "INVERT" => OpKind::Invert,
            "BIND" => {
                let key = self.expect_symbol(&word)?;
                let value = self.expect_symbol(&word)?;
                OpKind::Bind(key, value)
            }
            "RELEASE" => OpKind::Release(self.expect_symbol(&word)?),
            "GATE" => OpKind::Gate(self.parse_condition()?),
            "SATURATE" => OpKind::Saturate(self.parse_block()?),
            "WITNESS" => OpKind::Witness,
            "HALT" => OpKind::Halt,
            _ => unreachable!("is_op_word covers every reserved word"),
        };

        Ok(Op::new(kind, span))
    }

    /// Parse a `{ operation+ }` block for SATURATE, enforcing nesting depth.
    fn parse_block(&mut self) -> Result<Vec<Op>, VmError> {
        if !matches!(self.peek_kind(), TokenKind::LBrace) {
            return Err(self.error(
                ExitStatus::ErrArity,
                format!("SATURATE expects a block, got '{}'", self.peek_kind()),
            ));
        }
        let open_span = self.current_span();
        self.advance();

        self.depth += 1;
        if self.depth > self.config.max_nesting {
            return Err(VmError::at(
                ExitStatus::ErrNestingTooDeep,
                format!(
                    "block nesting depth {} exceeds max_nesting ({})",
                    self.depth, self.config.max_nesting
                ),
                open_span,
            ));
        }

        let mut body = Vec::new();
        while !matches!(self.peek_kind(), TokenKind::RBrace) {
            if self.at_end() {
                return Err(self.error(ExitStatus::ErrParse, "unclosed SATURATE block"));
            }
            body.push(self.parse_operation()?);
        }
        self.expect(&TokenKind::RBrace)?;
        self.depth -= 1;

        if body.is_empty() {
            return Err(VmError::at(
                ExitStatus::ErrParse,
                "SATURATE block must contain at least one operation",
                open_span,
            ));
        }

        Ok(body)
    }

    // ══════════════════════════════════════════════════════════════════════════
    // Arguments
    // ══════════════════════════════════════════════════════════════════════════

    /// Consume one literal symbol argument for `operator`.
    ///
    /// Strings, integers, and lowercase references are all symbols;
    /// integers are normalized to their decimal text here, which keeps the
    /// value model single-sorted from the AST onward.
    fn expect_symbol(&mut self, operator: &str) -> Result<String, VmError> {
        match self.peek_kind().clone() {
            TokenKind::Str(s) => {
                self.advance();
                Ok(s)
            }
            TokenKind::Int(raw) => {
                self.advance();
                Ok(normalize_int(&raw))
            }
            TokenKind::Ref(r) => {
                self.advance();
                Ok(r)
            }
            other => Err(self.error(
                ExitStatus::ErrArity,
                format!("{operator} expects a symbol argument, got '{other}'"),
            )),
        }
    }

    /// Parse one of the five GATE condition forms.
    fn parse_condition(&mut self) -> Result<GateCond, VmError> {
        match self.peek_kind().clone() {
            // No argument at all: arity, not shape.
            TokenKind::RBrace | TokenKind::Eof => {
                Err(self.error(ExitStatus::ErrArity, "GATE expects 1 condition argument"))
            }
            TokenKind::Ref(word) if word == "depth" => {
                self.advance();
                let relation = self.peek_kind().clone();
                if !matches!(
                    relation,
                    TokenKind::Less | TokenKind::Greater | TokenKind::EqEq
                ) {
                    return Err(self.error(
                        ExitStatus::ErrCondition,
                        format!("depth condition expects '<', '>' or '==', got '{relation}'"),
                    ));
                }
                self.advance();
                let n = match self.peek_kind().clone() {
                    TokenKind::Int(raw) => {
                        let n: u64 = raw.parse().map_err(|_| {
                            self.error(
                                ExitStatus::ErrCondition,
                                format!("depth comparand '{raw}' is too large"),
                            )
                        })?;
                        self.advance();
                        n
                    }
                    other => {
                        return Err(self.error(
                            ExitStatus::ErrCondition,
                            format!("depth condition expects an integer, got '{other}'"),
                        ));
                    }
                };
                Ok(match relation {
                    TokenKind::Less => GateCond::DepthLt(n),
                    TokenKind::Greater => GateCond::DepthGt(n),
                    _ => GateCond::DepthEq(n),
                })
            }
            TokenKind::Ref(word) if word == "bound" || word == "unbound" => {
                self.advance();
                let key = match self.peek_kind().clone() {
                    TokenKind::Ref(r) => {
                        self.advance();
                        r
                    }
                    TokenKind::Str(s) => {
                        self.advance();
                        s
                    }
                    TokenKind::Int(raw) => {
                        self.advance();
                        normalize_int(&raw)
                    }
                    other => {
                        return Err(self.error(
                            ExitStatus::ErrCondition,
                            format!("{word} condition expects a key, got '{other}'"),
                        ));
                    }
                };
                Ok(if word == "bound" {
                    GateCond::Bound(key)
                } else {
                    GateCond::Unbound(key)
                })
            }
            other => Err(self.error(
                ExitStatus::ErrCondition,
                format!(
                    "unknown condition form starting at '{other}' \
                     (expected depth </>/== N, bound KEY, or unbound KEY)"
                ),
            )),
        }
    }
}

/// Normalize an integer lexeme to its decimal textual form.
///
/// Leading zeros are stripped so that `007` and `7` denote the same symbol.
pub(crate) fn normalize_int(raw: &str) -> String {
    let trimmed = raw.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
