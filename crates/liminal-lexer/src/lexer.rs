//! Byte-stream lexer — converts source text to a token stream in one pass.
//!
//! Features:
//! - Identifier / reference / string / integer / brace / comparison tokens
//! - Whitespace and `#`-comments stripped between tokens
//! - Hard limits enforced while scanning: `max_source_bytes`, `max_tokens`,
//!   and `max_symbol_len`
//! - Fail-fast: the first lexical error aborts with `ERR_PARSE` carrying a
//!   reason and the byte offset

use liminal_types::{ExitStatus, Span, VmConfig, VmError};

use crate::token::{Token, TokenKind};

/// The lexer. Borrows the source bytes and the resource configuration.
pub struct Lexer<'src> {
    source: &'src [u8],
    config: &'src VmConfig,
    /// Current byte offset.
    pos: usize,
    /// Current line (1-based).
    line: u32,
    /// Current column (1-based).
    col: u32,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, config: &'src VmConfig) -> Self {
        Self {
            source: source.as_bytes(),
            config,
            pos: 0,
            line: 1,
            col: 1,
        }
    }

    /// Lex the entire source into a token stream ending with [`TokenKind::Eof`].
    pub fn lex(mut self) -> Result<Vec<Token>, VmError> {
        if self.source.len() > self.config.max_source_bytes {
            return Err(VmError::at(
                ExitStatus::ErrParse,
                format!(
                    "source is {} bytes, exceeding max_source_bytes ({})",
                    self.source.len(),
                    self.config.max_source_bytes
                ),
                Span::start(),
            ));
        }

        let mut tokens = Vec::new();
        loop {
            let token = self.scan_token()?;
            let is_eof = token.kind == TokenKind::Eof;
            if !is_eof {
                if tokens.len() + 1 > self.config.max_tokens {
                    return Err(VmError::at(
                        ExitStatus::ErrParse,
                        format!("token count exceeds max_tokens ({})", self.config.max_tokens),
                        token.span,
                    ));
                }
                tokens.push(token);
            } else {
                tokens.push(token);
                break;
            }
        }
        Ok(tokens)
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let ch = self.source.get(self.pos).copied()?;
        self.pos += 1;
        if ch == b'\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn current_span(&self) -> Span {
        Span::new(self.pos, self.line, self.col)
    }

    /// Skip whitespace and `#`-comments until the next token byte.
    fn skip_trivia(&mut self) {
        while let Some(ch) = self.peek() {
            match ch {
                b' ' | b'\t' | b'\r' | b'\n' => {
                    self.advance();
                }
                b'#' => {
                    while let Some(ch) = self.peek() {
                        if ch == b'\n' {
                            break;
                        }
                        self.advance();
                    }
                }
                _ => break,
            }
        }
    }

    /// Guard a scanned lexeme against `max_symbol_len`.
    fn check_symbol_len(&self, text: &str, span: Span) -> Result<(), VmError> {
        if text.len() > self.config.max_symbol_len {
            return Err(VmError::at(
                ExitStatus::ErrParse,
                format!(
                    "symbol is {} bytes, exceeding max_symbol_len ({})",
                    text.len(),
                    self.config.max_symbol_len
                ),
                span,
            ));
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    fn scan_token(&mut self) -> Result<Token, VmError> {
        self.skip_trivia();

        let span = self.current_span();
        let ch = match self.advance() {
            None => return Ok(Token::new(TokenKind::Eof, span)),
            Some(ch) => ch,
        };

        match ch {
            b'{' => Ok(Token::new(TokenKind::LBrace, span)),
            b'}' => Ok(Token::new(TokenKind::RBrace, span)),
            b'<' => Ok(Token::new(TokenKind::Less, span)),
            b'>' => Ok(Token::new(TokenKind::Greater, span)),
            b'=' => {
                if self.peek() == Some(b'=') {
                    self.advance();
                    Ok(Token::new(TokenKind::EqEq, span))
                } else {
                    Err(VmError::at(
                        ExitStatus::ErrParse,
                        "stray '=' (comparisons use '==')",
                        span,
                    ))
                }
            }
            b'"' => self.scan_string(span),
            b'0'..=b'9' => self.scan_run(span, TokenKind::Int, |c| c.is_ascii_digit()),
            b'A'..=b'Z' => self.scan_run(span, TokenKind::Ident, |c| {
                c.is_ascii_uppercase() || c.is_ascii_digit() || c == b'_'
            }),
            b'a'..=b'z' => self.scan_run(span, TokenKind::Ref, |c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == b'_'
            }),
            _ => Err(VmError::at(
                ExitStatus::ErrParse,
                format!("unexpected character '{}'", ch as char),
                span,
            )),
        }
    }

    /// Scan a maximal run of bytes matching `accept`, starting at `span`
    /// (the first byte is already consumed), and wrap it with `make`.
    fn scan_run(
        &mut self,
        span: Span,
        make: impl FnOnce(String) -> TokenKind,
        accept: impl Fn(u8) -> bool,
    ) -> Result<Token, VmError> {
        while let Some(ch) = self.peek() {
            if accept(ch) {
                self.advance();
            } else {
                break;
            }
        }
        let text = std::str::from_utf8(&self.source[span.offset..self.pos])
            .unwrap_or("")
            .to_string();
        self.check_symbol_len(&text, span)?;
        Ok(Token::new(make(text), span))
    }

    /// Scan a string literal; the opening quote is already consumed.
    /// There are no escape sequences: every byte up to the closing quote
    /// is literal, newlines included.
    fn scan_string(&mut self, span: Span) -> Result<Token, VmError> {
        let content_start = self.pos;
        loop {
            match self.advance() {
                None => {
                    return Err(VmError::at(
                        ExitStatus::ErrParse,
                        "unterminated string literal",
                        span,
                    ));
                }
                Some(b'"') => {
                    let text = String::from_utf8_lossy(
                        &self.source[content_start..self.pos - 1],
                    )
                    .into_owned();
                    self.check_symbol_len(&text, span)?;
                    return Ok(Token::new(TokenKind::Str(text), span));
                }
                Some(_) => {}
            }
        }
    }
}
