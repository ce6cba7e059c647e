//! Token types for the liminal lexer.
//!
//! Defines [`TokenKind`] covering every lexeme of the phase language and
//! [`Token`], which pairs a kind with a source [`Span`].

use liminal_types::Span;
use std::fmt;

/// The eight reserved operator words.
///
/// These are lexed as ordinary [`TokenKind::Ident`] tokens; the parser
/// reclassifies them when they appear in operation position. An uppercase
/// identifier outside this set in operation position is an invalid-op
/// error, not a parse error.
pub const OP_WORDS: &[&str] = &[
    "PUSH", "INVERT", "BIND", "RELEASE", "GATE", "SATURATE", "WITNESS", "HALT",
];

/// Returns `true` if `word` is a reserved operator word.
pub fn is_op_word(word: &str) -> bool {
    OP_WORDS.contains(&word)
}

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

// ─────────────────────────────────────────────────────────────────────
// TokenKind
// ─────────────────────────────────────────────────────────────────────

/// Every token kind in the phase language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Uppercase identifier `[A-Z][A-Z0-9_]*`: phase names and operator
    /// words.
    Ident(String),
    /// Lowercase reference `[a-z][a-z0-9_]*`: condition words and bare
    /// symbol arguments.
    Ref(String),
    /// String literal between double quotes; no escape sequences.
    Str(String),
    /// Integer literal `[0-9]+`, carried as its raw digit text.
    Int(String),
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `==`
    EqEq,
    /// End of input.
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(s) => f.write_str(s),
            TokenKind::Ref(s) => f.write_str(s),
            TokenKind::Str(s) => write!(f, "\"{s}\""),
            TokenKind::Int(s) => f.write_str(s),
            TokenKind::LBrace => f.write_str("{"),
            TokenKind::RBrace => f.write_str("}"),
            TokenKind::Less => f.write_str("<"),
            TokenKind::Greater => f.write_str(">"),
            TokenKind::EqEq => f.write_str("=="),
            TokenKind::Eof => f.write_str("end of input"),
        }
    }
}
