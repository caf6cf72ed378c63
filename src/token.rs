//! Token shape produced by the (external) lexer/parser.
//!
//! Mirrors the lexer/parser contract in the analyzer's interface spec: each
//! token carries its kind, lexeme, absolute byte position, and 1-based line
//! and column. `position` gives the total order Pass 3a needs to decide
//! whether a local reference precedes its declaration.

use std::fmt;

/// Lexical kind of a token. The lexer/parser owns the full kind space; the
/// analyzer only inspects a handful of these (mostly operator kinds) and
/// otherwise treats `kind` opaquely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(non_camel_case_types)]
pub enum TokenKind {
    IDENTIFIER,
    INT32_LITERAL,
    INT64_LITERAL,
    UINT32_LITERAL,
    UINT64_LITERAL,
    FLOAT32_LITERAL,
    FLOAT64_LITERAL,
    BOOLEAN_LITERAL,
    NULL_LITERAL,

    PLUS,
    MINUS,
    ASTERISK,
    SLASH,
    PERCENT,

    AMPERSAND,
    CARET,
    BAR,
    TILDE,
    NOT,

    LESS_LESS,
    GREATER_GREATER,

    GREATER,
    LESS,
    GREATER_EQUAL,
    LESS_EQUAL,
    EQUAL_EQUAL,
    EXCLAMATION_EQUAL,

    Other,
}

#[derive(Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    /// Absolute byte offset of the token's first byte in the source text.
    pub position: usize,
    pub line: u32,
    pub column: u32,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>, position: usize, line: u32, column: u32) -> Self {
        Token { kind, lexeme: lexeme.into(), position, line, column }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:?}, '{}', {}, {}, {})", self.kind, self.lexeme, self.position, self.line, self.column)
    }
}
