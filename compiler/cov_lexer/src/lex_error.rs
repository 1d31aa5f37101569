//! Lexer errors.

use crate::Charset;

/// A lexer failure at a source position (1-based line and column).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{kind} (line {line}, column {column})")]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub kind: LexErrorKind,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LexErrorKind {
    #[error("Unexpected character '{0}'.")]
    UnknownCharacter(char),
    #[error("Unterminated string literal.")]
    UnterminatedString,
    #[error("Unterminated char literal.")]
    UnterminatedChar,
    #[error("Unknown escape sequence '\\{0}'.")]
    BadEscape(char),
    #[error("Empty char literal.")]
    EmptyChar,
    #[error("Char literal holds more than one character.")]
    MultiChar,
    #[error("Numeric literal '{0}' is out of range.")]
    NumberOverflow(String),
    #[error("Invalid {charset} byte 0x{byte:02X}.")]
    InvalidEncoding { charset: Charset, byte: u8 },
}

impl LexError {
    pub fn new(line: usize, column: usize, kind: LexErrorKind) -> Self {
        LexError { line, column, kind }
    }
}
