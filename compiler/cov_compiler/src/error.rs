//! Compile-time errors.

use cov_lexer::LexError;
use cov_value::RuntimeError;

/// Error raised while lexing, building or translating source.
///
/// Every variant displays with the `Compile Error: ` prefix. Grammar errors
/// carry the source line they were detected on when it is known.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("Compile Error: {0}")]
    Lex(#[from] LexError),
    #[error("Compile Error: {message}")]
    Grammar {
        message: String,
        line: Option<usize>,
    },
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        CompileError::Grammar {
            message: message.into(),
            line: None,
        }
    }

    /// Attach `line` unless a line is already known.
    #[must_use]
    pub fn at(self, line: usize) -> Self {
        match self {
            CompileError::Grammar {
                message,
                line: None,
            } => CompileError::Grammar {
                message,
                line: Some(line),
            },
            other => other,
        }
    }

    pub fn line(&self) -> Option<usize> {
        match self {
            CompileError::Lex(err) => Some(err.line),
            CompileError::Grammar { line, .. } => *line,
        }
    }

    /// Message without the `Compile Error: ` prefix.
    pub fn what(&self) -> String {
        match self {
            CompileError::Lex(err) => err.to_string(),
            CompileError::Grammar { message, .. } => message.clone(),
        }
    }
}

// Stale tree iterators surface as grammar errors.
impl From<RuntimeError> for CompileError {
    fn from(err: RuntimeError) -> Self {
        CompileError::new(err.what())
    }
}
