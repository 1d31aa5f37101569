//! Errors surfaced by an [`Instance`](crate::Instance).

/// A located script failure.
///
/// `what` carries the category prefix (`Compile Error: `,
/// `Runtime Error: ` and so on).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("File \"{file}\", line {line}: {what}\n>\t{code}\n")]
pub struct ScriptException {
    pub file: String,
    pub line: usize,
    pub code: String,
    pub what: String,
}

/// Unrecoverable engine state.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Fatal Error: {message}")]
pub struct FatalError {
    message: String,
}

impl FatalError {
    pub fn new(message: impl Into<String>) -> Self {
        FatalError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Anything compiling or interpreting a script can fail with.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScriptError {
    #[error(transparent)]
    Compile(ScriptException),
    #[error(transparent)]
    Runtime(ScriptException),
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl ScriptError {
    pub fn exception(&self) -> Option<&ScriptException> {
        match self {
            ScriptError::Compile(exception) | ScriptError::Runtime(exception) => Some(exception),
            ScriptError::Fatal(_) => None,
        }
    }
}
