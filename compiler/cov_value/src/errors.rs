//! Error types raised by value operations.
//!
//! # Structured Error Categories
//!
//! - `LangError`: a concrete type lacks a capability (operator, hashing,
//!   integer conversion). Carries no category prefix.
//! - `RuntimeError`: a script did something invalid (null access, wrong
//!   dynamic type, undefined variable). Typed through `RuntimeErrorKind`.
//! - `InternalError`: an engine invariant was violated.
//!
//! `Error` unifies the three for operations that can raise any of them.
//! Factory functions are the public construction API.

use std::fmt;

use crate::operator::Operator;

/// Result of a value operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Missing capability on a concrete script type.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct LangError {
    message: String,
}

impl LangError {
    pub fn new(message: impl Into<String>) -> Self {
        LangError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `Type T does not support <op> operator.`
    pub fn unsupported_operator(type_name: &str, op: Operator) -> Self {
        Self::new(format!(
            "Type {type_name} does not support {} operator.",
            op.display_form()
        ))
    }

    pub fn cannot_convert_to_integer(type_name: &str) -> Self {
        Self::new(format!(
            "Target type {type_name} cannot convert to integer."
        ))
    }

    pub fn unhashable(type_name: &str) -> Self {
        Self::new(format!("Target type {type_name} unhashable."))
    }
}

/// Typed runtime error category.
///
/// The `Display` impl produces the user-visible message without the
/// `Runtime Error: ` prefix, which `RuntimeError` adds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    NullAccess,
    TypeMismatch { provided: String, expected: String },
    UndefinedVariable { name: String },
    AlreadyDefined { name: String },
    EmptyTreeNode,
    DivideByZero,
    Custom(String),
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuntimeErrorKind::NullAccess => f.write_str("Instance null variable."),
            RuntimeErrorKind::TypeMismatch { provided, expected } => write!(
                f,
                "Instance variable with wrong type. Provided {provided}, expected {expected}"
            ),
            RuntimeErrorKind::UndefinedVariable { name } => {
                write!(f, "Use of undefined variable \"{name}\".")
            }
            RuntimeErrorKind::AlreadyDefined { name } => {
                write!(f, "Variable \"{name}\" already defined in current scope.")
            }
            RuntimeErrorKind::EmptyTreeNode => f.write_str("Tree node is empty."),
            RuntimeErrorKind::DivideByZero => f.write_str("Divide by zero."),
            RuntimeErrorKind::Custom(message) => f.write_str(message),
        }
    }
}

/// Recoverable error raised by script execution.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Runtime Error: {kind}")]
pub struct RuntimeError {
    kind: RuntimeErrorKind,
}

impl RuntimeError {
    pub fn new(kind: RuntimeErrorKind) -> Self {
        RuntimeError { kind }
    }

    pub fn kind(&self) -> &RuntimeErrorKind {
        &self.kind
    }

    /// Message without the category prefix.
    pub fn what(&self) -> String {
        self.kind.to_string()
    }

    pub fn null_access() -> Self {
        Self::new(RuntimeErrorKind::NullAccess)
    }

    pub fn type_mismatch(provided: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::TypeMismatch {
            provided: provided.into(),
            expected: expected.into(),
        })
    }

    pub fn undefined_variable(name: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::UndefinedVariable { name: name.into() })
    }

    pub fn already_defined(name: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::AlreadyDefined { name: name.into() })
    }

    pub fn empty_tree_node() -> Self {
        Self::new(RuntimeErrorKind::EmptyTreeNode)
    }

    pub fn divide_by_zero() -> Self {
        Self::new(RuntimeErrorKind::DivideByZero)
    }

    pub fn custom(message: impl Into<String>) -> Self {
        Self::new(RuntimeErrorKind::Custom(message.into()))
    }
}

impl From<RuntimeErrorKind> for RuntimeError {
    fn from(kind: RuntimeErrorKind) -> Self {
        RuntimeError::new(kind)
    }
}

/// Violated engine invariant. Aborts the current operation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("Internal Error: {message}")]
pub struct InternalError {
    message: String,
}

impl InternalError {
    pub fn new(message: impl Into<String>) -> Self {
        InternalError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Any error a value operation can raise.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
    #[error(transparent)]
    Lang(#[from] LangError),
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl Error {
    /// Message without the category prefix.
    pub fn what(&self) -> String {
        match self {
            Error::Runtime(err) => err.what(),
            Error::Lang(err) => err.message().to_owned(),
            Error::Internal(err) => err.message().to_owned(),
        }
    }

    pub fn is_lang_error(&self) -> bool {
        matches!(self, Error::Lang(_))
    }
}

impl From<RuntimeErrorKind> for Error {
    fn from(kind: RuntimeErrorKind) -> Self {
        Error::Runtime(RuntimeError::new(kind))
    }
}

#[cfg(test)]
mod tests;
