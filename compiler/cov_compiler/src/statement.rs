//! Executable statements and the engine interface they run against.

use std::fmt;

use cov_ir::ExprTree;
use cov_value::{Error, Var};

use crate::Compiler;

/// Operations a statement needs from the engine executing it.
pub trait Executor {
    /// Evaluate an expression tree built by the owning compiler.
    fn eval(&mut self, tree: &ExprTree) -> cov_value::Result<Var>;

    /// Open a scope; with `declare`, bind it as a namespace value.
    fn enter_domain(&mut self, name: &str, declare: bool) -> cov_value::Result<()>;

    fn leave_domain(&mut self, force_clear: bool) -> cov_value::Result<()>;

    fn declare_var(&mut self, name: &str, value: Var, overwrite: bool) -> cov_value::Result<()>;
}

/// Error raised while running a statement, tagged with its source line.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{error}")]
pub struct StatementError {
    pub line: usize,
    pub error: Error,
}

impl StatementError {
    pub fn new(line: usize, error: impl Into<Error>) -> Self {
        StatementError {
            line,
            error: error.into(),
        }
    }
}

/// A translated statement.
pub trait Statement {
    /// Short name used in dumps.
    fn kind(&self) -> &'static str;

    /// Source line the statement starts on.
    fn line(&self) -> usize;

    fn run(&self, exec: &mut dyn Executor) -> Result<(), StatementError>;

    /// Append a human-readable form, one line per statement, indented by
    /// `depth` levels.
    fn dump(&self, compiler: &Compiler, out: &mut String, depth: usize);
}

impl fmt::Debug for dyn Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} statement, line {}>", self.kind(), self.line())
    }
}

/// Run `body` in order, stopping at the first error.
pub fn run_all(body: &[Box<dyn Statement>], exec: &mut dyn Executor) -> Result<(), StatementError> {
    body.iter().try_for_each(|stmt| stmt.run(exec))
}
