//! CovScript compiler.
//!
//! Turns source text into executable statements:
//!
//! 1. **Lex** via `cov_lexer` into pooled tokens.
//! 2. **Split** the token stream into lines.
//! 3. **Resolve brackets** into list tokens, then into expression payloads.
//! 4. **Build** expression trees by operator precedence.
//! 5. **Trim and fold** trees.
//! 6. **Translate** each line through the grammar it matches.
//!
//! Statements run against an [`Executor`] supplied by the runtime.

mod brackets;
mod builder;
mod compiler;
mod dump;
mod error;
pub mod fold;
mod optimizer;
mod settings;
mod statement;
mod symbols;
mod translator;

pub use brackets::{kill_brackets, kill_expr, process_brackets, split_lines};
pub use builder::gen_tree;
pub use compiler::Compiler;
pub use error::CompileError;
pub use optimizer::THIS;
pub use settings::{CompilerSettings, OptimizeMode, TranslateMode, TrimMode};
pub use statement::{run_all, Executor, Statement, StatementError};
pub use symbols::SymbolTable;
pub use translator::{Method, MethodKind, Translator};

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
