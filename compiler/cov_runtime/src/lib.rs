//! CovScript execution runtime.
//!
//! Ties the compiler and the memory manager together:
//! - [`Instance`] compiles a source unit and interprets its statements
//! - [`Memory`] layers a running fiber's manager over the global one
//! - the built-in grammar covers expressions, `var`, `block` and
//!   `namespace`
//!
//! Errors surface as [`ScriptError`]s carrying the file, line and source
//! text of the failing statement.

mod config;
mod error;
mod eval;
mod fiber;
mod instance;
mod memory;
mod statements;

pub use config::{RuntimeConfig, STACK_PRESERVE};
pub use error::{FatalError, ScriptError, ScriptException};
pub use eval::Evaluator;
pub use fiber::{Fiber, FiberState};
pub use instance::{Instance, InstanceBuilder, ScopeGuard};
pub use memory::Memory;
pub use statements::{
    install_grammar, BlockStatement, ExpressionStatement, NamespaceStatement, VarStatement,
};

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call multiple times. Enable with `RUST_LOG=cov_runtime=debug`,
/// or `RUST_LOG=cov_memory=trace` for domain and visitor traffic.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
