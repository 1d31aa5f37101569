//! Instance configuration.

use cov_compiler::CompilerSettings;
use cov_lexer::Charset;
use cov_memory::{DEFAULT_GC_THRESHOLD, DEFAULT_STACK_RESERVE};

/// Default slot reserve of a child fiber's stack.
pub const STACK_PRESERVE: usize = DEFAULT_STACK_RESERVE;

/// Settings an [`Instance`](crate::Instance) is built from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Name reported in exceptions.
    pub file_path: String,
    pub package_name: String,
    /// Search path for imports, kept for embedders.
    pub import_path: String,
    /// Slot reserve of the global stack.
    pub stack_size: usize,
    /// Heap growth between two non-forced collections.
    pub gc_threshold: usize,
    /// Encoding of byte sources.
    pub charset: Charset,
    pub compiler: CompilerSettings,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            file_path: "<unknown>".to_owned(),
            package_name: String::new(),
            import_path: ".".to_owned(),
            stack_size: DEFAULT_STACK_RESERVE,
            gc_threshold: DEFAULT_GC_THRESHOLD,
            charset: Charset::default(),
            compiler: CompilerSettings::default(),
        }
    }
}

impl RuntimeConfig {
    /// Stack reserve for fibers spawned by this instance: a tenth of the
    /// global stack when that holds at least 1000 slots.
    pub fn child_stack_size(&self) -> usize {
        if self.stack_size >= 1000 {
            self.stack_size / 10
        } else {
            STACK_PRESERVE
        }
    }
}
