//! `InstanceBuilder` for configuring an [`Instance`] before its first compile.

use cov_compiler::CompilerSettings;
use cov_ir::CsymInfo;
use cov_lexer::Charset;
use cov_value::Var;

use super::Instance;
use crate::statements::install_grammar;
use crate::RuntimeConfig;

/// Builder for [`Instance`]s.
///
/// Starts from [`RuntimeConfig::default`] with the built-in grammar
/// enabled.
pub struct InstanceBuilder {
    config: RuntimeConfig,
    constants: Vec<(String, Var)>,
    csyms: Vec<CsymInfo>,
    default_grammar: bool,
}

impl Default for InstanceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InstanceBuilder {
    pub fn new() -> Self {
        Self::from_config(RuntimeConfig::default())
    }

    pub fn from_config(config: RuntimeConfig) -> Self {
        InstanceBuilder {
            config,
            constants: Vec::new(),
            csyms: Vec::new(),
            default_grammar: true,
        }
    }

    /// Set the file name reported in exceptions.
    #[must_use]
    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.config.file_path = path.into();
        self
    }

    #[must_use]
    pub fn package_name(mut self, name: impl Into<String>) -> Self {
        self.config.package_name = name.into();
        self
    }

    #[must_use]
    pub fn import_path(mut self, path: impl Into<String>) -> Self {
        self.config.import_path = path.into();
        self
    }

    /// Set the slot reserve of the global stack.
    ///
    /// Fibers created by the instance derive their own reserve from it.
    #[must_use]
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = size;
        self
    }

    #[must_use]
    pub fn gc_threshold(mut self, threshold: usize) -> Self {
        self.config.gc_threshold = threshold;
        self
    }

    /// Set the encoding used by [`Instance::compile_bytes`].
    #[must_use]
    pub fn charset(mut self, charset: Charset) -> Self {
        self.config.charset = charset;
        self
    }

    #[must_use]
    pub fn compiler_settings(mut self, settings: CompilerSettings) -> Self {
        self.config.compiler = settings;
        self
    }

    /// Register a compile-time constant for namespace optimization.
    #[must_use]
    pub fn constant(mut self, name: impl Into<String>, value: Var) -> Self {
        self.constants.push((name.into(), value));
        self
    }

    /// Register relocation data for generated sources.
    #[must_use]
    pub fn csym(mut self, info: CsymInfo) -> Self {
        self.csyms.push(info);
        self
    }

    /// Leave the compiler without the built-in statement grammar.
    #[must_use]
    pub fn without_default_grammar(mut self) -> Self {
        self.default_grammar = false;
        self
    }

    pub fn build(self) -> Instance {
        let mut instance = Instance::bare(self.config);
        let compiler = instance.compiler_mut();
        if self.default_grammar {
            install_grammar(compiler);
        }
        for (name, value) in self.constants {
            compiler.add_constant(name, value);
        }
        for info in self.csyms {
            compiler.import_csym(info);
        }
        instance
    }
}
