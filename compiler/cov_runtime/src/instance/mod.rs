//! The execution instance.
//!
//! An [`Instance`] owns one compilation unit and the memory it runs in:
//! the [`Compiler`] with the built-in grammar installed, the translated
//! statements, the source text kept for diagnostics and the two-tier
//! [`Memory`].
//!
//! # Usage
//!
//! ```text
//! let mut instance = Instance::builder().file_path("main.csc").build();
//! instance.compile("var x = 1 + 2\nx += 1")?;
//! instance.interpret()?;
//! ```

mod builder;
mod scope_guard;

pub use builder::InstanceBuilder;
pub use scope_guard::ScopeGuard;

use cov_compiler::{CompileError, Compiler, Statement, StatementError};
use cov_memory::{MemoryConfig, MemoryManager, Visitor};
use cov_value::{HeapPointer, InternalError, RuntimeError, ScriptType, Var};
use tracing::debug;

use crate::eval::Evaluator;
use crate::fiber::{Fiber, FiberState};
use crate::statements::install_grammar;
use crate::{FatalError, Memory, RuntimeConfig, ScriptError, ScriptException};

pub struct Instance {
    config: RuntimeConfig,
    compiler: Compiler,
    memory: Memory,
    statements: Vec<Box<dyn Statement>>,
    source_lines: Vec<String>,
}

impl Default for Instance {
    fn default() -> Self {
        Instance::new(RuntimeConfig::default())
    }
}

impl Instance {
    /// Instance with the built-in grammar.
    pub fn new(config: RuntimeConfig) -> Self {
        let mut instance = Self::bare(config);
        install_grammar(&mut instance.compiler);
        instance
    }

    /// Instance whose compiler knows no grammar yet.
    pub(crate) fn bare(config: RuntimeConfig) -> Self {
        let global = MemoryManager::with_config(
            "<global>",
            MemoryConfig {
                stack_reserve: config.stack_size,
                gc_threshold: config.gc_threshold,
            },
        );
        Instance {
            compiler: Compiler::new(config.compiler.clone()),
            memory: Memory::new(global),
            statements: Vec::new(),
            source_lines: Vec::new(),
            config,
        }
    }

    pub fn builder() -> InstanceBuilder {
        InstanceBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn compiler_mut(&mut self) -> &mut Compiler {
        &mut self.compiler
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn statements(&self) -> &[Box<dyn Statement>] {
        &self.statements
    }

    /// Compile `source`, replacing the previously compiled program.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.config.file_path))]
    pub fn compile(&mut self, source: &str) -> Result<(), ScriptError> {
        self.statements.clear();
        self.compiler.collect_tokens();
        self.memory.clear_visitors();
        self.source_lines = source.lines().map(str::to_owned).collect();

        let statements = self
            .compiler
            .build_ast(source)
            .and_then(|lines| self.compiler.translate(&lines));
        match statements {
            Ok(statements) => {
                debug!(statements = statements.len(), "compiled");
                self.statements = statements;
                Ok(())
            }
            Err(err) => Err(self.compile_error(&err)),
        }
    }

    /// Decode `bytes` with the configured charset, then [`compile`](Self::compile).
    pub fn compile_bytes(&mut self, bytes: &[u8]) -> Result<(), ScriptError> {
        match cov_lexer::decode(bytes, self.config.charset) {
            Ok(source) => self.compile(&source),
            Err(err) => {
                self.source_lines.clear();
                Err(self.compile_error(&CompileError::from(err)))
            }
        }
    }

    /// Run the compiled statements in order.
    ///
    /// The heap gets a chance to collect after every top-level statement.
    /// A scope left open by a statement is a fatal error.
    #[tracing::instrument(level = "debug", skip_all, fields(file = %self.config.file_path))]
    pub fn interpret(&mut self) -> Result<(), ScriptError> {
        let depth = self.memory.current().domain_depth();
        for stmt in &self.statements {
            let mut evaluator = Evaluator::new(self.compiler.pool(), &mut self.memory);
            if let Err(err) = stmt.run(&mut evaluator) {
                return Err(self.runtime_error(&err));
            }
            let collected = self.memory.gc(false);
            if collected > 0 {
                debug!(collected, line = stmt.line(), "collected heap records");
            }
        }
        let after = self.memory.current().domain_depth();
        if after != depth {
            return Err(FatalError::new(format!(
                "Scope stack is unbalanced: depth {depth} before execution, {after} after."
            ))
            .into());
        }
        Ok(())
    }

    /// Compile and interpret `source`.
    pub fn run(&mut self, source: &str) -> Result<(), ScriptError> {
        self.compile(source)?;
        self.interpret()
    }

    /// Evaluate a single expression against the current memory.
    pub fn eval_expr(&mut self, source: &str) -> Result<Var, ScriptError> {
        let exception = |what: String| ScriptException {
            file: self.config.file_path.clone(),
            line: 1,
            code: source.trim().to_owned(),
            what,
        };
        let mut tree = match self.compiler.build_expr(source) {
            Ok(tree) => tree,
            Err(err) => return Err(ScriptError::Compile(exception(err.to_string()))),
        };
        if let Err(err) = self.compiler.optimize_expression(&mut tree) {
            return Err(ScriptError::Compile(exception(err.to_string())));
        }
        Evaluator::new(self.compiler.pool(), &mut self.memory)
            .evaluate(&tree)
            .map_err(|err| ScriptError::Runtime(exception(err.to_string())))
    }

    /// Readable form of the compiled statements.
    pub fn dump_ast(&self) -> String {
        let mut out = String::new();
        for stmt in &self.statements {
            stmt.dump(&self.compiler, &mut out, 0);
        }
        out
    }

    fn exception(&self, line: usize, what: String) -> ScriptException {
        let relocated = self
            .compiler
            .csym(&self.config.file_path)
            .and_then(|info| Some((info.file.clone(), info.relocate(line)?)));
        if let Some((file, (line, code))) = relocated {
            return ScriptException {
                file,
                line,
                code: code.to_owned(),
                what,
            };
        }
        let code = line
            .checked_sub(1)
            .and_then(|index| self.source_lines.get(index))
            .cloned()
            .unwrap_or_default();
        ScriptException {
            file: self.config.file_path.clone(),
            line,
            code,
            what,
        }
    }

    fn compile_error(&self, err: &CompileError) -> ScriptError {
        ScriptError::Compile(self.exception(err.line().unwrap_or(0), err.to_string()))
    }

    fn runtime_error(&self, err: &StatementError) -> ScriptError {
        ScriptError::Runtime(self.exception(err.line, err.to_string()))
    }

    pub fn enter_domain(&mut self, name: &str, declare: bool) -> Result<(), RuntimeError> {
        self.memory.enter_domain(name, declare)
    }

    pub fn leave_domain(&mut self, force_clear: bool) -> Result<(), InternalError> {
        self.memory.leave_domain(force_clear)
    }

    pub fn declare_var(
        &mut self,
        name: &str,
        value: Var,
        overwrite: bool,
    ) -> Result<(), RuntimeError> {
        self.memory.declare_var(name, value, overwrite).map(drop)
    }

    /// Look `name` up in the running fiber, then in the global scope.
    pub fn access(&mut self, name: &str) -> Result<&mut Var, RuntimeError> {
        self.memory.access(&mut Visitor::new(name))
    }

    pub fn gcnew<T: ScriptType>(&mut self, value: T) -> HeapPointer {
        self.memory.gcnew_value(Var::make(value))
    }

    pub fn gc(&mut self, force: bool) -> usize {
        self.memory.gc(force)
    }

    /// Fiber with a stack sized for a child of this instance.
    pub fn new_fiber(&self, name: &str) -> Fiber {
        Fiber::new(
            name,
            MemoryConfig {
                stack_reserve: self.config.child_stack_size(),
                gc_threshold: self.config.gc_threshold,
            },
        )
    }

    /// Run `f` with `fiber`'s memory installed in front of the global one.
    ///
    /// The fiber is suspended afterwards, also when `f` panics.
    pub fn run_fiber<T>(
        &mut self,
        fiber: &mut Fiber,
        f: impl FnOnce(&mut Instance) -> T,
    ) -> Result<T, FatalError> {
        if self.memory.fiber.is_some() {
            return Err(FatalError::new("Another fiber is already running."));
        }
        let Some(manager) = fiber.memory.take() else {
            return Err(FatalError::new(format!(
                "Cannot resume a {} fiber.",
                fiber.state
            )));
        };
        self.memory.fiber = Some(manager);
        fiber.state = FiberState::Running;
        let guard = FiberGuard {
            instance: self,
            fiber,
        };
        Ok(f(&mut *guard.instance))
    }
}

/// Hands a running fiber's memory back when dropped.
struct FiberGuard<'a> {
    instance: &'a mut Instance,
    fiber: &'a mut Fiber,
}

impl Drop for FiberGuard<'_> {
    fn drop(&mut self) {
        self.fiber.memory = self.instance.memory.fiber.take();
        if self.fiber.state == FiberState::Running {
            self.fiber.state = FiberState::Suspended;
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
