//! The compiler facade.
//!
//! [`Compiler`] owns the token pool of a compilation unit together with
//! the symbol table, settings, constant table and registered grammars,
//! and exposes the build pipeline:
//!
//! - [`build_expr`](Compiler::build_expr): one expression to a tree
//! - [`build_line`](Compiler::build_line): one or more lines of an
//!   interactive session to processed lines
//! - [`build_ast`](Compiler::build_ast): a whole source file to processed
//!   lines
//!
//! Processed lines then go through [`translate`](Compiler::translate) or
//! [`code_gen`](Compiler::code_gen).

use cov_ir::{CsymInfo, ExprTree, Signal, TokenId, TokenKind, TokenLine, TokenPool};
use cov_lexer::{tokenize, Charset};
use cov_value::Var;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::brackets::{kill_brackets, kill_expr, process_brackets, split_lines};
use crate::builder::gen_tree;
use crate::translator::Translator;
use crate::{CompileError, CompilerSettings, SymbolTable, TranslateMode};

pub struct Compiler {
    pub(crate) symbols: SymbolTable,
    pub(crate) settings: CompilerSettings,
    pub(crate) pool: TokenPool,
    pub(crate) translator: Translator,
    pub(crate) constants: FxHashMap<String, Var>,
    pub(crate) members: FxHashSet<String>,
    csyms: FxHashMap<String, CsymInfo>,
}

impl Default for Compiler {
    fn default() -> Self {
        Compiler::new(CompilerSettings::default())
    }
}

impl Compiler {
    pub fn new(settings: CompilerSettings) -> Self {
        Compiler::with_symbols(SymbolTable::default(), settings)
    }

    pub fn with_symbols(symbols: SymbolTable, settings: CompilerSettings) -> Self {
        Compiler {
            symbols,
            settings,
            pool: TokenPool::new(),
            translator: Translator::new(),
            constants: FxHashMap::default(),
            members: FxHashSet::default(),
            csyms: FxHashMap::default(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn settings(&self) -> &CompilerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut CompilerSettings {
        &mut self.settings
    }

    pub fn pool(&self) -> &TokenPool {
        &self.pool
    }

    /// Release every pooled token. Trees and statements built so far must
    /// not be used afterwards.
    pub fn collect_tokens(&mut self) -> usize {
        let count = self.pool.collect();
        tracing::debug!(count, "collected tokens");
        count
    }

    /// Level of the signal token `id`.
    pub fn get_signal_level(&self, id: TokenId) -> Result<u8, CompileError> {
        self.symbols.signal_level(&self.pool, id)
    }

    pub fn is_left_associative(&self, id: TokenId) -> Result<bool, CompileError> {
        self.symbols.token_left_associative(&self.pool, id)
    }

    /// Make `name` a compile-time constant for namespace optimization.
    pub fn add_constant(&mut self, name: impl Into<String>, value: Var) -> &mut Self {
        self.constants.insert(name.into(), value);
        self
    }

    pub fn constant(&self, name: &str) -> Option<&Var> {
        self.constants.get(name)
    }

    /// Names that trimming rewrites to `this.name`.
    pub fn set_member_context<I, S>(&mut self, members: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.members = members.into_iter().map(Into::into).collect();
    }

    pub fn clear_member_context(&mut self) {
        self.members.clear();
    }

    pub fn import_csym(&mut self, info: CsymInfo) {
        self.csyms.insert(info.file.clone(), info);
    }

    pub fn csym(&self, file: &str) -> Option<&CsymInfo> {
        self.csyms.get(file)
    }

    /// Run `f`; on failure free the tokens it allocated.
    fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        let mark = self.pool.mark();
        let result = f(self);
        if result.is_err() {
            self.pool.rollback(mark);
        }
        result
    }

    /// Lex and build a single expression.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_expr(&mut self, source: &str) -> Result<ExprTree, CompileError> {
        self.transaction(|this| {
            let tokens = tokenize(source, &this.symbols.lexicon, &mut this.pool, 1)?;
            let mut line = process_brackets(&mut this.pool, &tokens)?;
            kill_brackets(&mut this.pool, &this.symbols, &mut line)?;
            gen_tree(&this.pool, &this.symbols, &line)
        })
    }

    /// Lex interactive input starting at `line_num` into processed lines.
    #[tracing::instrument(level = "debug", skip_all, fields(line = line_num))]
    pub fn build_line(
        &mut self,
        source: &str,
        line_num: usize,
    ) -> Result<Vec<TokenLine>, CompileError> {
        self.transaction(|this| {
            let tokens = tokenize(source, &this.symbols.lexicon, &mut this.pool, line_num)?;
            this.build_lines(tokens, line_num)
        })
    }

    /// Lex a whole source file into processed lines.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn build_ast(&mut self, source: &str) -> Result<Vec<TokenLine>, CompileError> {
        self.transaction(|this| {
            let tokens = tokenize(source, &this.symbols.lexicon, &mut this.pool, 1)?;
            this.build_lines(tokens, 1)
        })
    }

    /// Decode `bytes` with `charset`, then [`build_ast`](Self::build_ast).
    pub fn build_ast_bytes(
        &mut self,
        bytes: &[u8],
        charset: Charset,
    ) -> Result<Vec<TokenLine>, CompileError> {
        let source = cov_lexer::decode(bytes, charset)?;
        self.build_ast(&source)
    }

    fn build_lines(
        &mut self,
        mut tokens: TokenLine,
        first_line: usize,
    ) -> Result<Vec<TokenLine>, CompileError> {
        let last = tokens.last().map(|&id| self.pool.get(id));
        if !last.is_some_and(|token| matches!(token.kind, TokenKind::Endline)) {
            let line = last.map_or(first_line, |token| token.line);
            tokens.push(self.pool.alloc(TokenKind::Endline, line));
        }
        split_lines(&self.pool, &tokens)
            .iter()
            .map(|line| self.process_line(line))
            .collect()
    }

    /// Resolve brackets and collapse expressions in one split line.
    pub fn process_line(&mut self, line: &[TokenId]) -> Result<TokenLine, CompileError> {
        let mut line = process_brackets(&mut self.pool, line)?;
        kill_brackets(&mut self.pool, &self.symbols, &mut line)?;
        kill_expr(&mut self.pool, &self.symbols, &line)
    }

    /// Source line of the first token of `line`.
    pub fn line_number(&self, line: &[TokenId]) -> usize {
        line.first()
            .and_then(|&id| self.pool.try_get(id))
            .map_or(0, |token| token.line)
    }

    /// Copy of the expression tree held by token `line[index]`.
    pub fn expr_at(&self, line: &[TokenId], index: usize) -> Result<ExprTree, CompileError> {
        match line.get(index).and_then(|&id| self.pool.kind(id)) {
            Some(TokenKind::Expr(tree)) => Ok(tree.clone()),
            _ => Err(CompileError::new("Expected an expression.")),
        }
    }

    /// Prepare an expression for a statement: trimmed and optimized unless
    /// `mode` is raw.
    pub fn prepare_expr(
        &mut self,
        mut tree: ExprTree,
        mode: TranslateMode,
    ) -> Result<ExprTree, CompileError> {
        if mode == TranslateMode::Optimized {
            self.optimize_expression(&mut tree)?;
        }
        Ok(tree)
    }

    /// Identifier held by the root of `tree`, if that is all it holds.
    pub fn root_identifier(&self, tree: &ExprTree) -> Option<&str> {
        let id = *tree.data(tree.root()).ok()?;
        match self.pool.kind(id)? {
            TokenKind::Id(name) => Some(name),
            _ => None,
        }
    }

    /// Signal held by the root of `tree`.
    pub fn root_signal(&self, tree: &ExprTree) -> Option<Signal> {
        let id = *tree.data(tree.root()).ok()?;
        self.pool.kind(id)?.signal()
    }
}
