//! Grammar translation.
//!
//! # Design
//!
//! A grammar is a token pattern: keywords must match exactly, every other
//! token matches by kind alone. Each processed line is matched against the
//! registered grammars and handed to the winning [`Method`]. Block methods
//! collect the statements between their opening line and the matching
//! `end` into a body before translating the whole block.

use std::rc::Rc;

use cov_ir::{TokenId, TokenKind, TokenPool};

use crate::{CompileError, Compiler, Statement, TranslateMode};

/// How a grammar participates in block structure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MethodKind {
    /// A standalone statement.
    Single,
    /// Opens a block closed by a `BlockEnd` line.
    BlockBegin,
    /// Closes the innermost open block.
    BlockEnd,
    /// A marker inside an open block, such as `else`.
    BlockSingle,
}

/// Translates the lines of one grammar into statements.
pub trait Method {
    fn kind(&self) -> MethodKind;

    /// Translate a `Single` or `BlockSingle` line.
    fn translate(
        &self,
        _compiler: &mut Compiler,
        _line: &[TokenId],
        _mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        Err(CompileError::new("Grammar does not translate standalone lines."))
    }

    /// Translate a `BlockBegin` line together with its body.
    fn translate_block(
        &self,
        _compiler: &mut Compiler,
        _line: &[TokenId],
        _body: Vec<Box<dyn Statement>>,
        _mode: TranslateMode,
    ) -> Result<Box<dyn Statement>, CompileError> {
        Err(CompileError::new("Grammar does not open a block."))
    }
}

struct Grammar {
    pattern: Vec<TokenKind>,
    method: Rc<dyn Method>,
}

/// Registered grammars.
#[derive(Default)]
pub struct Translator {
    grammars: Vec<Grammar>,
}

impl Translator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: Vec<TokenKind>, method: Rc<dyn Method>) {
        self.grammars.push(Grammar { pattern, method });
    }

    pub fn len(&self) -> usize {
        self.grammars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.is_empty()
    }

    /// Find the single grammar matching `line`.
    ///
    /// Candidates are narrowed by the first token, then by length, then
    /// position by position. The trailing terminator is not compared.
    pub fn find(&self, pool: &TokenPool, line: &[TokenId]) -> Result<Rc<dyn Method>, CompileError> {
        let Some(first) = line.first().and_then(|&id| pool.kind(id)).filter(|_| line.len() > 1)
        else {
            return Err(CompileError::new("Empty input when matching grammar."));
        };
        let mut candidates: Vec<&Grammar> = self
            .grammars
            .iter()
            .filter(|g| g.pattern.first().is_some_and(|p| p.grammar_eq(first)))
            .filter(|g| g.pattern.len() == line.len())
            .collect();
        for (index, &id) in line.iter().enumerate().take(line.len() - 1).skip(1) {
            let Some(kind) = pool.kind(id) else {
                return Err(CompileError::new("Null token in line."));
            };
            candidates.retain(|g| g.pattern[index].grammar_eq(kind));
        }
        match candidates.as_slice() {
            [] => Err(CompileError::new("Unknown grammar.")),
            [only] => Ok(Rc::clone(&only.method)),
            _ => Err(CompileError::new("Ambiguous grammar.")),
        }
    }
}

struct OpenBlock {
    method: Rc<dyn Method>,
    line: Vec<TokenId>,
    body: Vec<Box<dyn Statement>>,
}

fn line_number(pool: &TokenPool, line: &[TokenId]) -> usize {
    line.first()
        .and_then(|&id| pool.try_get(id))
        .map_or(0, |token| token.line)
}

impl Compiler {
    /// Register `method` for lines matching `pattern`.
    pub fn add_method(&mut self, pattern: Vec<TokenKind>, method: Rc<dyn Method>) -> &mut Self {
        self.translator.add(pattern, method);
        self
    }

    pub fn match_method(&self, line: &[TokenId]) -> Result<Rc<dyn Method>, CompileError> {
        let line_num = line_number(&self.pool, line);
        self.translator
            .find(&self.pool, line)
            .map_err(|err| err.at(line_num))
    }

    /// Translate processed lines into statements with optimized expressions.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = lines.len()))]
    pub fn translate(
        &mut self,
        lines: &[Vec<TokenId>],
    ) -> Result<Vec<Box<dyn Statement>>, CompileError> {
        self.translate_lines(lines, TranslateMode::Optimized)
    }

    /// Translate processed lines keeping expressions exactly as built.
    #[tracing::instrument(level = "debug", skip_all, fields(lines = lines.len()))]
    pub fn code_gen(
        &mut self,
        lines: &[Vec<TokenId>],
    ) -> Result<Vec<Box<dyn Statement>>, CompileError> {
        self.translate_lines(lines, TranslateMode::Raw)
    }

    fn translate_lines(
        &mut self,
        lines: &[Vec<TokenId>],
        mode: TranslateMode,
    ) -> Result<Vec<Box<dyn Statement>>, CompileError> {
        let mut top: Vec<Box<dyn Statement>> = Vec::new();
        let mut blocks: Vec<OpenBlock> = Vec::new();

        for line in lines {
            let line_num = line_number(&self.pool, line);
            let method = self.match_method(line)?;
            match method.kind() {
                MethodKind::Single => {
                    let stmt = method.translate(self, line, mode).map_err(|e| e.at(line_num))?;
                    match blocks.last_mut() {
                        Some(block) => block.body.push(stmt),
                        None => top.push(stmt),
                    }
                }
                MethodKind::BlockBegin => blocks.push(OpenBlock {
                    method,
                    line: line.clone(),
                    body: Vec::new(),
                }),
                MethodKind::BlockSingle => {
                    let Some(block) = blocks.last_mut() else {
                        return Err(CompileError::new("Unexpected statement outside of a block.")
                            .at(line_num));
                    };
                    let stmt = method.translate(self, line, mode).map_err(|e| e.at(line_num))?;
                    block.body.push(stmt);
                }
                MethodKind::BlockEnd => {
                    let Some(block) = blocks.pop() else {
                        return Err(CompileError::new("Hanging end statement.").at(line_num));
                    };
                    let begin = line_number(&self.pool, &block.line);
                    let stmt = block
                        .method
                        .translate_block(self, &block.line, block.body, mode)
                        .map_err(|e| e.at(begin))?;
                    match blocks.last_mut() {
                        Some(parent) => parent.body.push(stmt),
                        None => top.push(stmt),
                    }
                }
            }
        }
        if let Some(block) = blocks.last() {
            let begin = line_number(&self.pool, &block.line);
            return Err(CompileError::new("Lack of the 'end' signal.").at(begin));
        }
        tracing::debug!(statements = top.len(), "translated");
        Ok(top)
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
