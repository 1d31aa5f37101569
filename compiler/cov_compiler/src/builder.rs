//! Expression tree construction.
//!
//! # Design
//!
//! Tokens are inserted left to right into a tree whose right spine holds
//! the operators still open for extension. An operand fills the right slot
//! of the operator waiting for one. A binary operator walks down the right
//! spine past every operator that binds looser (or equally loose, for
//! right-associative operators) and takes the place of the node it stops
//! at, adopting that node as its left operand.
//!
//! Prefix operators (`-x`, `!x`, `*x`, `&x`, `++x`) keep their operand on
//! the right and have no left child; postfix `x++` keeps its operand on the
//! left and has no right child.

use cov_ir::{ExprTree, Signal, TokenId, TokenKind, TokenPool, TreeIter};

use crate::{CompileError, SymbolTable};

struct TreeBuilder<'a> {
    pool: &'a TokenPool,
    symbols: &'a SymbolTable,
    tree: ExprTree,
    /// Operator whose right operand is still missing.
    pending: Option<TreeIter>,
}

impl TreeBuilder<'_> {
    fn expects_operand(&self) -> bool {
        self.pending.is_some() || self.tree.is_empty()
    }

    fn place_operand(&mut self, id: TokenId) -> Result<TreeIter, CompileError> {
        let it = match self.pending.take() {
            Some(op) => self.tree.insert_right_right(op, id)?,
            None => self.tree.insert_root_left(TreeIter::NULL, id)?,
        };
        Ok(it)
    }

    fn level(&self, signal: Signal) -> Result<u8, CompileError> {
        self.symbols
            .level(signal)
            .ok_or_else(|| CompileError::new(format!("Unexpected signal \"{signal}\".")))
    }

    /// Where an operator of `level` attaches along the right spine.
    fn insertion_point(&self, level: u8, left_assoc: bool) -> Result<TreeIter, CompileError> {
        let mut it = self.tree.root();
        loop {
            let right = self.tree.right(it)?;
            let Some(TokenKind::Signal(signal)) = self.pool.kind(*self.tree.data(it)?) else {
                return Ok(it);
            };
            if right.is_null() {
                return Ok(it);
            }
            let node_level = self.level(*signal)?;
            if node_level < level || (node_level == level && !left_assoc) {
                it = right;
            } else {
                return Ok(it);
            }
        }
    }

    fn push_signal(&mut self, id: TokenId, signal: Signal) -> Result<(), CompileError> {
        let operand_position = self.expects_operand();
        let postfix = matches!(signal, Signal::Inc | Signal::Dec) && !operand_position;

        if operand_position {
            if !(signal.is_prefix() || matches!(signal, Signal::Inc | Signal::Dec)) {
                return Err(CompileError::new(format!("Missing operand before \"{signal}\".")));
            }
            let it = self.place_operand(id)?;
            self.pending = Some(it);
            return Ok(());
        }
        if signal.is_prefix() {
            return Err(CompileError::new(format!("Missing operator before \"{signal}\".")));
        }

        let level = self.level(signal)?;
        let at = self.insertion_point(level, self.symbols.is_left_associative(signal))?;
        let it = self.tree.insert_root_left(at, id)?;
        if !postfix {
            self.pending = Some(it);
        }
        Ok(())
    }

    fn push(&mut self, id: TokenId) -> Result<(), CompileError> {
        match self.pool.kind(id) {
            None => Err(CompileError::new("Null token in expression.")),
            Some(TokenKind::Signal(signal)) => self.push_signal(id, *signal),
            Some(
                TokenKind::Id(_)
                | TokenKind::Value(_)
                | TokenKind::Expr(_)
                | TokenKind::Arglist(_)
                | TokenKind::Array(_)
                | TokenKind::Parallel(_),
            ) => {
                if !self.expects_operand() {
                    return Err(CompileError::new("Missing operator between operands."));
                }
                self.place_operand(id)?;
                Ok(())
            }
            Some(other) => Err(CompileError::new(format!(
                "Unexpected {:?} token in expression.",
                other.tag()
            ))),
        }
    }

    fn finish(self) -> Result<ExprTree, CompileError> {
        if let Some(op) = self.pending {
            let id = *self.tree.data(op)?;
            let name = self
                .pool
                .kind(id)
                .and_then(TokenKind::signal)
                .map_or_else(String::new, |s| s.to_string());
            return Err(CompileError::new(format!("Missing operand after \"{name}\".")));
        }
        Ok(self.tree)
    }
}

/// Build an expression tree from a bracket-free token run.
///
/// An empty run yields an empty tree.
pub fn gen_tree(
    pool: &TokenPool,
    symbols: &SymbolTable,
    tokens: &[TokenId],
) -> Result<ExprTree, CompileError> {
    let mut builder = TreeBuilder {
        pool,
        symbols,
        tree: ExprTree::new(),
        pending: None,
    };
    for &id in tokens {
        let line = pool.try_get(id).map(|token| token.line);
        builder.push(id).map_err(|err| match line {
            Some(line) => err.at(line),
            None => err,
        })?;
    }
    builder.finish()
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
