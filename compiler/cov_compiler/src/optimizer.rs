//! Tree trimming and constant folding.
//!
//! # Design
//!
//! Trimming normalizes a freshly built tree: parenthesized sub-expressions
//! are spliced in place of their `Expr` leaves, and identifiers naming
//! members of the enclosing type become `this.name`. Folding then replaces
//! every operator whose operands are all literal with the literal result.
//! Folding never reports an error: an operation that would fail at run
//! time is left in the tree so it fails there, with a line number.

use std::mem;

use cov_ir::{ExprTree, Signal, TokenId, TokenKind, TreeIter};
use cov_value::{ensure_sufficient_stack, Callable, CallableKind, Var};

use crate::fold::{apply_binary, apply_unary, is_foldable_binary};
use crate::{CompileError, Compiler, OptimizeMode, TrimMode};

/// Name of the receiver that member names are deduced against.
pub const THIS: &str = "this";

impl Compiler {
    /// Trim `tree`, then fold it unless the optimizer is disabled.
    pub fn optimize_expression(&mut self, tree: &mut ExprTree) -> Result<(), CompileError> {
        self.trim_expression(tree, self.settings.effective_trim())?;
        if !self.settings.disable_optimizer {
            let mode = self.settings.optimize;
            self.fold_expression(tree, mode);
        }
        Ok(())
    }

    /// Splice parenthesized sub-expressions and deduce `this`.
    pub fn trim_expression(&mut self, tree: &mut ExprTree, mode: TrimMode) -> Result<(), CompileError> {
        let root = tree.root();
        self.trim_node(tree, root, mode)
    }

    fn trim_node(&mut self, tree: &mut ExprTree, it: TreeIter, mode: TrimMode) -> Result<(), CompileError> {
        if !tree.usable(it) {
            return Ok(());
        }
        ensure_sufficient_stack(|| {
            let id = *tree.data(it)?;
            let line = self.pool.get(id).line;
            match &self.pool.get(id).kind {
                TokenKind::Expr(inner) if mode != TrimMode::NoExprFold && !inner.is_empty() => {
                    let inner = inner.clone();
                    tree.merge(it, &inner)?;
                    return self.trim_node(tree, it, mode);
                }
                TokenKind::Id(name)
                    if mode != TrimMode::NoThisDeduce
                        && self.members.contains(name)
                        && !self.is_member_name(tree, it) =>
                {
                    let member = name.clone();
                    let dot = self.pool.alloc(TokenKind::Signal(Signal::Dot), line);
                    let this = self.pool.alloc(TokenKind::Id(THIS.to_owned()), line);
                    let name = self.pool.alloc(TokenKind::Id(member), line);
                    *tree.data_mut(it)? = dot;
                    tree.insert_left_left(it, this)?;
                    tree.insert_right_right(it, name)?;
                    return Ok(());
                }
                _ => {}
            }
            self.map_lists(id, |this, inner| this.trim_expression(inner, mode))?;
            let (left, right) = (tree.left(it)?, tree.right(it)?);
            self.trim_node(tree, left, mode)?;
            self.trim_node(tree, right, mode)
        })
    }

    /// Whether `it` is the member name on the right of `.` or `->`.
    fn is_member_name(&self, tree: &ExprTree, it: TreeIter) -> bool {
        let Ok(parent) = tree.parent(it) else {
            return false;
        };
        if parent.is_null() || tree.right(parent).ok() != Some(it) {
            return false;
        }
        tree.data(parent)
            .ok()
            .and_then(|&id| self.pool.kind(id))
            .and_then(TokenKind::signal)
            .is_some_and(|signal| matches!(signal, Signal::Dot | Signal::Arrow))
    }

    /// Apply `f` to every tree nested in the list payload of token `id`.
    fn map_lists(
        &mut self,
        id: TokenId,
        mut f: impl FnMut(&mut Self, &mut ExprTree) -> Result<(), CompileError>,
    ) -> Result<(), CompileError> {
        let mut trees = match &mut self.pool.get_mut(id).kind {
            TokenKind::Arglist(trees) | TokenKind::Array(trees) | TokenKind::Parallel(trees) => {
                mem::take(trees)
            }
            TokenKind::Expr(tree) => vec![mem::take(tree)],
            _ => return Ok(()),
        };
        let result = trees.iter_mut().try_for_each(|tree| f(self, tree));
        match &mut self.pool.get_mut(id).kind {
            TokenKind::Arglist(slot) | TokenKind::Array(slot) | TokenKind::Parallel(slot) => {
                *slot = trees;
            }
            TokenKind::Expr(slot) => *slot = trees.pop().unwrap_or_default(),
            _ => {}
        }
        result
    }

    /// Fold literal sub-expressions of `tree` in place.
    pub fn fold_expression(&mut self, tree: &mut ExprTree, mode: OptimizeMode) {
        let root = tree.root();
        self.fold_node(tree, root, mode);
    }

    fn literal(&self, tree: &ExprTree, it: TreeIter) -> Option<Var> {
        let id = *tree.data(it).ok()?;
        match self.pool.kind(id)? {
            TokenKind::Value(value) => Some(value.clone()),
            _ => None,
        }
    }

    fn replace_with_value(&mut self, tree: &mut ExprTree, it: TreeIter, value: Var) {
        let Ok(&id) = tree.data(it) else { return };
        let line = self.pool.get(id).line;
        let value_id = self.pool.alloc(TokenKind::Value(value), line);
        if let Ok(slot) = tree.data_mut(it) {
            *slot = value_id;
        }
        let _ = tree.erase_left(it);
        let _ = tree.erase_right(it);
    }

    fn fold_node(&mut self, tree: &mut ExprTree, it: TreeIter, mode: OptimizeMode) {
        if !tree.usable(it) {
            return;
        }
        ensure_sufficient_stack(|| {
            let Ok(&id) = tree.data(it) else { return };
            let _ = self.map_lists(id, |this, inner| {
                this.fold_expression(inner, mode);
                Ok(())
            });
            let (Ok(left), Ok(right)) = (tree.left(it), tree.right(it)) else {
                return;
            };
            let signal = match &self.pool.get(id).kind {
                TokenKind::Id(name) if mode == OptimizeMode::EnableNamespace => {
                    let value = self.constants.get(name).cloned();
                    if let Some(value) = value {
                        self.replace_with_value(tree, it, value);
                    }
                    return;
                }
                TokenKind::Signal(signal) => *signal,
                _ => return,
            };
            self.fold_node(tree, left, mode);
            // The right side of `.` and `->` is a member name.
            if !matches!(signal, Signal::Dot | Signal::Arrow) {
                self.fold_node(tree, right, mode);
            }
            if let Some(value) = self.fold_signal(tree, signal, left, right, mode) {
                self.replace_with_value(tree, it, value);
            }
        });
    }

    fn fold_signal(
        &self,
        tree: &ExprTree,
        signal: Signal,
        left: TreeIter,
        right: TreeIter,
        mode: OptimizeMode,
    ) -> Option<Var> {
        match signal {
            _ if is_foldable_binary(signal) => {
                let (lhs, rhs) = (self.literal(tree, left)?, self.literal(tree, right)?);
                apply_binary(signal, &lhs, &rhs).ok()
            }
            Signal::Minus | Signal::Not if left.is_null() => {
                apply_unary(signal, &self.literal(tree, right)?).ok()
            }
            Signal::Dot if mode == OptimizeMode::EnableNamespace => {
                let receiver = self.literal(tree, left)?;
                let member = match self.pool.kind(*tree.data(right).ok()?)? {
                    TokenKind::Id(name) => name.clone(),
                    _ => return None,
                };
                let value = receiver.access(&member).ok()?.into_owned();
                Some(value)
            }
            Signal::Fcall => {
                let callee = self.literal(tree, left)?;
                let callable = callee.const_val::<Callable>().ok()?;
                if callable.kind() != CallableKind::RequestFold {
                    return None;
                }
                let mut args = self.literal_args(*tree.data(right).ok()?)?;
                callable.call(&mut args).ok()
            }
            _ => None,
        }
    }

    fn literal_args(&self, id: TokenId) -> Option<Vec<Var>> {
        let TokenKind::Arglist(trees) = self.pool.kind(id)? else {
            return None;
        };
        trees
            .iter()
            .map(|arg| {
                if arg.len() == 1 {
                    self.literal(arg, arg.root())
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    reason = "tests use unwrap to panic on unexpected state"
)]
