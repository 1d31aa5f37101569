//! Tree-walking expression evaluation.
//!
//! # Design
//!
//! An [`Evaluator`] borrows the token pool of the compiler that built the
//! trees and the instance's [`Memory`] side by side, so statements can run
//! while the compiler stays untouched.
//!
//! Operands are evaluated into owned values. Assignments and increments
//! instead resolve their target to a [`Place`]: a root (a variable, a
//! namespace member or a heap pointee) plus the index path below it. The
//! path is walked with mutable index access only when the write happens.

use cov_compiler::fold::{apply_binary, apply_unary, compound_operator, truthy};
use cov_compiler::Executor;
use cov_ir::{ExprTree, Signal, TokenId, TokenKind, TokenPool, TreeIter};
use cov_memory::ScopeValue;
use cov_value::{
    ensure_sufficient_stack, Array, HeapPointer, InternalError, Pair, Result, RuntimeError, Var,
    VarBorrower,
};
use smallvec::SmallVec;

use crate::Memory;

/// Where an assignment writes.
#[derive(Debug)]
enum Root {
    Variable(TokenId, String),
    Member(ScopeValue, String),
    Pointer(HeapPointer),
}

#[derive(Debug)]
struct Place {
    root: Root,
    path: Vec<Var>,
}

pub struct Evaluator<'a> {
    pool: &'a TokenPool,
    memory: &'a mut Memory,
}

impl<'a> Evaluator<'a> {
    pub fn new(pool: &'a TokenPool, memory: &'a mut Memory) -> Self {
        Evaluator { pool, memory }
    }

    /// Value of `tree`; an empty tree evaluates to null.
    pub fn evaluate(&mut self, tree: &ExprTree) -> Result<Var> {
        if tree.is_empty() {
            return Ok(Var::null());
        }
        self.node(tree, tree.root())
    }

    fn kind(&self, tree: &ExprTree, it: TreeIter) -> Result<(TokenId, &'a TokenKind)> {
        let id = *tree.data(it)?;
        let pool: &'a TokenPool = self.pool;
        match pool.kind(id) {
            Some(kind) => Ok((id, kind)),
            None => Err(InternalError::new("Null token in expression.").into()),
        }
    }

    fn node(&mut self, tree: &ExprTree, it: TreeIter) -> Result<Var> {
        ensure_sufficient_stack(|| self.node_inner(tree, it))
    }

    fn node_inner(&mut self, tree: &ExprTree, it: TreeIter) -> Result<Var> {
        let (id, kind) = self.kind(tree, it)?;
        match kind {
            TokenKind::Value(value) => Ok(value.clone()),
            TokenKind::Id(name) => Ok(self.memory.access_at(id, name)?.clone()),
            TokenKind::Expr(inner) => self.evaluate(inner),
            TokenKind::Array(items) => {
                let mut array = Array::new();
                for item in items {
                    array.push_back(self.evaluate(item)?);
                }
                Ok(Var::make(array))
            }
            TokenKind::Parallel(items) => {
                let mut last = Var::null();
                for item in items {
                    last = self.evaluate(item)?;
                }
                Ok(last)
            }
            TokenKind::Signal(signal) => self.signal(tree, it, *signal),
            other => Err(InternalError::new(format!(
                "Unexpected {:?} token in expression.",
                other.tag()
            ))
            .into()),
        }
    }

    fn signal(&mut self, tree: &ExprTree, it: TreeIter, signal: Signal) -> Result<Var> {
        let left = tree.left(it)?;
        let right = tree.right(it)?;
        match signal {
            Signal::Asi | Signal::LnkAsi => {
                let value = self.node(tree, right)?;
                let place = self.place(tree, left)?;
                self.with_place(&place, |target| {
                    *target = value.clone();
                    Ok(())
                })?;
                Ok(value)
            }
            Signal::Inc | Signal::Dec => {
                let step = |target: &mut Var| {
                    if signal == Signal::Inc {
                        target.selfinc()
                    } else {
                        target.selfdec()
                    }
                };
                if left.is_null() {
                    let place = self.place(tree, right)?;
                    self.with_place(&place, |target| {
                        step(target)?;
                        Ok(target.clone())
                    })
                } else {
                    let place = self.place(tree, left)?;
                    self.with_place(&place, |target| {
                        let old = target.clone();
                        step(target)?;
                        Ok(old)
                    })
                }
            }
            Signal::And | Signal::Or => {
                let lhs = truthy(&self.node(tree, left)?)?;
                if lhs == (signal == Signal::Or) {
                    return Ok(Var::make(lhs));
                }
                Ok(Var::make(truthy(&self.node(tree, right)?)?))
            }
            Signal::Choice => {
                let condition = truthy(&self.node(tree, left)?)?;
                let (_, branches) = self.kind(tree, right)?;
                if branches.is_signal(Signal::Pair) {
                    let branch = if condition {
                        tree.left(right)?
                    } else {
                        tree.right(right)?
                    };
                    return self.node(tree, branch);
                }
                // Both branches were literal and folded into one pair.
                let folded = self.node(tree, right)?;
                match folded.const_val::<Pair>() {
                    Ok((first, second)) => Ok(if condition { first } else { second }.clone()),
                    Err(_) => Err(RuntimeError::custom("Choice operator needs ':'.").into()),
                }
            }
            Signal::Com => {
                self.node(tree, left)?;
                self.node(tree, right)
            }
            Signal::Dot | Signal::Arrow => {
                let base = self.node(tree, left)?;
                let member = self.member_name(tree, right)?;
                if signal == Signal::Arrow {
                    return Ok(base.arrow(member)?.into_owned());
                }
                match base.const_val::<ScopeValue>() {
                    Ok(scope) => Ok(self.memory.scope_member(scope, member)?.clone()),
                    Err(_) => Ok(base.access(member)?.into_owned()),
                }
            }
            Signal::Fcall => {
                let callee = self.node(tree, left)?;
                let (_, args) = self.kind(tree, right)?;
                let TokenKind::Arglist(args) = args else {
                    return Err(InternalError::new("Call without an argument list.").into());
                };
                let mut values: SmallVec<[Var; 4]> = SmallVec::with_capacity(args.len());
                for arg in args {
                    values.push(self.evaluate(arg)?);
                }
                callee.call(&mut values)
            }
            Signal::Access => {
                let base = self.node(tree, left)?;
                let index = self.node(tree, right)?;
                Ok(base.index(&index)?.into_owned())
            }
            Signal::Addr => {
                let value = self.node(tree, right)?;
                Ok(Var::make(self.memory.gcnew_value(value)))
            }
            Signal::Minus | Signal::Not | Signal::Escape => {
                let operand = self.node(tree, right)?;
                apply_unary(signal, &operand)
            }
            other => {
                if let Some(op) = compound_operator(other) {
                    let rhs = self.node(tree, right)?;
                    let place = self.place(tree, left)?;
                    return self.with_place(&place, |target| {
                        let result = apply_binary(op, target, &rhs)?;
                        *target = result.clone();
                        Ok(result)
                    });
                }
                let lhs = self.node(tree, left)?;
                let rhs = self.node(tree, right)?;
                apply_binary(other, &lhs, &rhs)
            }
        }
    }

    fn member_name(&self, tree: &ExprTree, it: TreeIter) -> Result<&'a str> {
        match self.kind(tree, it)? {
            (_, TokenKind::Id(name)) => Ok(name),
            _ => Err(RuntimeError::custom("Member name must be an identifier.").into()),
        }
    }

    /// Resolve an assignable expression.
    fn place(&mut self, tree: &ExprTree, it: TreeIter) -> Result<Place> {
        if it.is_null() {
            return Err(RuntimeError::custom("Missing assignment target.").into());
        }
        let (id, kind) = self.kind(tree, it)?;
        match kind {
            TokenKind::Id(name) => Ok(Place {
                root: Root::Variable(id, name.clone()),
                path: Vec::new(),
            }),
            TokenKind::Expr(inner) => self.place(inner, inner.root()),
            TokenKind::Signal(Signal::Access) => {
                let mut place = self.place(tree, tree.left(it)?)?;
                place.path.push(self.node(tree, tree.right(it)?)?);
                Ok(place)
            }
            TokenKind::Signal(Signal::Dot) => {
                let base = self.node(tree, tree.left(it)?)?;
                let member = self.member_name(tree, tree.right(it)?)?;
                match base.const_val::<ScopeValue>() {
                    Ok(scope) => Ok(Place {
                        root: Root::Member(scope.clone(), member.to_owned()),
                        path: Vec::new(),
                    }),
                    Err(_) => Err(RuntimeError::custom(format!(
                        "Member \"{member}\" of type {} is not assignable.",
                        base.type_name()
                    ))
                    .into()),
                }
            }
            TokenKind::Signal(Signal::Escape) => {
                let pointer = self.node(tree, tree.right(it)?)?;
                Ok(Place {
                    root: Root::Pointer(pointer.const_val::<HeapPointer>()?.clone()),
                    path: Vec::new(),
                })
            }
            _ => Err(RuntimeError::custom("Assignment to a temporary value.").into()),
        }
    }

    fn with_place<R>(&mut self, place: &Place, f: impl FnOnce(&mut Var) -> Result<R>) -> Result<R> {
        match &place.root {
            Root::Variable(site, name) => {
                let var = self.memory.access_at(*site, name)?;
                walk(var, &place.path, f)
            }
            Root::Member(scope, name) => {
                let var = self.memory.scope_member(scope, name)?;
                walk(var, &place.path, f)
            }
            Root::Pointer(pointer) => {
                let mut value = pointer.get().clone();
                let result = walk(&mut value, &place.path, f)?;
                pointer.replace(value);
                Ok(result)
            }
        }
    }
}

fn walk<R>(mut target: &mut Var, path: &[Var], f: impl FnOnce(&mut Var) -> Result<R>) -> Result<R> {
    for index in path {
        target = match target.index_mut(index)? {
            VarBorrower::Mut(element) => element,
            _ => return Err(RuntimeError::custom("Index result is not assignable.").into()),
        };
    }
    f(target)
}

impl Executor for Evaluator<'_> {
    fn eval(&mut self, tree: &ExprTree) -> Result<Var> {
        self.evaluate(tree)
    }

    fn enter_domain(&mut self, name: &str, declare: bool) -> Result<()> {
        Ok(self.memory.enter_domain(name, declare)?)
    }

    fn leave_domain(&mut self, force_clear: bool) -> Result<()> {
        Ok(self.memory.leave_domain(force_clear)?)
    }

    fn declare_var(&mut self, name: &str, value: Var, overwrite: bool) -> Result<()> {
        self.memory.declare_var(name, value, overwrite)?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
