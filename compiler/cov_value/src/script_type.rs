//! Capability table for types storable in a [`Var`].
//!
//! # Design
//!
//! Every capability has a default: unsupported operators and conversions
//! raise a [`LangError`] naming the concrete type, stringification falls
//! back to `[TypeName]`, equality falls back to identity and marking is a
//! no-op. A type opts in by overriding the methods it supports.
//!
//! Binary operators receive the right-hand operand already checked to be
//! the same concrete type; [`Var`] reports a type mismatch otherwise.

use crate::borrower::VarBorrower;
use crate::errors::{Error, LangError, Result};
use crate::operator::Operator;
use crate::var::Var;

/// Error for an operator `T` does not implement.
pub fn unsupported<T: ScriptType>(op: Operator) -> Error {
    LangError::unsupported_operator(T::type_name(), op).into()
}

pub trait ScriptType: Clone + 'static {
    /// Name reported in diagnostics and by `typeid`-style introspection.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }

    fn to_integer(&self) -> Result<i64, LangError> {
        Err(LangError::cannot_convert_to_integer(Self::type_name()))
    }

    fn stringify(&self) -> String {
        format!("[{}]", Self::type_name())
    }

    fn hash_code(&self) -> Result<u64, LangError> {
        Err(LangError::unhashable(Self::type_name()))
    }

    fn equals(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }

    /// Visit every value this one keeps alive.
    fn mark_reachable(&self) {}

    fn op_add(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Add))
    }

    fn op_sub(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Sub))
    }

    fn op_mul(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Mul))
    }

    fn op_div(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Div))
    }

    fn op_mod(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Mod))
    }

    fn op_pow(&self, _rhs: &Self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Pow))
    }

    fn op_minus(&self) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Minus))
    }

    fn op_escape(&self) -> Result<VarBorrower<'_>> {
        Err(unsupported::<Self>(Operator::Escape))
    }

    fn op_selfinc(&mut self) -> Result<()> {
        Err(unsupported::<Self>(Operator::SelfInc))
    }

    fn op_selfdec(&mut self) -> Result<()> {
        Err(unsupported::<Self>(Operator::SelfDec))
    }

    fn op_abocmp(&self, _rhs: &Self) -> Result<bool> {
        Err(unsupported::<Self>(Operator::AboCmp))
    }

    fn op_undcmp(&self, _rhs: &Self) -> Result<bool> {
        Err(unsupported::<Self>(Operator::UndCmp))
    }

    fn op_aepcmp(&self, _rhs: &Self) -> Result<bool> {
        Err(unsupported::<Self>(Operator::AepCmp))
    }

    fn op_ueqcmp(&self, _rhs: &Self) -> Result<bool> {
        Err(unsupported::<Self>(Operator::UeqCmp))
    }

    fn op_index(&self, _index: &Var) -> Result<VarBorrower<'_>> {
        Err(unsupported::<Self>(Operator::Index))
    }

    /// Index for assignment. Defaults to the read-only form.
    fn op_index_mut(&mut self, index: &Var) -> Result<VarBorrower<'_>> {
        self.op_index(index)
    }

    fn op_access(&self, _member: &str) -> Result<VarBorrower<'_>> {
        Err(unsupported::<Self>(Operator::Access))
    }

    fn op_arrow(&self, _member: &str) -> Result<VarBorrower<'_>> {
        Err(unsupported::<Self>(Operator::Arrow))
    }

    fn op_call(&self, _args: &mut [Var]) -> Result<Var> {
        Err(unsupported::<Self>(Operator::Call))
    }
}
