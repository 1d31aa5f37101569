//! Borrowed-or-owned view of a [`Var`] returned by operator dispatch.

use crate::errors::RuntimeError;
use crate::script_type::ScriptType;
use crate::var::Var;

/// Result of index, member access, escape and call dispatch.
///
/// Engine-native containers hand out references into their storage; freshly
/// computed results travel as `Owned`.
#[derive(Debug, Default)]
pub enum VarBorrower<'a> {
    #[default]
    Empty,
    Const(&'a Var),
    Mut(&'a mut Var),
    Owned(Var),
}

impl<'a> VarBorrower<'a> {
    pub fn usable(&self) -> bool {
        self.const_data().is_some_and(Var::usable)
    }

    pub fn is_null(&self) -> bool {
        !self.usable()
    }

    /// Read access, `None` when empty.
    pub fn const_data(&self) -> Option<&Var> {
        match self {
            VarBorrower::Empty => None,
            VarBorrower::Const(var) => Some(var),
            VarBorrower::Mut(var) => Some(var),
            VarBorrower::Owned(var) => Some(var),
        }
    }

    /// Write access, `None` when empty or read-only.
    pub fn data(&mut self) -> Option<&mut Var> {
        match self {
            VarBorrower::Mut(var) => Some(var),
            VarBorrower::Owned(var) => Some(var),
            VarBorrower::Empty | VarBorrower::Const(_) => None,
        }
    }

    pub fn is_writable(&self) -> bool {
        matches!(self, VarBorrower::Mut(_) | VarBorrower::Owned(_))
    }

    pub fn const_val<T: ScriptType>(&self) -> Result<&T, RuntimeError> {
        self.const_data()
            .ok_or_else(RuntimeError::null_access)?
            .const_val::<T>()
    }

    /// Detach from the source, copying only when borrowed.
    pub fn into_owned(self) -> Var {
        match self {
            VarBorrower::Empty => Var::null(),
            VarBorrower::Const(var) => var.clone(),
            VarBorrower::Mut(var) => var.clone(),
            VarBorrower::Owned(var) => var,
        }
    }
}

impl From<Var> for VarBorrower<'_> {
    fn from(var: Var) -> Self {
        VarBorrower::Owned(var)
    }
}

impl<'a> From<&'a Var> for VarBorrower<'a> {
    fn from(var: &'a Var) -> Self {
        VarBorrower::Const(var)
    }
}

impl<'a> From<&'a mut Var> for VarBorrower<'a> {
    fn from(var: &'a mut Var) -> Self {
        VarBorrower::Mut(var)
    }
}
