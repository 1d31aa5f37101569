//! Built-in script types.
//!
//! Containers recurse into their elements when marked, so anything they
//! hold stays alive across a collection.

use std::collections::{LinkedList, VecDeque};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use rustc_hash::{FxHashMap, FxHashSet, FxHasher};

use crate::borrower::VarBorrower;
use crate::errors::{LangError, Result, RuntimeError};
use crate::numeric::Numeric;
use crate::script_type::ScriptType;
use crate::stack::ensure_sufficient_stack;
use crate::var::Var;

/// Double-ended sequence, the script `array`.
pub type Array = VecDeque<Var>;
/// Linked sequence, the script `list`.
pub type List = LinkedList<Var>;
/// Contiguous sequence used for call arguments.
pub type FwdArray = Vec<Var>;
pub type HashMap = FxHashMap<Var, Var>;
pub type HashSet = FxHashSet<Var>;
pub type Pair = (Var, Var);

fn fx_hash<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = FxHasher::default();
    value.hash(&mut hasher);
    hasher.finish()
}

fn mark_all<'a>(values: impl IntoIterator<Item = &'a Var>) {
    for value in values {
        ensure_sufficient_stack(|| value.mark_reachable());
    }
}

fn join(values: impl IntoIterator<Item = impl fmt::Display>) -> String {
    values
        .into_iter()
        .map(|value| value.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Position from a numeric index value.
fn position(index: &Var, len: usize) -> Result<usize> {
    let raw = index.const_val::<Numeric>()?.as_integer();
    usize::try_from(raw)
        .ok()
        .filter(|&pos| pos < len)
        .ok_or_else(|| RuntimeError::custom("Out of range.").into())
}

impl ScriptType for bool {
    fn type_name() -> &'static str {
        "boolean"
    }

    fn to_integer(&self) -> Result<i64, LangError> {
        Ok(i64::from(*self))
    }

    fn stringify(&self) -> String {
        self.to_string()
    }

    fn hash_code(&self) -> Result<u64, LangError> {
        Ok(u64::from(*self))
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }
}

impl ScriptType for char {
    fn type_name() -> &'static str {
        "char"
    }

    fn to_integer(&self) -> Result<i64, LangError> {
        Ok(i64::from(u32::from(*self)))
    }

    fn stringify(&self) -> String {
        self.to_string()
    }

    fn hash_code(&self) -> Result<u64, LangError> {
        Ok(u64::from(u32::from(*self)))
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn op_abocmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self > rhs)
    }

    fn op_undcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self < rhs)
    }

    fn op_aepcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self >= rhs)
    }

    fn op_ueqcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self <= rhs)
    }
}

impl ScriptType for String {
    fn type_name() -> &'static str {
        "string"
    }

    fn stringify(&self) -> String {
        self.clone()
    }

    fn hash_code(&self) -> Result<u64, LangError> {
        Ok(fx_hash(self.as_str()))
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn op_add(&self, rhs: &Self) -> Result<Var> {
        Ok(Var::make(format!("{self}{rhs}")))
    }

    fn op_abocmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self > rhs)
    }

    fn op_undcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self < rhs)
    }

    fn op_aepcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self >= rhs)
    }

    fn op_ueqcmp(&self, rhs: &Self) -> Result<bool> {
        Ok(self <= rhs)
    }

    /// Indexes by character.
    fn op_index(&self, index: &Var) -> Result<VarBorrower<'_>> {
        let pos = position(index, self.chars().count())?;
        let ch = self.chars().nth(pos).unwrap_or_default();
        Ok(VarBorrower::Owned(Var::make(ch)))
    }
}

impl ScriptType for Array {
    fn type_name() -> &'static str {
        "array"
    }

    fn stringify(&self) -> String {
        format!("{{{}}}", join(self))
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn mark_reachable(&self) {
        mark_all(self);
    }

    fn op_index(&self, index: &Var) -> Result<VarBorrower<'_>> {
        let pos = position(index, self.len())?;
        Ok(self.get(pos).map_or(VarBorrower::Empty, VarBorrower::Const))
    }

    fn op_index_mut(&mut self, index: &Var) -> Result<VarBorrower<'_>> {
        let pos = position(index, self.len())?;
        Ok(self.get_mut(pos).map_or(VarBorrower::Empty, VarBorrower::Mut))
    }
}

impl ScriptType for FwdArray {
    fn type_name() -> &'static str {
        "fwd_array"
    }

    fn stringify(&self) -> String {
        format!("{{{}}}", join(self))
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn mark_reachable(&self) {
        mark_all(self);
    }

    fn op_index(&self, index: &Var) -> Result<VarBorrower<'_>> {
        let pos = position(index, self.len())?;
        Ok(self.get(pos).map_or(VarBorrower::Empty, VarBorrower::Const))
    }

    fn op_index_mut(&mut self, index: &Var) -> Result<VarBorrower<'_>> {
        let pos = position(index, self.len())?;
        Ok(self.get_mut(pos).map_or(VarBorrower::Empty, VarBorrower::Mut))
    }
}

impl ScriptType for List {
    fn type_name() -> &'static str {
        "list"
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn mark_reachable(&self) {
        mark_all(self);
    }
}

impl ScriptType for HashMap {
    fn type_name() -> &'static str {
        "hash_map"
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn mark_reachable(&self) {
        for (key, value) in self {
            ensure_sufficient_stack(|| {
                key.mark_reachable();
                value.mark_reachable();
            });
        }
    }

    fn op_index(&self, index: &Var) -> Result<VarBorrower<'_>> {
        index.hash()?;
        self.get(index)
            .map(VarBorrower::Const)
            .ok_or_else(|| RuntimeError::custom("Key does not exist.").into())
    }

    /// Missing keys are inserted as null.
    fn op_index_mut(&mut self, index: &Var) -> Result<VarBorrower<'_>> {
        index.hash()?;
        Ok(VarBorrower::Mut(self.entry(index.clone()).or_default()))
    }
}

impl ScriptType for HashSet {
    fn type_name() -> &'static str {
        "hash_set"
    }

    fn equals(&self, other: &Self) -> bool {
        self == other
    }

    fn mark_reachable(&self) {
        mark_all(self);
    }
}

impl ScriptType for Pair {
    fn type_name() -> &'static str {
        "pair"
    }

    fn stringify(&self) -> String {
        format!("({}: {})", self.0, self.1)
    }

    fn equals(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 == other.1
    }

    fn mark_reachable(&self) {
        mark_all([&self.0, &self.1]);
    }

    fn op_access(&self, member: &str) -> Result<VarBorrower<'_>> {
        match member {
            "first" => Ok(VarBorrower::Const(&self.0)),
            "second" => Ok(VarBorrower::Const(&self.1)),
            _ => Err(RuntimeError::custom(format!("Pair has no member \"{member}\".")).into()),
        }
    }
}

/// How the compiler may treat calls to a [`Callable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallableKind {
    Normal,
    /// Pure function: calls with constant arguments fold at compile time.
    RequestFold,
}

type HostFn = dyn Fn(&mut [Var]) -> Result<Var>;

/// Host function exposed to scripts.
#[derive(Clone)]
pub struct Callable {
    func: Rc<HostFn>,
    kind: CallableKind,
}

impl Callable {
    pub fn new(func: impl Fn(&mut [Var]) -> Result<Var> + 'static) -> Self {
        Callable {
            func: Rc::new(func),
            kind: CallableKind::Normal,
        }
    }

    pub fn pure(func: impl Fn(&mut [Var]) -> Result<Var> + 'static) -> Self {
        Callable {
            func: Rc::new(func),
            kind: CallableKind::RequestFold,
        }
    }

    pub fn kind(&self) -> CallableKind {
        self.kind
    }

    pub fn call(&self, args: &mut [Var]) -> Result<Var> {
        (self.func)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable").field("kind", &self.kind).finish()
    }
}

impl ScriptType for Callable {
    fn type_name() -> &'static str {
        "callable"
    }

    fn equals(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }

    fn op_call(&self, args: &mut [Var]) -> Result<Var> {
        self.call(args)
    }
}

#[cfg(test)]
mod tests;
