//! Garbage-collectable heap records and the pointer type scripts hold.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::borrower::VarBorrower;
use crate::errors::{LangError, Result};
use crate::script_type::ScriptType;
use crate::stack::ensure_sufficient_stack;
use crate::var::Var;

/// A value plus the reachability counter the collector maintains.
pub struct HeapRecord {
    reachable: Cell<usize>,
    data: RefCell<Var>,
}

/// Shared handle to a [`HeapRecord`].
///
/// After its record is collected the handle still dereferences safely but
/// reads null.
#[derive(Clone)]
pub struct HeapPointer(Rc<HeapRecord>);

impl HeapPointer {
    pub fn new(value: Var) -> Self {
        HeapPointer(Rc::new(HeapRecord {
            reachable: Cell::new(0),
            data: RefCell::new(value),
        }))
    }

    pub fn get(&self) -> Ref<'_, Var> {
        self.0.data.borrow()
    }

    /// Replace the pointee, returning the previous value.
    pub fn replace(&self, value: Var) -> Var {
        self.0.data.replace(value)
    }

    pub fn reachable_count(&self) -> usize {
        self.0.reachable.get()
    }

    pub fn reset_mark(&self) {
        self.0.reachable.set(0);
    }

    pub fn ptr_eq(&self, other: &HeapPointer) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Count a reference; the pointee is traversed on the first visit only.
    pub fn mark(&self) {
        let count = self.0.reachable.get();
        self.0.reachable.set(count + 1);
        if count == 0 {
            if let Ok(data) = self.0.data.try_borrow() {
                ensure_sufficient_stack(|| data.mark_reachable());
            }
        }
    }
}

impl fmt::Debug for HeapPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapPointer")
            .field("reachable", &self.reachable_count())
            .finish_non_exhaustive()
    }
}

impl ScriptType for HeapPointer {
    fn type_name() -> &'static str {
        "pointer"
    }

    fn stringify(&self) -> String {
        format!("[pointer {:p}]", Rc::as_ptr(&self.0))
    }

    fn hash_code(&self) -> Result<u64, LangError> {
        Ok(Rc::as_ptr(&self.0) as usize as u64)
    }

    fn equals(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }

    fn mark_reachable(&self) {
        self.mark();
    }

    fn op_escape(&self) -> Result<VarBorrower<'_>> {
        Ok(VarBorrower::Owned(self.get().clone()))
    }
}
