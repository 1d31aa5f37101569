//! Lexical domains and the handles that refer to them.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use cov_value::ScriptType;
use rustc_hash::FxHashMap;

/// A single-threaded shared domain handle.
///
/// Wraps `Rc<RefCell<T>>` so a domain can sit on the manager's domain
/// stack and, when declared, inside a [`ScopeValue`] in its parent.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &LocalScope<T>) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

/// One lexical scope on the variable stack.
#[derive(Debug)]
pub struct Domain {
    pub(crate) name: String,
    pub(crate) generation: u64,
    pub(crate) stack_start: usize,
    pub(crate) slot_map: FxHashMap<String, usize>,
    /// Stack index of the parent slot holding this domain's [`ScopeValue`].
    pub(crate) handle_slot: Option<usize>,
    pub(crate) unwound: bool,
}

impl Domain {
    pub(crate) fn new(name: &str, generation: u64, stack_start: usize) -> Self {
        Domain {
            name: name.to_owned(),
            generation,
            stack_start,
            slot_map: FxHashMap::default(),
            handle_slot: None,
            unwound: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stack_start(&self) -> usize {
        self.stack_start
    }

    /// Declared into its parent, so leaving it keeps its slots.
    pub fn is_persistent(&self) -> bool {
        self.handle_slot.is_some()
    }

    /// The slots this domain owned are gone.
    pub fn is_unwound(&self) -> bool {
        self.unwound
    }

    pub fn slot(&self, name: &str) -> Option<usize> {
        self.slot_map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.slot_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slot_map.is_empty()
    }
}

/// A domain captured as a first-class script value.
#[derive(Clone, Debug)]
pub struct ScopeValue {
    pub(crate) manager: u64,
    pub(crate) domain: LocalScope<Domain>,
}

impl ScopeValue {
    pub fn domain(&self) -> &LocalScope<Domain> {
        &self.domain
    }

    /// Id of the manager whose stack holds the domain's slots.
    pub fn manager_id(&self) -> u64 {
        self.manager
    }
}

impl ScriptType for ScopeValue {
    fn type_name() -> &'static str {
        "namespace"
    }

    fn stringify(&self) -> String {
        format!("[namespace {}]", self.domain.borrow().name)
    }

    fn equals(&self, other: &Self) -> bool {
        self.domain.ptr_eq(&other.domain)
    }
}

/// Cached variable lookup.
///
/// Resolution by name walks the domain stack; a successful resolution
/// stores the slot index together with the owning manager and the domain's
/// generation, and later accesses reuse it while that domain is still on
/// the stack.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visitor {
    name: String,
    pub(crate) cache: Option<CachedSlot>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct CachedSlot {
    pub(crate) manager: u64,
    pub(crate) generation: u64,
    pub(crate) index: usize,
}

impl Visitor {
    pub fn new(name: impl Into<String>) -> Self {
        Visitor {
            name: name.into(),
            cache: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether a previous lookup left a cached slot.
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    pub fn invalidate(&mut self) {
        self.cache = None;
    }
}
