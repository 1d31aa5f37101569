//! The scoped variable stack.
//!
//! # Design
//!
//! Variables live in one growable stack of named slots. Domains partition
//! that stack: each records where its region starts and maps its own
//! names to slot indices. Lookups walk the domain stack innermost first and
//! cache the hit in a [`Visitor`].
//!
//! Liveness is tracked by generation. Every domain gets a fresh generation
//! when entered; the generation is active while the domain is on the domain
//! stack. A visitor's cache is only honored while its generation is active,
//! so stale caches re-resolve by name instead of reading a reused slot.
//!
//! Leaving a temporary domain unwinds its region immediately. Leaving a
//! persistent domain (declared into its parent) keeps its slots resident
//! until an ancestor unwinds past the parent slot that holds it.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use cov_value::{InternalError, RuntimeError, Var};
use rustc_hash::FxHashSet;
use tracing::trace;

use crate::domain::{CachedSlot, Domain, LocalScope, ScopeValue, Visitor};
use crate::heap::Heap;
use crate::MemoryConfig;

static NEXT_MANAGER_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) name: String,
    pub(crate) value: Var,
}

/// Per-fiber variable stack plus garbage-collected heap.
pub struct MemoryManager {
    id: u64,
    pub(crate) stack: Vec<Slot>,
    domains: Vec<LocalScope<Domain>>,
    /// Generations of the domains currently on `domains`.
    active: FxHashSet<u64>,
    /// Left persistent domains whose slots are still on the stack.
    resident: Vec<LocalScope<Domain>>,
    next_generation: u64,
    pub(crate) heap: Heap,
}

impl MemoryManager {
    /// Manager with a root domain called `name`.
    pub fn new(name: &str) -> Self {
        Self::with_config(name, MemoryConfig::default())
    }

    pub fn with_config(name: &str, config: MemoryConfig) -> Self {
        let root = LocalScope::new(Domain::new(name, 0, 0));
        let mut active = FxHashSet::default();
        active.insert(0);
        MemoryManager {
            id: NEXT_MANAGER_ID.fetch_add(1, Ordering::Relaxed),
            stack: Vec::with_capacity(config.stack_reserve),
            domains: vec![root],
            active,
            resident: Vec::new(),
            next_generation: 1,
            heap: Heap::new(config.gc_threshold),
        }
    }

    /// Unique id, used to tell managers apart in cached lookups.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn stack_len(&self) -> usize {
        self.stack.len()
    }

    pub fn domain_depth(&self) -> usize {
        self.domains.len()
    }

    pub fn current_domain(&self) -> Option<&LocalScope<Domain>> {
        self.domains.last()
    }

    /// Push a new domain. With `declare`, the new domain is also bound to
    /// `name` in the current domain as a [`ScopeValue`].
    pub fn enter_domain(&mut self, name: &str, declare: bool) -> Result<(), RuntimeError> {
        let generation = self.next_generation;
        self.next_generation += 1;
        let domain = LocalScope::new(Domain::new(name, generation, 0));

        let handle_slot = if declare {
            let value = Var::make(ScopeValue {
                manager: self.id,
                domain: domain.clone(),
            });
            Some(self.declare_slot(name, value)?)
        } else {
            None
        };

        {
            let mut d = domain.borrow_mut();
            d.stack_start = self.stack.len();
            d.handle_slot = handle_slot;
        }
        self.active.insert(generation);
        self.domains.push(domain);
        trace!(name, generation, depth = self.domains.len(), declare, "enter domain");
        Ok(())
    }

    /// Pop the current domain.
    ///
    /// Temporary domains, and any domain when `force_clear` is set, unwind
    /// their stack region in reverse declaration order. Forcing a persistent
    /// domain also drops its binding from the parent.
    pub fn leave_domain(&mut self, force_clear: bool) -> Result<(), InternalError> {
        if self.domains.len() <= 1 {
            return Err(InternalError::new("Leave the root domain."));
        }
        let Some(domain) = self.domains.pop() else {
            return Err(InternalError::new("Domain stack is empty."));
        };
        let (generation, stack_start, handle_slot, name) = {
            let d = domain.borrow();
            (d.generation, d.stack_start, d.handle_slot, d.name.clone())
        };
        self.active.remove(&generation);

        match handle_slot {
            Some(_) if !force_clear => {
                trace!(name, generation, "leave persistent domain");
                self.resident.push(domain);
            }
            Some(handle) => {
                // Caches into the parent must re-resolve.
                let fresh = self.next_generation;
                self.next_generation += 1;
                if let Some(parent) = self.domains.last() {
                    let mut p = parent.borrow_mut();
                    p.slot_map.remove(&name);
                    self.active.remove(&p.generation);
                    p.generation = fresh;
                    self.active.insert(fresh);
                }
                domain.borrow_mut().unwound = true;
                self.unwind_to(handle);
                trace!(name, generation, "force clear persistent domain");
            }
            None => {
                domain.borrow_mut().unwound = true;
                self.unwind_to(stack_start);
                trace!(name, generation, "leave temporary domain");
            }
        }
        Ok(())
    }

    /// Pop slots down to `len`, newest first.
    fn unwind_to(&mut self, len: usize) {
        while self.stack.len() > len {
            drop(self.stack.pop());
        }
        self.resident.retain(|domain| {
            let mut d = domain.borrow_mut();
            if d.handle_slot.is_some_and(|handle| handle >= len) {
                d.unwound = true;
                false
            } else {
                true
            }
        });
    }

    fn declare_slot(&mut self, name: &str, value: Var) -> Result<usize, RuntimeError> {
        let Some(domain) = self.domains.last() else {
            return Err(RuntimeError::custom("No active domain."));
        };
        let mut d = domain.borrow_mut();
        if d.slot_map.contains_key(name) {
            return Err(RuntimeError::already_defined(name));
        }
        let index = self.stack.len();
        self.stack.push(Slot {
            name: name.to_owned(),
            value,
        });
        d.slot_map.insert(name.to_owned(), index);
        Ok(index)
    }

    /// Bind `name` in the current domain. An existing binding is an error
    /// unless `overwrite` is set, in which case the slot is reassigned in
    /// place and visitors already caching it see the new value.
    pub fn declare_var(
        &mut self,
        name: &str,
        value: Var,
        overwrite: bool,
    ) -> Result<Visitor, RuntimeError> {
        let Some(domain) = self.domains.last() else {
            return Err(RuntimeError::custom("No active domain."));
        };
        let (generation, existing) = {
            let d = domain.borrow();
            (d.generation, d.slot_map.get(name).copied())
        };
        let index = match existing {
            Some(index) if overwrite => {
                self.stack[index].value = value;
                index
            }
            Some(_) => return Err(RuntimeError::already_defined(name)),
            None => self.declare_slot(name, value)?,
        };
        let mut visitor = Visitor::new(name);
        visitor.cache = Some(CachedSlot {
            manager: self.id,
            generation,
            index,
        });
        Ok(visitor)
    }

    fn cached_index(&self, visitor: &Visitor) -> Option<usize> {
        let cache = visitor.cache?;
        let valid = cache.manager == self.id
            && self.active.contains(&cache.generation)
            && cache.index < self.stack.len();
        valid.then_some(cache.index)
    }

    fn resolve(&self, name: &str) -> Option<CachedSlot> {
        self.domains.iter().rev().find_map(|domain| {
            let d = domain.borrow();
            d.slot_map.get(name).map(|&index| CachedSlot {
                manager: self.id,
                generation: d.generation,
                index,
            })
        })
    }

    fn locate(&self, visitor: &mut Visitor) -> Option<usize> {
        if let Some(index) = self.cached_index(visitor) {
            return Some(index);
        }
        let hit = self.resolve(visitor.name())?;
        trace!(name = visitor.name(), index = hit.index, "repair visitor");
        visitor.cache = Some(hit);
        Some(hit.index)
    }

    /// Slot index `name` resolves to from the current domain.
    pub fn slot_index(&self, name: &str) -> Option<usize> {
        self.resolve(name).map(|hit| hit.index)
    }

    pub fn access(&mut self, visitor: &mut Visitor) -> Result<&mut Var, RuntimeError> {
        match self.locate(visitor) {
            Some(index) => Ok(&mut self.stack[index].value),
            None => Err(RuntimeError::undefined_variable(visitor.name())),
        }
    }

    /// Like [`access`](Self::access) but reports a miss as `None`.
    pub fn access_opt(&mut self, visitor: &mut Visitor) -> Option<&mut Var> {
        let index = self.locate(visitor)?;
        Some(&mut self.stack[index].value)
    }

    fn member_index(&self, scope: &ScopeValue, member: &str) -> Option<usize> {
        if scope.manager != self.id {
            return None;
        }
        let d = scope.domain.borrow();
        if d.unwound {
            return None;
        }
        d.slot_map
            .get(member)
            .copied()
            .filter(|&index| index < self.stack.len())
    }

    /// Member of a persistent domain captured as `scope`, if that domain's
    /// slots live on this manager's stack.
    pub fn scope_member(&mut self, scope: &ScopeValue, member: &str) -> Option<&mut Var> {
        let index = self.member_index(scope, member)?;
        Some(&mut self.stack[index].value)
    }

    /// Member `member` of the domain bound to `scope`.
    pub fn access_member(
        &mut self,
        scope: &mut Visitor,
        member: &str,
    ) -> Result<&mut Var, RuntimeError> {
        let holder = self
            .locate(scope)
            .ok_or_else(|| RuntimeError::undefined_variable(scope.name()))?;
        let value = self.stack[holder].value.const_val::<ScopeValue>()?.clone();
        match self.member_index(&value, member) {
            Some(index) => Ok(&mut self.stack[index].value),
            None => Err(RuntimeError::undefined_variable(member)),
        }
    }

    /// Name and value of every slot, bottom first.
    pub fn slots(&self) -> impl Iterator<Item = (&str, &Var)> {
        self.stack.iter().map(|slot| (slot.name.as_str(), &slot.value))
    }
}

impl Default for MemoryManager {
    fn default() -> Self {
        Self::new("<Global>")
    }
}

impl fmt::Debug for MemoryManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryManager")
            .field("id", &self.id)
            .field("stack_len", &self.stack.len())
            .field("domain_depth", &self.domains.len())
            .field("heap_len", &self.heap.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
