//! Two-tier variable storage.
//!
//! # Design
//!
//! The global manager always exists. While a fiber runs, its private
//! manager is installed on top: scopes and declarations go to the fiber,
//! lookups try the fiber first and fall back to the global manager.

use cov_ir::TokenId;
use cov_memory::{MemoryManager, ScopeValue, Visitor};
use cov_value::{HeapPointer, InternalError, RuntimeError, Var};
use rustc_hash::FxHashMap;

#[derive(Debug)]
pub struct Memory {
    pub(crate) global: MemoryManager,
    pub(crate) fiber: Option<MemoryManager>,
    /// Lookup caches keyed by the identifier token that performs them.
    visitors: FxHashMap<TokenId, Visitor>,
}

impl Memory {
    pub fn new(global: MemoryManager) -> Self {
        Memory {
            global,
            fiber: None,
            visitors: FxHashMap::default(),
        }
    }

    pub fn global(&self) -> &MemoryManager {
        &self.global
    }

    pub fn fiber(&self) -> Option<&MemoryManager> {
        self.fiber.as_ref()
    }

    /// Manager that receives scopes and declarations.
    pub fn current(&self) -> &MemoryManager {
        self.fiber.as_ref().unwrap_or(&self.global)
    }

    pub fn current_mut(&mut self) -> &mut MemoryManager {
        match &mut self.fiber {
            Some(fiber) => fiber,
            None => &mut self.global,
        }
    }

    pub fn enter_domain(&mut self, name: &str, declare: bool) -> Result<(), RuntimeError> {
        self.current_mut().enter_domain(name, declare)
    }

    pub fn leave_domain(&mut self, force_clear: bool) -> Result<(), InternalError> {
        self.current_mut().leave_domain(force_clear)
    }

    pub fn declare_var(
        &mut self,
        name: &str,
        value: Var,
        overwrite: bool,
    ) -> Result<Visitor, RuntimeError> {
        self.current_mut().declare_var(name, value, overwrite)
    }

    /// Resolve `visitor` in the fiber, then in the global manager.
    pub fn access(&mut self, visitor: &mut Visitor) -> Result<&mut Var, RuntimeError> {
        lookup(self.fiber.as_mut(), &mut self.global, visitor)
    }

    /// Resolve `name` through the cache owned by identifier token `site`.
    pub fn access_at(&mut self, site: TokenId, name: &str) -> Result<&mut Var, RuntimeError> {
        let visitor = self
            .visitors
            .entry(site)
            .or_insert_with(|| Visitor::new(name));
        if visitor.name() != name {
            *visitor = Visitor::new(name);
        }
        lookup(self.fiber.as_mut(), &mut self.global, visitor)
    }

    /// Member `member` of a captured namespace, on whichever manager holds it.
    pub fn scope_member(&mut self, scope: &ScopeValue, member: &str) -> Result<&mut Var, RuntimeError> {
        let owner = if self
            .fiber
            .as_ref()
            .is_some_and(|fiber| fiber.id() == scope.manager_id())
        {
            self.fiber.as_mut()
        } else {
            Some(&mut self.global)
        };
        owner
            .and_then(|manager| manager.scope_member(scope, member))
            .ok_or_else(|| RuntimeError::undefined_variable(member))
    }

    pub fn gcnew_value(&mut self, value: Var) -> HeapPointer {
        self.current_mut().gcnew_value(value)
    }

    /// Collect the current manager's heap.
    pub fn gc(&mut self, force: bool) -> usize {
        self.current_mut().gc(force)
    }

    /// Drop cached lookups, e.g. after the token pool was collected.
    pub fn clear_visitors(&mut self) {
        self.visitors.clear();
    }
}

fn lookup<'m>(
    fiber: Option<&'m mut MemoryManager>,
    global: &'m mut MemoryManager,
    visitor: &mut Visitor,
) -> Result<&'m mut Var, RuntimeError> {
    if let Some(fiber) = fiber {
        if let Some(var) = fiber.access_opt(visitor) {
            return Ok(var);
        }
    }
    global
        .access_opt(visitor)
        .ok_or_else(|| RuntimeError::undefined_variable(visitor.name()))
}
