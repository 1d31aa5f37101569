//! CovScript memory management.
//!
//! One [`MemoryManager`] per fiber owns:
//! - a stack of named variable slots, partitioned into lexical [`Domain`]s
//! - a heap of garbage-collected records, reclaimed by mark and sweep
//!
//! Variable lookups go through [`Visitor`]s, which cache the resolved slot
//! and re-resolve by name once the domain they point into has been left.
//!
//! Managers are single-owner and single-threaded; nothing here locks.

mod domain;
mod heap;
mod manager;

pub use domain::{Domain, LocalScope, ScopeValue, Visitor};
pub use manager::MemoryManager;

/// Slots reserved up front in a new manager's stack.
pub const DEFAULT_STACK_RESERVE: usize = 64;

/// Heap growth between two non-forced collections.
pub const DEFAULT_GC_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryConfig {
    pub stack_reserve: usize,
    pub gc_threshold: usize,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        MemoryConfig {
            stack_reserve: DEFAULT_STACK_RESERVE,
            gc_threshold: DEFAULT_GC_THRESHOLD,
        }
    }
}
