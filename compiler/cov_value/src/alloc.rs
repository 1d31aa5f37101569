//! Block pools for values too large for inline storage.
//!
//! # Design
//!
//! Each thread owns an `AllocatorRegistry` holding one free list per
//! concrete type, keyed by `TypeId`. Releasing a heap-stored value drops it
//! in place and keeps its block for the next value of the same type, up to
//! `BLOCK_ALLOCATOR_SIZE` blocks per type. Counters are kept so tests can
//! observe whether construction touched the heap at all.
//!
//! Values are single-threaded, so a per-thread registry gives every memory
//! manager deterministic teardown: `trim` frees all retained blocks.

#![allow(
    unsafe_code,
    reason = "recycles typed allocations between heap-stored values"
)]

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::mem::MaybeUninit;
use std::ptr;

use rustc_hash::FxHashMap;

/// Blocks retained per type after release.
pub const BLOCK_ALLOCATOR_SIZE: usize = 64;

/// Allocation counters for the current thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AllocatorStats {
    /// Blocks requested from the global allocator.
    pub allocations: usize,
    /// Blocks served from a free list.
    pub reuses: usize,
    /// Blocks handed back by dropped values.
    pub releases: usize,
}

impl AllocatorStats {
    /// Total heap-backed constructions.
    pub fn requests(&self) -> usize {
        self.allocations + self.reuses
    }
}

struct BlockPool<T> {
    free: Vec<Box<MaybeUninit<T>>>,
}

#[derive(Default)]
struct AllocatorRegistry {
    pools: FxHashMap<TypeId, Box<dyn Any>>,
    stats: AllocatorStats,
}

impl AllocatorRegistry {
    fn take_block<T: 'static>(&mut self) -> Option<Box<MaybeUninit<T>>> {
        let block = self
            .pools
            .get_mut(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_mut::<BlockPool<T>>())
            .and_then(|pool| pool.free.pop());
        if block.is_some() {
            self.stats.reuses += 1;
        } else {
            self.stats.allocations += 1;
        }
        block
    }

    /// Returns the block back when the pool is full.
    fn give_block<T: 'static>(
        &mut self,
        block: Box<MaybeUninit<T>>,
    ) -> Option<Box<MaybeUninit<T>>> {
        self.stats.releases += 1;
        let entry = self
            .pools
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(BlockPool::<T> { free: Vec::new() }));
        match entry.downcast_mut::<BlockPool<T>>() {
            Some(pool) if pool.free.len() < BLOCK_ALLOCATOR_SIZE => {
                pool.free.push(block);
                None
            }
            _ => Some(block),
        }
    }

    fn pooled<T: 'static>(&self) -> usize {
        self.pools
            .get(&TypeId::of::<T>())
            .and_then(|pool| pool.downcast_ref::<BlockPool<T>>())
            .map_or(0, |pool| pool.free.len())
    }
}

thread_local! {
    static REGISTRY: RefCell<AllocatorRegistry> = RefCell::new(AllocatorRegistry::default());
}

/// Move `value` into a pooled block.
pub(crate) fn allocate<T: 'static>(value: T) -> *mut T {
    let recycled = REGISTRY
        .try_with(|registry| registry.borrow_mut().take_block::<T>())
        .ok()
        .flatten();
    let mut block = recycled.unwrap_or_else(Box::new_uninit);
    block.write(value);
    // SAFETY: the block was initialized by the write above.
    Box::into_raw(unsafe { block.assume_init() })
}

/// Drop the value behind `raw` and recycle its block.
///
/// # Safety
///
/// `raw` must come from [`allocate`] with the same `T` and must not be used
/// afterwards.
pub(crate) unsafe fn release<T: 'static>(raw: *mut T) {
    // Dropping may release nested values, so no registry borrow is held here.
    // SAFETY: caller guarantees `raw` points to a live `T` from `allocate`.
    unsafe { ptr::drop_in_place(raw) };
    // SAFETY: same allocation, now logically uninitialized.
    let block = unsafe { Box::from_raw(raw.cast::<MaybeUninit<T>>()) };
    let _ = REGISTRY.try_with(move |registry| {
        let rejected = registry.borrow_mut().give_block(block);
        drop(rejected);
    });
}

/// Counters for the current thread.
pub fn stats() -> AllocatorStats {
    REGISTRY
        .try_with(|registry| registry.borrow().stats)
        .unwrap_or_default()
}

/// Zero the counters for the current thread.
pub fn reset_stats() {
    let _ = REGISTRY.try_with(|registry| registry.borrow_mut().stats = AllocatorStats::default());
}

/// Number of free blocks retained for `T` on this thread.
pub fn pooled_blocks<T: 'static>() -> usize {
    REGISTRY
        .try_with(|registry| registry.borrow().pooled::<T>())
        .unwrap_or(0)
}

/// Free every retained block on this thread.
pub fn trim() {
    let pools = REGISTRY
        .try_with(|registry| std::mem::take(&mut registry.borrow_mut().pools))
        .unwrap_or_default();
    tracing::debug!(types = pools.len(), "trimmed block allocator pools");
    drop(pools);
}
