//! Garbage-collected heap.
//!
//! Records are [`HeapPointer`]s kept in allocation order, newest first.
//! Collection is mark and sweep with the whole variable stack as roots:
//! marks are reset, every slot is marked (containers and pointers recurse),
//! and records left at zero are swept.
//!
//! Sweeping takes the value out of a record before dropping the heap's
//! reference, so cycles between unreachable records are broken even if a
//! host still holds a pointer to one of them.

use std::collections::VecDeque;

use cov_value::{HeapPointer, ScriptType, Var};
use tracing::debug;

use crate::MemoryManager;

pub(crate) struct Heap {
    records: VecDeque<HeapPointer>,
    last_size: usize,
    threshold: usize,
}

impl Heap {
    pub(crate) fn new(threshold: usize) -> Self {
        Heap {
            records: VecDeque::new(),
            last_size: 0,
            threshold,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    fn should_skip(&self, force: bool) -> bool {
        let size = self.records.len();
        !force && (size == self.last_size || size < self.last_size + self.threshold)
    }
}

impl MemoryManager {
    /// Allocate a heap record holding a new `T`.
    pub fn gcnew<T: ScriptType>(&mut self, value: T) -> HeapPointer {
        self.gcnew_value(Var::make(value))
    }

    pub fn gcnew_value(&mut self, value: Var) -> HeapPointer {
        let pointer = HeapPointer::new(value);
        self.heap.records.push_front(pointer.clone());
        pointer
    }

    pub fn heap_len(&self) -> usize {
        self.heap.len()
    }

    /// Run a collection; returns the number of records reclaimed.
    ///
    /// Without `force`, nothing happens until the heap has grown by the
    /// configured threshold since the last run.
    pub fn gc(&mut self, force: bool) -> usize {
        if self.heap.should_skip(force) {
            return 0;
        }
        for record in &self.heap.records {
            record.reset_mark();
        }
        for slot in &self.stack {
            slot.value.mark_reachable();
        }

        let before = self.heap.records.len();
        let mut garbage = Vec::new();
        self.heap.records.retain(|record| {
            if record.reachable_count() > 0 {
                return true;
            }
            garbage.push(record.replace(Var::null()));
            false
        });
        // Payloads may hold the last references to other records.
        drop(garbage);

        self.heap.last_size = self.heap.records.len();
        let freed = before - self.heap.last_size;
        debug!(freed, live = self.heap.last_size, forced = force, "gc");
        freed
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
