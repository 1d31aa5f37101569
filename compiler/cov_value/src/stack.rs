//! Stack growth for deep recursion.
//!
//! Marking nested containers, building expression trees and evaluating
//! them all recurse on user-controlled depth. Wrapping the recursive step in
//! [`ensure_sufficient_stack`] moves execution onto a fresh segment when the
//! remaining stack drops below the red zone.

/// Remaining stack below which a new segment is allocated.
const RED_ZONE: usize = 128 * 1024;

/// Size of each new segment.
const SEGMENT_SIZE: usize = 2 * 1024 * 1024;

#[inline]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, SEGMENT_SIZE, f)
}
