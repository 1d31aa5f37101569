use super::*;
use crate::MemoryConfig;
use cov_value::{Array, Numeric, Pair};
use pretty_assertions::assert_eq;

fn num(value: i64) -> Var {
    Var::make(Numeric::from(value))
}

#[test]
fn forced_gc_reclaims_unreachable_records() {
    let mut memory = MemoryManager::default();
    let kept = memory.gcnew(Numeric::from(1));
    memory.gcnew(Numeric::from(2));
    memory.declare_var("p", Var::make(kept.clone()), false).unwrap();

    assert_eq!(memory.heap_len(), 2);
    assert_eq!(memory.gc(true), 1);
    assert_eq!(memory.heap_len(), 1);
    assert_eq!(*kept.get(), num(1));
}

#[test]
fn reachability_follows_containers_and_pointers() {
    let mut memory = MemoryManager::default();
    let leaf = memory.gcnew(Numeric::from(3));
    let middle = memory.gcnew::<Pair>((Var::make(leaf.clone()), Var::null()));
    let array = Array::from([Var::make(middle.clone())]);
    memory.declare_var("root", Var::make(array), false).unwrap();

    assert_eq!(memory.gc(true), 0);
    assert_eq!(leaf.reachable_count(), 1);
    assert_eq!(middle.reachable_count(), 1);
}

#[test]
fn cycles_are_collected() {
    let mut memory = MemoryManager::default();
    let a = memory.gcnew_value(Var::null());
    let b = memory.gcnew_value(Var::make(a.clone()));
    a.replace(Var::make(b.clone()));

    assert_eq!(memory.gc(true), 2);
    assert!(a.get().is_null());
    assert!(b.get().is_null());
}

#[test]
fn values_in_left_persistent_domains_stay_reachable() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("ns", true).unwrap();
    let target = memory.gcnew(Numeric::from(9));
    memory.declare_var("held", Var::make(target.clone()), false).unwrap();
    memory.leave_domain(false).unwrap();

    assert_eq!(memory.gc(true), 0);
    assert_eq!(*target.get(), num(9));
}

#[test]
fn unforced_gc_waits_for_threshold() {
    let config = MemoryConfig {
        stack_reserve: 4,
        gc_threshold: 3,
    };
    let mut memory = MemoryManager::with_config("<Global>", config);
    memory.gcnew(Numeric::from(1));
    memory.gcnew(Numeric::from(2));
    assert_eq!(memory.gc(false), 0);
    assert_eq!(memory.heap_len(), 2);

    memory.gcnew(Numeric::from(3));
    assert_eq!(memory.gc(false), 3);
    // Baseline reset: an unchanged heap is skipped.
    assert_eq!(memory.gc(false), 0);
}
