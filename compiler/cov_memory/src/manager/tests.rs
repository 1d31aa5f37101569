use super::*;
use cov_value::Numeric;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn num(value: i64) -> Var {
    Var::make(Numeric::from(value))
}

fn read(memory: &mut MemoryManager, name: &str) -> Option<Var> {
    memory.access_opt(&mut Visitor::new(name)).cloned()
}

#[test]
fn starts_with_root_domain() {
    let memory = MemoryManager::default();
    assert_eq!(memory.domain_depth(), 1);
    assert_eq!(memory.stack_len(), 0);
    assert_eq!(
        memory.current_domain().map(|d| d.borrow().name().to_owned()),
        Some("<Global>".to_owned())
    );
}

#[test]
fn root_domain_cannot_be_left() {
    let mut memory = MemoryManager::default();
    let err = memory.leave_domain(false).unwrap_err();
    assert_eq!(err.to_string(), "Internal Error: Leave the root domain.");
    assert_eq!(memory.domain_depth(), 1);
}

#[test]
fn nested_lookup_repairs_visitor_and_reuses_slots() {
    let mut memory = MemoryManager::new("A");
    memory.declare_var("x", num(5), false).unwrap();

    memory.enter_domain("B", false).unwrap();
    let y = memory.declare_var("y", num(10), false).unwrap();
    assert!(y.is_cached());
    let y_slot = memory.slot_index("y");

    let mut x = Visitor::new("x");
    assert!(!x.is_cached());
    assert_eq!(memory.access(&mut x).unwrap().clone(), num(5));
    assert!(x.is_cached());

    memory.leave_domain(false).unwrap();
    assert_eq!(memory.stack_len(), 1);
    assert!(read(&mut memory, "y").is_none());
    assert_eq!(memory.access(&mut x).unwrap().clone(), num(5));

    memory.declare_var("z", num(1), false).unwrap();
    assert_eq!(memory.slot_index("z"), y_slot);
}

#[test]
fn stale_visitor_does_not_read_reused_slot() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("inner", false).unwrap();
    let mut stale = memory.declare_var("v", num(1), false).unwrap();
    memory.leave_domain(false).unwrap();

    memory.declare_var("other", num(2), false).unwrap();
    assert!(memory.access_opt(&mut stale).is_none());
    assert_eq!(
        memory.access(&mut stale).unwrap_err().what(),
        "Use of undefined variable \"v\"."
    );
}

#[test]
fn redeclaration_requires_overwrite() {
    let mut memory = MemoryManager::default();
    let mut first = memory.declare_var("x", num(1), false).unwrap();
    let err = memory.declare_var("x", num(2), false).unwrap_err();
    assert_eq!(
        err.what(),
        "Variable \"x\" already defined in current scope."
    );

    memory.declare_var("x", num(3), true).unwrap();
    assert_eq!(memory.stack_len(), 1);
    // Same slot, so the old visitor sees the new value.
    assert_eq!(memory.access(&mut first).unwrap().clone(), num(3));
}

#[test]
fn inner_declaration_shadows_outer() {
    let mut memory = MemoryManager::default();
    memory.declare_var("x", num(1), false).unwrap();
    memory.enter_domain("inner", false).unwrap();
    memory.declare_var("x", num(2), false).unwrap();
    assert_eq!(read(&mut memory, "x"), Some(num(2)));
    memory.leave_domain(false).unwrap();
    assert_eq!(read(&mut memory, "x"), Some(num(1)));
}

#[test]
fn persistent_domain_stays_resident() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("ns", true).unwrap();
    memory.declare_var("a", num(7), false).unwrap();
    memory.leave_domain(false).unwrap();

    // Handle slot plus member slot.
    assert_eq!(memory.stack_len(), 2);
    assert!(read(&mut memory, "a").is_none());

    let mut ns = Visitor::new("ns");
    let member = memory.access_member(&mut ns, "a").unwrap().clone();
    assert_eq!(member, num(7));
    assert!(memory.access_member(&mut ns, "b").is_err());

    let scope = memory.access(&mut ns).unwrap().const_val::<ScopeValue>().unwrap().clone();
    assert_eq!(scope.manager_id(), memory.id());
    assert!(memory.scope_member(&scope, "a").is_some());
}

#[test]
fn unwinding_parent_unwinds_persistent_child() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("outer", false).unwrap();
    memory.enter_domain("ns", true).unwrap();
    memory.declare_var("a", num(1), false).unwrap();
    memory.leave_domain(false).unwrap();

    let mut ns = Visitor::new("ns");
    let scope = memory.access(&mut ns).unwrap().const_val::<ScopeValue>().unwrap().clone();
    memory.leave_domain(false).unwrap();

    assert_eq!(memory.stack_len(), 0);
    assert!(scope.domain().borrow().is_unwound());
    assert!(memory.scope_member(&scope, "a").is_none());
}

#[test]
fn force_clear_removes_persistent_binding() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("ns", true).unwrap();
    memory.declare_var("a", num(1), false).unwrap();
    memory.leave_domain(true).unwrap();

    assert_eq!(memory.stack_len(), 0);
    assert!(memory.slot_index("ns").is_none());
    // The name is free again.
    memory.enter_domain("ns", true).unwrap();
}

#[test]
fn force_clear_keeps_other_parent_bindings_reachable() {
    let mut memory = MemoryManager::default();
    memory.declare_var("kept", num(7), false).unwrap();
    let mut kept = Visitor::new("kept");
    memory.access(&mut kept).unwrap();

    memory.enter_domain("tmp", true).unwrap();
    memory.leave_domain(true).unwrap();
    memory.declare_var("w", Var::make(true), false).unwrap();

    assert_eq!(memory.access(&mut kept).unwrap().clone(), num(7));
    assert!(memory.access(&mut Visitor::new("tmp")).is_err());
}

#[test]
fn forced_leave_does_not_leak_the_handle_slot() {
    let mut memory = MemoryManager::default();
    memory.enter_domain("ns", true).unwrap();
    let mut ns = Visitor::new("ns");
    memory.access(&mut ns).unwrap();
    memory.leave_domain(true).unwrap();

    memory.declare_var("w", Var::make(true), false).unwrap();
    let err = memory.access(&mut ns).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Runtime Error: Use of undefined variable \"ns\"."
    );
}

#[test]
fn declared_domain_name_must_be_free() {
    let mut memory = MemoryManager::default();
    memory.declare_var("ns", num(1), false).unwrap();
    assert!(memory.enter_domain("ns", true).is_err());
    assert_eq!(memory.domain_depth(), 1);
}

#[test]
fn visitors_are_per_manager() {
    let mut a = MemoryManager::default();
    let mut b = MemoryManager::default();
    a.declare_var("x", num(1), false).unwrap();
    b.declare_var("x", num(2), false).unwrap();

    let mut x = Visitor::new("x");
    assert_eq!(a.access(&mut x).unwrap().clone(), num(1));
    assert_eq!(b.access(&mut x).unwrap().clone(), num(2));
    assert_ne!(a.id(), b.id());
}

#[test]
fn slots_are_listed_bottom_first() {
    let mut memory = MemoryManager::default();
    memory.declare_var("a", num(1), false).unwrap();
    memory.declare_var("b", num(2), false).unwrap();
    let names: Vec<&str> = memory.slots().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["a", "b"]);
}

proptest! {
    #[test]
    fn forced_leave_restores_stack_size(
        frames in prop::collection::vec((0usize..6, any::<bool>()), 1..12)
    ) {
        let mut memory = MemoryManager::default();
        memory.declare_var("base", num(0), false).unwrap();
        let mut sizes = Vec::new();
        for (depth, (count, declare)) in frames.iter().enumerate() {
            sizes.push(memory.stack_len());
            memory.enter_domain(&format!("d{depth}"), *declare).unwrap();
            for n in 0..*count {
                memory.declare_var(&format!("v{n}"), num(0), false).unwrap();
            }
        }
        while let Some(size) = sizes.pop() {
            memory.leave_domain(true).unwrap();
            prop_assert_eq!(memory.stack_len(), size);
        }
        prop_assert_eq!(memory.domain_depth(), 1);
    }
}
