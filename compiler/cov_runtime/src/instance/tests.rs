use std::panic::{catch_unwind, AssertUnwindSafe};

use cov_value::{Numeric, Var};
use pretty_assertions::assert_eq;

use super::*;

fn int(value: i64) -> Var {
    Var::make(Numeric::Integer(value))
}

#[test]
fn scope_guard_leaves_on_drop() {
    let mut instance = Instance::default();
    let depth = instance.memory().current().domain_depth();
    {
        let mut scoped = instance.scoped("<call>", false).unwrap();
        scoped.declare_var("x", int(1), false).unwrap();
        assert_eq!(scoped.memory().current().domain_depth(), depth + 1);
        assert_eq!(scoped.access("x").unwrap().clone(), int(1));
    }
    assert_eq!(instance.memory().current().domain_depth(), depth);
    assert!(instance.access("x").is_err());
}

#[test]
fn with_scope_returns_the_closure_result() {
    let mut instance = Instance::default();
    let value = instance
        .with_scope("<call>", false, |scoped| {
            scoped.declare_var("y", int(2), false)?;
            scoped.access("y").cloned()
        })
        .unwrap();
    assert_eq!(value.unwrap(), int(2));
    assert_eq!(instance.memory().current().domain_depth(), 1);
}

#[test]
fn scope_guard_leaves_during_unwinding() {
    let mut instance = Instance::default();
    let result = catch_unwind(AssertUnwindSafe(|| {
        instance
            .with_scope("<call>", false, |_| panic!("boom"))
            .unwrap();
    }));
    assert!(result.is_err());
    assert_eq!(instance.memory().current().domain_depth(), 1);
}

#[test]
fn fibers_shadow_globals_and_keep_their_state() {
    let mut instance = Instance::default();
    instance.declare_var("shared", int(1), false).unwrap();
    instance.declare_var("x", int(10), false).unwrap();

    let mut fiber = instance.new_fiber("worker");
    assert_eq!(fiber.state(), FiberState::Ready);

    let seen = instance
        .run_fiber(&mut fiber, |inner| {
            inner.declare_var("x", int(20), false).unwrap();
            (
                inner.access("x").unwrap().clone(),
                inner.access("shared").unwrap().clone(),
            )
        })
        .unwrap();
    assert_eq!(seen, (int(20), int(1)));
    assert_eq!(fiber.state(), FiberState::Suspended);
    assert_eq!(instance.access("x").unwrap().clone(), int(10));

    // Resuming sees the fiber's own declarations again.
    let resumed = instance
        .run_fiber(&mut fiber, |inner| inner.access("x").unwrap().clone())
        .unwrap();
    assert_eq!(resumed, int(20));

    fiber.finish();
    let err = instance.run_fiber(&mut fiber, |_| ()).unwrap_err();
    assert_eq!(err.to_string(), "Fatal Error: Cannot resume a finished fiber.");
}

#[test]
fn fibers_do_not_nest() {
    let mut instance = Instance::default();
    let mut outer = instance.new_fiber("outer");
    let mut inner = instance.new_fiber("inner");
    let nested = instance
        .run_fiber(&mut outer, |running| {
            running.run_fiber(&mut inner, |_| ()).is_err()
        })
        .unwrap();
    assert!(nested);
    assert_eq!(inner.state(), FiberState::Ready);
}

#[test]
fn fiber_memory_returns_after_a_panic() {
    let mut instance = Instance::default();
    let mut fiber = instance.new_fiber("worker");
    let result = catch_unwind(AssertUnwindSafe(|| {
        instance.run_fiber(&mut fiber, |_| panic!("boom")).unwrap();
    }));
    assert!(result.is_err());
    assert_eq!(fiber.state(), FiberState::Suspended);
    assert!(fiber.memory().is_some());
    assert!(instance.memory().fiber().is_none());
}

#[test]
fn child_stack_size_scales_with_the_global_stack() {
    let small = Instance::builder().stack_size(512).build();
    assert_eq!(small.config().child_stack_size(), crate::STACK_PRESERVE);
    let large = Instance::builder().stack_size(4096).build();
    assert_eq!(large.config().child_stack_size(), 409);
}

#[test]
fn builder_applies_settings() {
    let instance = Instance::builder()
        .file_path("main.csc")
        .package_name("demo")
        .import_path("lib")
        .gc_threshold(8)
        .constant("answer", int(42))
        .build();
    let config = instance.config();
    assert_eq!(
        (
            config.file_path.as_str(),
            config.package_name.as_str(),
            config.import_path.as_str(),
            config.gc_threshold
        ),
        ("main.csc", "demo", "lib", 8)
    );
    assert_eq!(instance.compiler().constant("answer"), Some(&int(42)));
}

#[test]
fn bare_instances_know_no_grammar() {
    let mut instance = Instance::builder().without_default_grammar().build();
    let err = instance.compile("1 + 1").unwrap_err();
    assert_eq!(
        err.exception().map(|e| e.what.as_str()),
        Some("Compile Error: Unknown grammar.")
    );
}

#[test]
fn heap_values_survive_while_referenced() {
    let mut instance = Instance::default();
    let pointer = instance.gcnew(Numeric::Integer(5));
    instance
        .declare_var("p", Var::make(pointer), false)
        .unwrap();
    instance.gcnew(Numeric::Integer(6));
    assert_eq!(instance.gc(true), 1);
    assert_eq!(instance.memory().global().heap_len(), 1);
}
