use cov_compiler::Compiler;
use cov_memory::MemoryManager;
use cov_value::{Callable, Numeric, Var};
use pretty_assertions::assert_eq;

use super::*;

fn int(value: i64) -> Var {
    Var::make(Numeric::Integer(value))
}

struct Fixture {
    compiler: Compiler,
    memory: Memory,
}

impl Fixture {
    fn new() -> Self {
        Fixture {
            compiler: Compiler::default(),
            memory: Memory::new(MemoryManager::default()),
        }
    }

    fn declare(&mut self, name: &str, value: Var) {
        self.memory.declare_var(name, value, false).unwrap();
    }

    fn eval(&mut self, source: &str) -> Result<Var> {
        let tree = self.compiler.build_expr(source).unwrap();
        Evaluator::new(self.compiler.pool(), &mut self.memory).evaluate(&tree)
    }

    fn value(&mut self, name: &str) -> Var {
        self.memory
            .access(&mut cov_memory::Visitor::new(name))
            .unwrap()
            .clone()
    }
}

#[test]
fn arithmetic_follows_precedence() {
    let mut fx = Fixture::new();
    assert_eq!(fx.eval("1 + 2 * 3").unwrap(), int(7));
    assert_eq!(fx.eval("(1 + 2) * 3").unwrap(), int(9));
    assert_eq!(fx.eval("2 ^ 3 - -1").unwrap(), int(9));
    assert_eq!(fx.eval("7 / 2").unwrap(), Var::make(Numeric::Float(3.5)));
    assert_eq!(fx.eval("1 < 2 && 3 >= 3").unwrap(), Var::make(true));
}

#[test]
fn assignment_returns_the_value() {
    let mut fx = Fixture::new();
    fx.declare("x", int(1));
    assert_eq!(fx.eval("x = 4").unwrap(), int(4));
    assert_eq!(fx.value("x"), int(4));
    assert_eq!(fx.eval("x += 3").unwrap(), int(7));
    assert_eq!(fx.eval("x *= 2").unwrap(), int(14));
    assert_eq!(fx.value("x"), int(14));
}

#[test]
fn increments_distinguish_prefix_and_postfix() {
    let mut fx = Fixture::new();
    fx.declare("i", int(5));
    assert_eq!(fx.eval("i++").unwrap(), int(5));
    assert_eq!(fx.value("i"), int(6));
    assert_eq!(fx.eval("++i").unwrap(), int(7));
    assert_eq!(fx.eval("--i").unwrap(), int(6));
    assert_eq!(fx.eval("i--").unwrap(), int(6));
    assert_eq!(fx.value("i"), int(5));
}

#[test]
fn logical_operators_short_circuit() {
    let mut fx = Fixture::new();
    assert_eq!(fx.eval("false && missing").unwrap(), Var::make(false));
    assert_eq!(fx.eval("true || missing").unwrap(), Var::make(true));
    let err = fx.eval("true && missing").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Runtime Error: Use of undefined variable \"missing\"."
    );
}

#[test]
fn choice_picks_a_branch() {
    let mut fx = Fixture::new();
    assert_eq!(fx.eval("1 < 2 ? 10 : 20").unwrap(), int(10));
    assert_eq!(fx.eval("1 > 2 ? 10 : 20").unwrap(), int(20));
    assert_eq!(
        fx.eval("true ? 1").unwrap_err().to_string(),
        "Runtime Error: Choice operator needs ':'."
    );
}

#[test]
fn arrays_and_indexed_assignment() {
    let mut fx = Fixture::new();
    let array = fx.eval("[1, 2, 3]").unwrap();
    fx.declare("a", array);
    assert_eq!(fx.eval("a[1]").unwrap(), int(2));
    assert_eq!(fx.eval("a[1] = 5").unwrap(), int(5));
    assert_eq!(fx.eval("a[0] + a[1]").unwrap(), int(6));
    assert_eq!(
        fx.eval("a[7]").unwrap_err().to_string(),
        "Runtime Error: Out of range."
    );
}

#[test]
fn parallel_lists_evaluate_to_their_last_value() {
    let mut fx = Fixture::new();
    fx.declare("x", int(0));
    assert_eq!(fx.eval("(x = 1, x + 1)").unwrap(), int(2));
    assert_eq!(fx.value("x"), int(1));
}

#[test]
fn pointers_read_and_write_through() {
    let mut fx = Fixture::new();
    fx.declare("p", Var::null());
    fx.eval("p = &40").unwrap();
    assert_eq!(fx.eval("*p + 2").unwrap(), int(42));
    fx.eval("*p = 7").unwrap();
    assert_eq!(fx.eval("*p").unwrap(), int(7));
    assert_eq!(fx.memory.global().heap_len(), 1);
}

#[test]
fn host_functions_receive_evaluated_arguments() {
    let mut fx = Fixture::new();
    let count = Callable::new(|args: &mut [Var]| {
        Ok(Var::make(Numeric::Integer(
            i64::try_from(args.len()).unwrap_or(i64::MAX),
        )))
    });
    fx.declare("count", Var::make(count));
    assert_eq!(fx.eval("count(1, 2 + 3, \"x\")").unwrap(), int(3));
    assert_eq!(fx.eval("count()").unwrap(), int(0));
}

#[test]
fn namespace_members_read_and_write() {
    let mut fx = Fixture::new();
    fx.memory.enter_domain("n", true).unwrap();
    fx.declare("y", int(3));
    fx.memory.leave_domain(false).unwrap();

    assert_eq!(fx.eval("n.y * 2").unwrap(), int(6));
    fx.eval("n.y = 9").unwrap();
    assert_eq!(fx.eval("n.y").unwrap(), int(9));
    assert_eq!(
        fx.eval("n.z").unwrap_err().to_string(),
        "Runtime Error: Use of undefined variable \"z\"."
    );
}

#[test]
fn assigning_to_a_temporary_fails() {
    let mut fx = Fixture::new();
    assert_eq!(
        fx.eval("1 = 2").unwrap_err().to_string(),
        "Runtime Error: Assignment to a temporary value."
    );
}

#[test]
fn cached_lookups_follow_the_fiber_tier() {
    let mut fx = Fixture::new();
    fx.declare("x", int(1));
    let tree = fx.compiler.build_expr("x").unwrap();
    let run = |memory: &mut Memory| {
        Evaluator::new(fx.compiler.pool(), memory)
            .evaluate(&tree)
            .unwrap()
    };
    assert_eq!(run(&mut fx.memory), int(1));

    let mut fiber = MemoryManager::new("<fiber>");
    fiber.declare_var("x", int(2), false).unwrap();
    fx.memory.fiber = Some(fiber);
    assert_eq!(run(&mut fx.memory), int(2));

    fx.memory.fiber = None;
    assert_eq!(run(&mut fx.memory), int(1));
}

#[test]
fn deep_expressions_do_not_overflow() {
    let mut fx = Fixture::new();
    let source = vec!["1"; 5_000].join(" + ");
    assert_eq!(fx.eval(&source).unwrap(), int(5_000));
}
