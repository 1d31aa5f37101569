//! Property tests: folded and evaluated arithmetic agree with host integers.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cov_compiler::CompilerSettings;
use cov_runtime::Instance;
use cov_value::{Numeric, Var};
use proptest::prelude::*;

fn evaluate(source: &str, disable_optimizer: bool) -> Var {
    let settings = CompilerSettings {
        disable_optimizer,
        ..CompilerSettings::default()
    };
    let mut instance = Instance::builder().compiler_settings(settings).build();
    instance.run(&format!("var r = {source}")).unwrap();
    instance.access("r").unwrap().clone()
}

proptest! {
    #[test]
    fn integer_arithmetic_matches_host(a in -1000i64..1000, b in -1000i64..1000, c in 1i64..100) {
        let source = format!("{a} + {b} * {c} - ({a} - {b})");
        let expected = Var::make(Numeric::Integer(a + b * c - (a - b)));
        prop_assert_eq!(evaluate(&source, false), expected.clone());
        prop_assert_eq!(evaluate(&source, true), expected);
    }

    #[test]
    fn comparisons_match_host(a in -50i64..50, b in -50i64..50) {
        let source = format!("{a} < {b} || {a} == {b}");
        prop_assert_eq!(evaluate(&source, true), Var::make(a <= b));
    }
}
