use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn default_is_integer_zero() {
    let n = Numeric::default();
    assert!(n.is_integer());
    assert_eq!(n.as_integer(), 0);
}

#[test]
fn same_kind_arithmetic_stays_in_kind() {
    let (a, b) = (Numeric::Integer(10), Numeric::Integer(4));
    assert_eq!(a.add(b), Numeric::Integer(14));
    assert!(a.sub(b).is_integer());
    assert_eq!(a.mul(b), Numeric::Integer(40));

    let (f, g) = (Numeric::Float(2.5), Numeric::Float(0.5));
    assert!(f.add(g).is_float());
    assert_eq!(f.div(g), Ok(Numeric::Float(5.0)));
}

#[test]
fn exact_integer_division_stays_integer() {
    let result = Numeric::Integer(8).div(Numeric::Integer(2));
    assert_eq!(result, Ok(Numeric::Integer(4)));
    assert!(result.clone().is_ok_and(Numeric::is_integer));
}

#[test]
fn inexact_integer_division_promotes() {
    let result = Numeric::Integer(7).div(Numeric::Integer(2));
    assert!(result.clone().is_ok_and(Numeric::is_float));
    assert_eq!(result.map(Numeric::as_float), Ok(3.5));
    // Truncating view of the float result.
    assert_eq!(
        Numeric::Integer(10).div(Numeric::Integer(4)).map(Numeric::as_integer),
        Ok(2)
    );
}

#[test]
fn integer_division_by_zero_fails() {
    assert_eq!(
        Numeric::Integer(1).div(Numeric::Integer(0)),
        Err(RuntimeError::divide_by_zero())
    );
    assert_eq!(
        Numeric::Integer(1).rem(Numeric::Integer(0)),
        Err(RuntimeError::divide_by_zero())
    );
    let inf = Numeric::Float(1.0).div(Numeric::Integer(0));
    assert!(inf.is_ok_and(|n| n.as_float().is_infinite()));
}

#[test]
fn division_edge_does_not_overflow() {
    let result = Numeric::Integer(i64::MIN).div(Numeric::Integer(-1));
    assert!(result.is_ok_and(Numeric::is_float));
}

#[test]
fn power_and_modulo() {
    assert_eq!(Numeric::Integer(2).pow(Numeric::Integer(10)), Numeric::Integer(1024));
    assert!(Numeric::Integer(2).pow(Numeric::Integer(-1)).is_float());
    assert_eq!(Numeric::Integer(7).rem(Numeric::Integer(3)), Ok(Numeric::Integer(1)));
    assert_eq!(Numeric::Float(7.5).rem(Numeric::Integer(2)), Ok(Numeric::Float(1.5)));
}

#[test]
fn comparisons_cross_kinds() {
    assert!(Numeric::Integer(10) < Numeric::Integer(20));
    assert!(Numeric::Float(2.5) <= Numeric::Integer(3));
    assert_eq!(Numeric::Integer(2), Numeric::Float(2.0));
    assert_ne!(Numeric::Integer(2), Numeric::Float(2.5));
}

#[test]
fn increment_and_negation() {
    let mut i = Numeric::Integer(5);
    i.increment();
    assert_eq!(i, Numeric::Integer(6));
    i.decrement();
    i.decrement();
    assert_eq!(i, Numeric::Integer(4));

    let mut f = Numeric::Float(1.5);
    f.increment();
    assert!(f.is_float());
    assert_eq!(f.as_float(), 2.5);

    assert_eq!(Numeric::Integer(10).negate(), Numeric::Integer(-10));
    assert_eq!(Numeric::Float(2.5).negate(), Numeric::Float(-2.5));
}

#[test]
fn equal_values_hash_alike() {
    assert_eq!(
        Numeric::Integer(3).hash_code(),
        Numeric::Float(3.0).hash_code()
    );
    assert_eq!(
        Numeric::Float(-0.0).hash_code(),
        Numeric::Integer(0).hash_code()
    );
}

#[test]
fn large_integers_compare_exactly_against_floats() {
    let int = Numeric::Integer(9_007_199_254_740_993);
    let float = Numeric::Float(9_007_199_254_740_992.0);
    assert_ne!(int, float);
    assert!(float < int);
    assert_eq!(Numeric::Integer(9_007_199_254_740_992), float);

    let top = Numeric::Float(9_223_372_036_854_775_808.0);
    assert_ne!(Numeric::Integer(i64::MAX), top);
    assert!(Numeric::Integer(i64::MAX) < top);
    assert_eq!(Numeric::Integer(i64::MIN), Numeric::Float(-9_223_372_036_854_775_808.0));
}

#[test]
fn stringify_forms() {
    assert_eq!(Numeric::Integer(-4).stringify(), "-4");
    assert_eq!(Numeric::Float(3.5).stringify(), "3.5");
}

proptest! {
    #[test]
    fn mixed_operands_promote_to_float(i in any::<i64>(), f in -1.0e12f64..1.0e12) {
        let int = Numeric::Integer(i);
        let float = Numeric::Float(f);
        prop_assert!(int.add(float).is_float());
        prop_assert!(float.add(int).is_float());
        prop_assert!(int.sub(float).is_float());
        prop_assert!(int.mul(float).is_float());
    }

    #[test]
    fn equal_numbers_hash_alike(i in any::<i64>(), delta in -2i64..=2) {
        #[allow(clippy::cast_precision_loss, reason = "rounding is the point")]
        let float = Numeric::Float(i.saturating_add(delta) as f64);
        let int = Numeric::Integer(i);
        if int == float {
            prop_assert_eq!(int.hash_code(), float.hash_code());
        }
    }

    #[test]
    fn integer_division_is_integer_iff_exact(a in -1_000_000i64..1_000_000, b in 1i64..1000) {
        let result = Numeric::Integer(a).div(Numeric::Integer(b));
        prop_assert_eq!(result.is_ok_and(Numeric::is_integer), a % b == 0);
    }
}
