use super::*;
use pretty_assertions::assert_eq;

#[test]
fn runtime_errors_carry_category_prefix() {
    let err = RuntimeError::undefined_variable("x");
    assert_eq!(
        err.to_string(),
        "Runtime Error: Use of undefined variable \"x\"."
    );
    assert_eq!(err.what(), "Use of undefined variable \"x\".");
}

#[test]
fn type_mismatch_names_both_types() {
    let err = RuntimeError::type_mismatch("string", "number");
    assert_eq!(
        err.what(),
        "Instance variable with wrong type. Provided string, expected number"
    );
}

#[test]
fn lang_error_has_no_prefix() {
    let err = LangError::unsupported_operator("Foo", Operator::Add);
    assert_eq!(err.to_string(), "Type Foo does not support + operator.");
    let err: Error = err.into();
    assert!(err.is_lang_error());
    assert_eq!(err.to_string(), "Type Foo does not support + operator.");
}

#[test]
fn capability_messages() {
    assert_eq!(
        LangError::cannot_convert_to_integer("Foo").message(),
        "Target type Foo cannot convert to integer."
    );
    assert_eq!(
        LangError::unhashable("Foo").message(),
        "Target type Foo unhashable."
    );
}

#[test]
fn internal_error_prefix() {
    let err: Error = InternalError::new("domain stack underflow").into();
    assert_eq!(err.to_string(), "Internal Error: domain stack underflow");
    assert_eq!(err.what(), "domain stack underflow");
}
