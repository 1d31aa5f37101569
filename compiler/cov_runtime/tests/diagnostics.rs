//! Error reporting: categories, lines and the offending source text.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use cov_ir::CsymInfo;
use cov_runtime::{Instance, ScriptError, ScriptException};
use pretty_assertions::assert_eq;

fn instance() -> Instance {
    Instance::builder().file_path("main.csc").build()
}

fn exception(file: &str, line: usize, code: &str, what: &str) -> ScriptException {
    ScriptException {
        file: file.to_owned(),
        line,
        code: code.to_owned(),
        what: what.to_owned(),
    }
}

#[test]
fn runtime_errors_point_at_the_statement() {
    let mut instance = instance();
    let err = instance.run("var x = 1\nx + y\n").unwrap_err();
    assert_eq!(
        err,
        ScriptError::Runtime(exception(
            "main.csc",
            2,
            "x + y",
            "Runtime Error: Use of undefined variable \"y\"."
        ))
    );
    assert_eq!(
        err.to_string(),
        "File \"main.csc\", line 2: Runtime Error: Use of undefined variable \"y\".\n>\tx + y\n"
    );
}

#[test]
fn lexer_errors_are_compile_errors() {
    let mut instance = instance();
    let err = instance.compile("var x = 1\nvar y = $").unwrap_err();
    assert_eq!(
        err,
        ScriptError::Compile(exception(
            "main.csc",
            2,
            "var y = $",
            "Compile Error: Unexpected character '$'. (line 2, column 9)"
        ))
    );
    assert!(instance.statements().is_empty());
}

#[test]
fn unbalanced_blocks_are_compile_errors() {
    let mut instance = instance();
    let err = instance.compile("var a = 1\nblock\nvar b = 2\n").unwrap_err();
    assert_eq!(
        err.exception().map(|e| (e.line, e.what.as_str())),
        Some((2, "Compile Error: Lack of the 'end' signal."))
    );

    let err = instance.compile("var a = 1\nend\n").unwrap_err();
    assert_eq!(
        err.exception().map(|e| (e.line, e.code.as_str(), e.what.as_str())),
        Some((2, "end", "Compile Error: Hanging end statement."))
    );
}

#[test]
fn malformed_expressions_are_compile_errors() {
    let mut instance = instance();
    let err = instance.compile("var a = (1 + )").unwrap_err();
    assert!(matches!(err, ScriptError::Compile(_)));
    let err = instance.compile("namespace a + b\nend").unwrap_err();
    assert_eq!(
        err.exception().map(|e| e.what.as_str()),
        Some("Compile Error: Namespace name must be an identifier.")
    );
    let err = instance.compile("var 1").unwrap_err();
    assert_eq!(
        err.exception().map(|e| e.what.as_str()),
        Some("Compile Error: Wrong grammar for variable definition.")
    );
}

#[test]
fn redeclaration_is_a_runtime_error() {
    let mut instance = instance();
    let err = instance.run("var a = 1\nvar a = 2").unwrap_err();
    assert_eq!(
        err.exception().map(|e| (e.line, e.what.as_str())),
        Some((
            2,
            "Runtime Error: Variable \"a\" already defined in current scope."
        ))
    );
}

#[test]
fn failing_blocks_still_leave_their_scope() {
    let mut instance = instance();
    let err = instance
        .run("block\n    var q = 1\n    q + nope\nend")
        .unwrap_err();
    assert_eq!(err.exception().map(|e| e.line), Some(3));
    assert_eq!(instance.memory().current().domain_depth(), 1);
    instance.run("var q = 2").unwrap();
}

#[test]
fn lang_errors_carry_no_category() {
    let mut instance = instance();
    let err = instance.run("var s = \"a\"\ns - \"b\"").unwrap_err();
    assert_eq!(
        err.exception().map(|e| e.what.as_str()),
        Some("Type string does not support - operator.")
    );
}

#[test]
fn generated_code_is_relocated() {
    let codes: Vec<String> = (1..=12).map(|n| format!("original line {n}")).collect();
    let mut instance = Instance::builder()
        .file_path("main.csc")
        .csym(CsymInfo::new("main.csc", vec![10, 11], codes))
        .build();
    let err = instance.run("var a = 1\na + b").unwrap_err();
    assert_eq!(
        err,
        ScriptError::Runtime(exception(
            "main.csc",
            11,
            "original line 11",
            "Runtime Error: Use of undefined variable \"b\"."
        ))
    );
}

#[test]
fn expression_errors_report_the_expression() {
    let mut instance = instance();
    let err = instance.eval_expr("  missing * 2 ").unwrap_err();
    assert_eq!(
        err,
        ScriptError::Runtime(exception(
            "main.csc",
            1,
            "missing * 2",
            "Runtime Error: Use of undefined variable \"missing\"."
        ))
    );
}
