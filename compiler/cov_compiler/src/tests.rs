use cov_ir::{CsymInfo, TokenTag};
use cov_lexer::Charset;
use pretty_assertions::assert_eq;

use crate::{CompileError, Compiler};

fn shape(compiler: &Compiler, lines: &[Vec<cov_ir::TokenId>]) -> Vec<(Vec<TokenTag>, usize)> {
    lines
        .iter()
        .map(|line| {
            let tags = line.iter().map(|&id| compiler.pool().get(id).tag()).collect();
            (tags, compiler.line_number(line))
        })
        .collect()
}

#[test]
fn build_ast_splits_and_collapses_lines() {
    let mut compiler = Compiler::default();
    let lines = compiler.build_ast("var x = f(1, 2)\n\nx + 1; end").unwrap();
    assert_eq!(
        shape(&compiler, &lines),
        vec![
            (vec![TokenTag::Action, TokenTag::Expr, TokenTag::Endline], 1),
            (vec![TokenTag::Expr, TokenTag::Endline], 3),
            (vec![TokenTag::Action, TokenTag::Endline], 3),
        ]
    );
}

#[test]
fn build_line_numbers_from_the_given_line() {
    let mut compiler = Compiler::default();
    let lines = compiler.build_line("a = 1; b", 5).unwrap();
    assert_eq!(
        shape(&compiler, &lines),
        vec![
            (vec![TokenTag::Expr, TokenTag::Endline], 5),
            (vec![TokenTag::Expr, TokenTag::Endline], 5),
        ]
    );
}

#[test]
fn errors_report_their_line() {
    let mut compiler = Compiler::default();
    let err = compiler.build_ast("a = 1\nb c").unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.to_string(), "Compile Error: Missing operator between operands.");

    let err = compiler.build_ast("a = \"open").unwrap_err();
    assert!(matches!(err, CompileError::Lex(_)));
    assert_eq!(err.line(), Some(1));
}

#[test]
fn brackets_do_not_span_lines() {
    let mut compiler = Compiler::default();
    let err = compiler.build_ast("f(1,\n2)").unwrap_err();
    assert_eq!(err.what(), "Lack of the corresponding bracket.");
}

#[test]
fn bytes_are_decoded_first() {
    let mut compiler = Compiler::default();
    let lines = compiler.build_ast_bytes(b"x + 1", Charset::Ascii).unwrap();
    assert_eq!(lines.len(), 1);
    assert!(compiler.build_ast_bytes(b"\xFF", Charset::Utf8).is_err());
}

#[test]
fn token_collection() {
    let mut compiler = Compiler::default();
    compiler.build_ast("a + b").unwrap();
    assert!(compiler.collect_tokens() > 0);
    assert!(compiler.pool().is_empty());
}

#[test]
fn csym_lookup() {
    let mut compiler = Compiler::default();
    compiler.import_csym(CsymInfo::new(
        "gen.csc",
        vec![3],
        vec!["a".into(), "b".into(), "c = 1".into()],
    ));
    let info = compiler.csym("gen.csc").unwrap();
    assert_eq!(info.relocate(1), Some((3, "c = 1")));
    assert!(compiler.csym("other.csc").is_none());
}
