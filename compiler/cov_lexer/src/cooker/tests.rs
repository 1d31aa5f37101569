use super::*;
use cov_ir::{Action, TokenTag};
use pretty_assertions::assert_eq;

fn lex(source: &str) -> (TokenPool, TokenLine) {
    let mut pool = TokenPool::new();
    let line = tokenize(source, &Lexicon::default(), &mut pool, 1).unwrap();
    (pool, line)
}

fn lex_err(source: &str) -> LexError {
    let mut pool = TokenPool::new();
    tokenize(source, &Lexicon::default(), &mut pool, 1).unwrap_err()
}

fn signals(source: &str) -> Vec<Signal> {
    let (pool, line) = lex(source);
    line.iter()
        .filter_map(|&id| pool.get(id).kind.signal())
        .collect()
}

#[test]
fn keywords_identifiers_and_literals() {
    let (pool, line) = lex("var x = true");
    let tags: Vec<TokenTag> = line.iter().map(|&id| pool.get(id).tag()).collect();
    assert_eq!(
        tags,
        vec![TokenTag::Action, TokenTag::Id, TokenTag::Signal, TokenTag::Value]
    );
    assert_eq!(pool.get(line[0]).kind.action(), Some(Action::Var));
    match &pool.get(line[3]).kind {
        TokenKind::Value(v) => assert_eq!(v, &Var::make(true)),
        other => panic!("expected value, got {other:?}"),
    }
}

#[test]
fn numbers() {
    let (pool, line) = lex("42 3.5 0x1F 1e3");
    let values: Vec<Var> = line
        .iter()
        .filter_map(|&id| match &pool.get(id).kind {
            TokenKind::Value(v) => Some(v.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        values,
        vec![
            Var::make(Numeric::Integer(42)),
            Var::make(Numeric::Float(3.5)),
            Var::make(Numeric::Integer(31)),
            Var::make(Numeric::Float(1000.0)),
        ]
    );
}

#[test]
fn string_escapes() {
    let (pool, line) = lex(r#""a\tb\"c" '\n'"#);
    match &pool.get(line[0]).kind {
        TokenKind::Value(v) => assert_eq!(v.const_val::<String>().unwrap(), "a\tb\"c"),
        other => panic!("expected string, got {other:?}"),
    }
    match &pool.get(line[1]).kind {
        TokenKind::Value(v) => assert_eq!(v.const_val::<char>().unwrap(), &'\n'),
        other => panic!("expected char, got {other:?}"),
    }
}

#[test]
fn minus_star_and_brackets_depend_on_context() {
    assert_eq!(
        signals("a - -b"),
        vec![Signal::Sub, Signal::Minus]
    );
    assert_eq!(signals("a * *p"), vec![Signal::Mul, Signal::Escape]);
    assert_eq!(
        signals("f(x)[0]"),
        vec![Signal::Fcall, Signal::Srb, Signal::Access, Signal::Mrb]
    );
    assert_eq!(
        signals("(1)[0]"),
        vec![Signal::Slb, Signal::Srb, Signal::Access, Signal::Mrb]
    );
    assert_eq!(signals("[1]"), vec![Signal::Mlb, Signal::Mrb]);
    assert_eq!(signals("a++ - b"), vec![Signal::Inc, Signal::Sub]);
    assert_eq!(signals("++a"), vec![Signal::Inc]);
    assert_eq!(signals("-(1)"), vec![Signal::Minus, Signal::Slb, Signal::Srb]);
}

#[test]
fn terminators_and_comments() {
    let (pool, line) = lex("a # note\nb; c");
    let kinds: Vec<(TokenTag, usize)> = line
        .iter()
        .map(|&id| (pool.get(id).tag(), pool.get(id).line))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (TokenTag::Id, 1),
            (TokenTag::Endline, 1),
            (TokenTag::Id, 2),
            (TokenTag::Endline, 2),
            (TokenTag::Id, 2),
        ]
    );
}

#[test]
fn non_ascii_identifiers() {
    let (pool, line) = lex("变量 = 1");
    match &pool.get(line[0]).kind {
        TokenKind::Id(name) => assert_eq!(name, "变量"),
        other => panic!("expected identifier, got {other:?}"),
    }
}

#[test]
fn errors_carry_position() {
    let err = lex_err("a\n  $");
    assert_eq!((err.line, err.column), (2, 3));
    assert_eq!(err.kind, LexErrorKind::UnknownCharacter('$'));

    assert_eq!(lex_err("\"abc").kind, LexErrorKind::UnterminatedString);
    assert_eq!(lex_err("'x").kind, LexErrorKind::UnterminatedChar);
    assert_eq!(lex_err(r#""\q""#).kind, LexErrorKind::BadEscape('q'));
    assert_eq!(lex_err("''").kind, LexErrorKind::EmptyChar);
    assert_eq!(lex_err("'ab'").kind, LexErrorKind::MultiChar);
    assert_eq!(
        lex_err("99999999999999999999").kind,
        LexErrorKind::NumberOverflow("99999999999999999999".to_owned())
    );
    assert_eq!(
        lex_err("$").to_string(),
        "Unexpected character '$'. (line 1, column 1)"
    );
}

#[test]
fn empty_lexicon_treats_keywords_as_identifiers() {
    let mut pool = TokenPool::new();
    let line = tokenize("var", &Lexicon::empty(), &mut pool, 1).unwrap();
    assert_eq!(pool.get(line[0]).tag(), TokenTag::Id);
}
