//! Bracket resolution and line splitting.
//!
//! # Design
//!
//! A raw line is a flat token sequence. [`process_brackets`] folds every
//! bracketed run into one list token holding its comma-separated elements;
//! [`kill_brackets`] then turns those lists into expression payloads
//! (argument lists, index expressions, groups, parallels, arrays) by
//! building a tree for each element. [`kill_expr`] finally collapses each
//! maximal run of expression tokens into a single `Expr` token so the
//! grammar matcher sees keywords, expressions and terminators only.

use std::mem;

use cov_ir::{ExprTree, Signal, TokenId, TokenKind, TokenLine, TokenPool};
use cov_value::ensure_sufficient_stack;

use crate::builder::gen_tree;
use crate::{CompileError, SymbolTable};

struct Frame {
    opener: Signal,
    elements: Vec<TokenLine>,
    current: TokenLine,
    line: usize,
}

fn closes(opener: Signal, closer: Signal) -> bool {
    matches!(
        (opener, closer),
        (Signal::Slb | Signal::Fcall, Signal::Srb)
            | (Signal::Mlb | Signal::Access, Signal::Mrb)
            | (Signal::Llb, Signal::Lrb)
    )
}

fn finish_element(frame: &mut Frame, closing: bool) -> Result<(), CompileError> {
    let current = mem::take(&mut frame.current);
    if current.is_empty() {
        // `()` is an empty list; `(a,)` and `(,a)` are not.
        if closing && frame.elements.is_empty() {
            return Ok(());
        }
        return Err(CompileError::new("Empty element in list.").at(frame.line));
    }
    frame.elements.push(current);
    Ok(())
}

/// Fold bracketed runs of `line` into `Sblist`, `Mblist` and `Lblist` tokens.
///
/// Call and index openers stay in the line in front of their list.
pub fn process_brackets(pool: &mut TokenPool, line: &[TokenId]) -> Result<TokenLine, CompileError> {
    let mut out = TokenLine::with_capacity(line.len());
    let mut stack: Vec<Frame> = Vec::new();

    for &id in line {
        let token = pool.get(id);
        let line_num = token.line;
        match &token.kind {
            TokenKind::Signal(signal) if signal.is_open_bracket() => {
                let signal = *signal;
                if matches!(signal, Signal::Fcall | Signal::Access) {
                    match stack.last_mut() {
                        Some(frame) => frame.current.push(id),
                        None => out.push(id),
                    }
                }
                stack.push(Frame {
                    opener: signal,
                    elements: Vec::new(),
                    current: TokenLine::new(),
                    line: line_num,
                });
            }
            TokenKind::Signal(Signal::Com) if !stack.is_empty() => {
                if let Some(frame) = stack.last_mut() {
                    finish_element(frame, false)?;
                }
            }
            TokenKind::Signal(signal) if signal.is_close_bracket() => {
                let signal = *signal;
                let Some(mut frame) = stack.pop() else {
                    return Err(CompileError::new("Parentheses do not match.").at(line_num));
                };
                if !closes(frame.opener, signal) {
                    return Err(CompileError::new("Parentheses do not match.").at(line_num));
                }
                finish_element(&mut frame, true)?;
                let kind = match signal {
                    Signal::Srb => TokenKind::Sblist(frame.elements),
                    Signal::Mrb => TokenKind::Mblist(frame.elements),
                    _ => TokenKind::Lblist(frame.elements),
                };
                let list = pool.alloc(kind, frame.line);
                match stack.last_mut() {
                    Some(parent) => parent.current.push(list),
                    None => out.push(list),
                }
            }
            TokenKind::Endline if !stack.is_empty() => {
                return Err(CompileError::new("Lack of the corresponding bracket.").at(line_num));
            }
            _ => match stack.last_mut() {
                Some(frame) => frame.current.push(id),
                None => out.push(id),
            },
        }
    }
    if let Some(frame) = stack.last() {
        return Err(CompileError::new("Lack of the corresponding bracket.").at(frame.line));
    }
    Ok(out)
}

fn build_elements(
    pool: &mut TokenPool,
    symbols: &SymbolTable,
    elements: Vec<TokenLine>,
) -> Result<Vec<ExprTree>, CompileError> {
    elements
        .into_iter()
        .map(|mut element| {
            kill_brackets(pool, symbols, &mut element)?;
            gen_tree(pool, symbols, &element)
        })
        .collect()
}

/// Replace every list token in `line` with its expression payload.
///
/// - `f(a, b)` keeps `Fcall` followed by an `Arglist`.
/// - `a[i]` keeps `Access` followed by an `Expr` of the single index.
/// - `(e)` becomes `Expr`, `(a, b)` a `Parallel`.
/// - `[a, b]` and `{a, b}` become `Array`.
pub fn kill_brackets(
    pool: &mut TokenPool,
    symbols: &SymbolTable,
    line: &mut TokenLine,
) -> Result<(), CompileError> {
    ensure_sufficient_stack(|| {
        for index in 0..line.len() {
            let id = line[index];
            let after = index
                .checked_sub(1)
                .and_then(|prev| pool.kind(line[prev]))
                .and_then(TokenKind::signal);
            let token = pool.get_mut(id);
            let line_num = token.line;
            let kind = match &mut token.kind {
                TokenKind::Sblist(elements) => {
                    let elements = mem::take(elements);
                    if after == Some(Signal::Fcall) {
                        TokenKind::Arglist(build_elements(pool, symbols, elements)?)
                    } else if elements.is_empty() {
                        return Err(CompileError::new("Empty expression in parentheses.").at(line_num));
                    } else if elements.len() == 1 {
                        let mut trees = build_elements(pool, symbols, elements)?;
                        TokenKind::Expr(trees.pop().unwrap_or_default())
                    } else {
                        TokenKind::Parallel(build_elements(pool, symbols, elements)?)
                    }
                }
                TokenKind::Mblist(elements) => {
                    let elements = mem::take(elements);
                    if after == Some(Signal::Access) {
                        if elements.len() != 1 {
                            return Err(CompileError::new("Index operator takes exactly one index.")
                                .at(line_num));
                        }
                        let mut trees = build_elements(pool, symbols, elements)?;
                        TokenKind::Expr(trees.pop().unwrap_or_default())
                    } else {
                        TokenKind::Array(build_elements(pool, symbols, elements)?)
                    }
                }
                TokenKind::Lblist(elements) => {
                    let elements = mem::take(elements);
                    TokenKind::Array(build_elements(pool, symbols, elements)?)
                }
                _ => continue,
            };
            pool.get_mut(id).kind = kind;
        }
        Ok(())
    })
}

/// Split a token stream on `Endline` tokens.
///
/// Each resulting line keeps its terminator; lines holding nothing but a
/// terminator are dropped.
pub fn split_lines(pool: &TokenPool, tokens: &[TokenId]) -> Vec<TokenLine> {
    let mut lines = Vec::new();
    let mut current = TokenLine::new();
    for &id in tokens {
        current.push(id);
        if matches!(pool.kind(id), Some(TokenKind::Endline)) {
            if current.len() > 1 {
                lines.push(mem::take(&mut current));
            } else {
                current.clear();
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn is_expression_token(kind: &TokenKind) -> bool {
    !matches!(kind, TokenKind::Action(_) | TokenKind::Endline)
}

/// Collapse each maximal run of expression tokens into one `Expr` token.
pub fn kill_expr(
    pool: &mut TokenPool,
    symbols: &SymbolTable,
    line: &[TokenId],
) -> Result<TokenLine, CompileError> {
    let mut out = TokenLine::with_capacity(line.len());
    let mut run = TokenLine::new();
    for &id in line {
        if pool.kind(id).is_some_and(is_expression_token) {
            run.push(id);
            continue;
        }
        flush_run(pool, symbols, &mut run, &mut out)?;
        out.push(id);
    }
    flush_run(pool, symbols, &mut run, &mut out)?;
    Ok(out)
}

fn flush_run(
    pool: &mut TokenPool,
    symbols: &SymbolTable,
    run: &mut TokenLine,
    out: &mut TokenLine,
) -> Result<(), CompileError> {
    let Some(&first) = run.first() else {
        return Ok(());
    };
    let line_num = pool.get(first).line;
    let tree = gen_tree(pool, symbols, run).map_err(|err| err.at(line_num))?;
    out.push(pool.alloc(TokenKind::Expr(tree), line_num));
    run.clear();
    Ok(())
}
