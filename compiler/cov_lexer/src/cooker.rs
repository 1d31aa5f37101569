//! Token cooking.
//!
//! Turns raw scanner output into pooled [`Token`](cov_ir::Token)s:
//! identifiers are looked up as keywords and reserved literals, literals
//! are decoded into values, and signals whose meaning depends on what came
//! before them are resolved.
//!
//! # Context-sensitive signals
//!
//! After an operand (an identifier, a value or a closing bracket):
//! `-` is subtraction, `*` multiplication, `(` a call and `[` an index.
//! Anywhere else they are unary minus, escape, a group and an array.

use cov_ir::{Signal, TokenId, TokenKind, TokenLine, TokenPool};
use cov_value::{Numeric, Var};
use logos::Logos;

use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::RawToken;
use crate::Lexicon;

struct Cooker<'a> {
    source: &'a str,
    lexicon: &'a Lexicon,
    line: usize,
    line_start: usize,
    after_operand: bool,
}

impl Cooker<'_> {
    fn error(&self, offset: usize, kind: LexErrorKind) -> LexError {
        let column = self.source[self.line_start..offset].chars().count() + 1;
        LexError::new(self.line, column, kind)
    }

    fn unescape(&self, body: &str, offset: usize) -> Result<String, LexError> {
        let mut out = String::with_capacity(body.len());
        let mut chars = body.char_indices();
        while let Some((_, ch)) = chars.next() {
            if ch != '\\' {
                out.push(ch);
                continue;
            }
            // The scanner guarantees a character after every backslash.
            let Some((at, escaped)) = chars.next() else {
                break;
            };
            match self.lexicon.escape(escaped) {
                Some(resolved) => out.push(resolved),
                None => {
                    return Err(self.error(offset + at - 1, LexErrorKind::BadEscape(escaped)));
                }
            }
        }
        Ok(out)
    }

    fn signal(&self, raw: RawToken) -> Option<Signal> {
        let operand = self.after_operand;
        Some(match raw {
            RawToken::Plus => Signal::Add,
            RawToken::PlusEq => Signal::AddAsi,
            RawToken::Minus if operand => Signal::Sub,
            RawToken::Minus => Signal::Minus,
            RawToken::MinusEq => Signal::SubAsi,
            RawToken::Star if operand => Signal::Mul,
            RawToken::Star => Signal::Escape,
            RawToken::StarEq => Signal::MulAsi,
            RawToken::Slash => Signal::Div,
            RawToken::SlashEq => Signal::DivAsi,
            RawToken::Percent => Signal::Mod,
            RawToken::PercentEq => Signal::ModAsi,
            RawToken::Caret => Signal::Pow,
            RawToken::CaretEq => Signal::PowAsi,
            RawToken::Dot => Signal::Dot,
            RawToken::Arrow => Signal::Arrow,
            RawToken::Amp => Signal::Addr,
            RawToken::Lt => Signal::Und,
            RawToken::Gt => Signal::Abo,
            RawToken::LtEq => Signal::Ueq,
            RawToken::GtEq => Signal::Aeq,
            RawToken::EqEq => Signal::Equ,
            RawToken::NotEq => Signal::Neq,
            RawToken::Eq => Signal::Asi,
            RawToken::ColonEq => Signal::LnkAsi,
            RawToken::AmpAmp => Signal::And,
            RawToken::PipePipe => Signal::Or,
            RawToken::Bang => Signal::Not,
            RawToken::PlusPlus => Signal::Inc,
            RawToken::MinusMinus => Signal::Dec,
            RawToken::Colon => Signal::Pair,
            RawToken::Question => Signal::Choice,
            RawToken::Comma => Signal::Com,
            RawToken::LParen if operand => Signal::Fcall,
            RawToken::LParen => Signal::Slb,
            RawToken::RParen => Signal::Srb,
            RawToken::LBracket if operand => Signal::Access,
            RawToken::LBracket => Signal::Mlb,
            RawToken::RBracket => Signal::Mrb,
            RawToken::LBrace => Signal::Llb,
            RawToken::RBrace => Signal::Lrb,
            _ => return None,
        })
    }

    /// Cook one raw token; `None` for tokens that produce nothing.
    fn cook(&mut self, raw: RawToken, text: &str, offset: usize) -> Result<Option<TokenKind>, LexError> {
        let kind = match raw {
            RawToken::Comment => return Ok(None),
            RawToken::Newline | RawToken::Semicolon => {
                self.after_operand = false;
                TokenKind::Endline
            }
            RawToken::Ident => {
                if let Some(action) = self.lexicon.action(text) {
                    self.after_operand = false;
                    TokenKind::Action(action)
                } else if let Some(value) = self.lexicon.reserved(text) {
                    self.after_operand = true;
                    TokenKind::Value(value.clone())
                } else {
                    self.after_operand = true;
                    TokenKind::Id(text.to_owned())
                }
            }
            RawToken::Int => {
                let value = text.parse::<i64>().map_err(|_| {
                    self.error(offset, LexErrorKind::NumberOverflow(text.to_owned()))
                })?;
                self.after_operand = true;
                TokenKind::Value(Var::make(Numeric::Integer(value)))
            }
            RawToken::HexInt => {
                let value = i64::from_str_radix(&text[2..], 16).map_err(|_| {
                    self.error(offset, LexErrorKind::NumberOverflow(text.to_owned()))
                })?;
                self.after_operand = true;
                TokenKind::Value(Var::make(Numeric::Integer(value)))
            }
            RawToken::Float => {
                let value = text.parse::<f64>().map_err(|_| {
                    self.error(offset, LexErrorKind::NumberOverflow(text.to_owned()))
                })?;
                self.after_operand = true;
                TokenKind::Value(Var::make(Numeric::Float(value)))
            }
            RawToken::String => {
                let body = self.unescape(&text[1..text.len() - 1], offset + 1)?;
                self.after_operand = true;
                TokenKind::Value(Var::make(body))
            }
            RawToken::Char => {
                let body = self.unescape(&text[1..text.len() - 1], offset + 1)?;
                let mut chars = body.chars();
                let ch = match (chars.next(), chars.next()) {
                    (Some(ch), None) => ch,
                    (None, _) => return Err(self.error(offset, LexErrorKind::EmptyChar)),
                    (Some(_), Some(_)) => return Err(self.error(offset, LexErrorKind::MultiChar)),
                };
                self.after_operand = true;
                TokenKind::Value(Var::make(ch))
            }
            RawToken::UnterminatedString => {
                return Err(self.error(offset, LexErrorKind::UnterminatedString));
            }
            RawToken::UnterminatedChar => {
                return Err(self.error(offset, LexErrorKind::UnterminatedChar));
            }
            other => {
                let Some(signal) = self.signal(other) else {
                    return Ok(None);
                };
                match signal {
                    // Postfix keeps the operand state, prefix keeps its absence.
                    Signal::Inc | Signal::Dec => {}
                    Signal::Srb | Signal::Mrb | Signal::Lrb => self.after_operand = true,
                    _ => self.after_operand = false,
                }
                TokenKind::Signal(signal)
            }
        };
        Ok(Some(kind))
    }
}

/// Lex `source` into `pool`, numbering lines from `first_line`.
///
/// Newlines and `;` become [`TokenKind::Endline`] tokens; no trailing
/// terminator is added.
pub fn tokenize(
    source: &str,
    lexicon: &Lexicon,
    pool: &mut TokenPool,
    first_line: usize,
) -> Result<TokenLine, LexError> {
    let mut cooker = Cooker {
        source,
        lexicon,
        line: first_line,
        line_start: 0,
        after_operand: false,
    };
    let mut tokens: Vec<TokenId> = Vec::new();
    let mut lexer = RawToken::lexer(source);

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let Ok(raw) = raw else {
            let ch = text.chars().next().unwrap_or('\0');
            return Err(cooker.error(span.start, LexErrorKind::UnknownCharacter(ch)));
        };
        if let Some(kind) = cooker.cook(raw, text, span.start)? {
            tokens.push(pool.alloc(kind, cooker.line));
        }
        if raw == RawToken::Newline {
            cooker.line += 1;
            cooker.line_start = span.end;
        }
    }
    tracing::trace!(tokens = tokens.len(), lines = cooker.line - first_line + 1, "lexed");
    Ok(tokens)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    reason = "tests use unwrap to panic on unexpected state"
)]
mod tests;
