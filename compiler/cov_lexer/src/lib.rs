//! Lexer for CovScript using logos.
//!
//! Source bytes are decoded according to a [`Charset`], scanned by a
//! logos-derived raw tokenizer and cooked into pooled tokens with
//! keywords, literal values and context-sensitive signals resolved.

mod charset;
mod cooker;
mod lex_error;
mod lexicon;
mod raw_token;

pub use charset::{decode, encode_gbk, Charset};
pub use cooker::tokenize;
pub use lex_error::{LexError, LexErrorKind};
pub use lexicon::Lexicon;

use cov_ir::{TokenLine, TokenPool};

/// Decode `bytes` and lex them in one step.
pub fn tokenize_bytes(
    bytes: &[u8],
    charset: Charset,
    lexicon: &Lexicon,
    pool: &mut TokenPool,
    first_line: usize,
) -> Result<TokenLine, LexError> {
    let source = decode(bytes, charset)?;
    tokenize(&source, lexicon, pool, first_line)
}
