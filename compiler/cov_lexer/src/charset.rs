//! Source decoding.
//!
//! Every charset decodes to a Rust `String`. GBK double-byte characters are
//! mapped to the supplementary private-use plane at `U+F0000 + code` so that
//! identifiers and literals keep their exact bytes and [`encode_gbk`] can
//! restore them.

use std::fmt;
use std::str::FromStr;

use crate::lex_error::{LexError, LexErrorKind};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    Ascii,
    #[default]
    Utf8,
    Gbk,
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Charset::Ascii => "ASCII",
            Charset::Utf8 => "UTF-8",
            Charset::Gbk => "GBK",
        })
    }
}

impl FromStr for Charset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ascii" => Ok(Charset::Ascii),
            "utf8" | "utf-8" => Ok(Charset::Utf8),
            "gbk" => Ok(Charset::Gbk),
            other => Err(format!("Unsupported charset \"{other}\".")),
        }
    }
}

const GBK_BASE: u32 = 0xF_0000;

/// Position of byte `offset` as 1-based line and column.
fn position(bytes: &[u8], offset: usize) -> (usize, usize) {
    let before = &bytes[..offset];
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    (line, offset - line_start + 1)
}

fn invalid(bytes: &[u8], offset: usize, charset: Charset) -> LexError {
    let (line, column) = position(bytes, offset);
    LexError::new(
        line,
        column,
        LexErrorKind::InvalidEncoding {
            charset,
            byte: bytes[offset],
        },
    )
}

pub fn decode(bytes: &[u8], charset: Charset) -> Result<String, LexError> {
    match charset {
        Charset::Ascii => match bytes.iter().position(|b| !b.is_ascii()) {
            Some(offset) => Err(invalid(bytes, offset, charset)),
            None => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        },
        Charset::Utf8 => match std::str::from_utf8(bytes) {
            Ok(text) => Ok(text.to_owned()),
            Err(err) => Err(invalid(bytes, err.valid_up_to(), charset)),
        },
        Charset::Gbk => decode_gbk(bytes),
    }
}

fn decode_gbk(bytes: &[u8]) -> Result<String, LexError> {
    let mut out = String::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        if lead.is_ascii() {
            out.push(char::from(lead));
            i += 1;
            continue;
        }
        let trail = bytes.get(i + 1).copied();
        let valid = (0x81..=0xFE).contains(&lead)
            && trail.is_some_and(|t| (0x40..=0xFE).contains(&t) && t != 0x7F);
        let scalar = trail
            .filter(|_| valid)
            .and_then(|t| char::from_u32(GBK_BASE + ((u32::from(lead) << 8) | u32::from(t))));
        match scalar {
            Some(ch) => out.push(ch),
            None => return Err(invalid(bytes, i, Charset::Gbk)),
        }
        i += 2;
    }
    Ok(out)
}

/// Inverse of GBK decoding. Characters outside ASCII and the GBK mapping
/// are written as UTF-8.
pub fn encode_gbk(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        let code = u32::from(ch);
        if let Some(pair) = code
            .checked_sub(GBK_BASE)
            .filter(|pair| (0x8140..=0xFEFE).contains(pair))
        {
            out.extend(pair.to_be_bytes()[2..].iter());
        } else {
            let mut buf = [0; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
        }
    }
    out
}

#[cfg(test)]
mod tests;
