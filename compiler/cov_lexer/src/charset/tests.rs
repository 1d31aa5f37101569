use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn ascii_rejects_high_bytes() {
    assert_eq!(decode(b"abc", Charset::Ascii).ok().as_deref(), Some("abc"));
    let err = decode(b"ab\n\xC3", Charset::Ascii).err();
    assert_eq!(
        err,
        Some(LexError::new(
            2,
            1,
            LexErrorKind::InvalidEncoding {
                charset: Charset::Ascii,
                byte: 0xC3
            }
        ))
    );
}

#[test]
fn utf8_validates() {
    assert_eq!(
        decode("héllo".as_bytes(), Charset::Utf8).ok().as_deref(),
        Some("héllo")
    );
    assert!(decode(b"\xFF", Charset::Utf8).is_err());
}

#[test]
fn gbk_pairs_map_to_private_use() {
    // "中" in GBK.
    let decoded = decode(b"a\xD6\xD0", Charset::Gbk).ok();
    assert_eq!(decoded.as_ref().map(|s| s.chars().count()), Some(2));
    let ch = decoded.as_ref().and_then(|s| s.chars().nth(1));
    assert_eq!(ch.map(u32::from), Some(0xF_D6D0));
    assert_eq!(decoded.map(|s| encode_gbk(&s)), Some(b"a\xD6\xD0".to_vec()));
}

#[test]
fn gbk_rejects_truncated_pair() {
    let err = decode(b"x\xD6", Charset::Gbk).err().map(|e| e.to_string());
    assert_eq!(
        err.as_deref(),
        Some("Invalid GBK byte 0xD6. (line 1, column 2)")
    );
}

#[test]
fn charset_names() {
    assert_eq!("utf-8".parse::<Charset>(), Ok(Charset::Utf8));
    assert_eq!("GBK".parse::<Charset>(), Ok(Charset::Gbk));
    assert!("latin1".parse::<Charset>().is_err());
}

proptest! {
    #[test]
    fn gbk_round_trips(pairs in prop::collection::vec((0x81u8..=0xFE, 0x80u8..=0xFE), 0..32)) {
        let bytes: Vec<u8> = pairs.iter().flat_map(|&(lead, trail)| [lead, trail]).collect();
        let decoded = decode(&bytes, Charset::Gbk);
        prop_assert!(decoded.is_ok());
        prop_assert_eq!(decoded.map(|s| encode_gbk(&s)).ok(), Some(bytes));
    }
}
