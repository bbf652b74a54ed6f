//! cp1251 text handling and fixed-width name fields.
//!
//! All text in both archive formats is stored in the Windows-1251 code page.
//! Node and material names live in fixed 32-byte fields padded with NULs.

use std::borrow::Cow;

use encoding_rs::WINDOWS_1251;

use crate::{Error, Result};

/// Width of a fixed name field.
pub const NAME_LEN: usize = 32;

/// Placeholder character meaning "no name".
pub const EMPTY_NAME: char = '~';

/// Decode cp1251 bytes into a string.
///
/// cp1251 maps every byte, so decoding cannot fail.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let (text, _) = WINDOWS_1251.decode_without_bom_handling(bytes);
    text
}

/// Encode a string as cp1251.
pub fn encode(text: &str) -> Result<Cow<'_, [u8]>> {
    let (bytes, _, had_errors) = WINDOWS_1251.encode(text);
    if had_errors {
        return Err(Error::Unencodable(text.to_owned()));
    }
    Ok(bytes)
}

/// Returns true if the name is the "no name" sentinel.
pub fn is_empty_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c == EMPTY_NAME)
}

/// Decode a fixed 32-byte name field, cutting at the first NUL.
pub fn decode_name32(field: &[u8; NAME_LEN]) -> String {
    let end = memchr::memchr(0, field).unwrap_or(NAME_LEN);
    decode(&field[..end]).into_owned()
}

/// Encode a name into a fixed 32-byte, NUL-padded field.
///
/// The "no name" sentinel serializes as all NULs. Names longer than
/// 32 encoded bytes are rejected.
pub fn encode_name32(name: &str) -> Result<[u8; NAME_LEN]> {
    let mut field = [0u8; NAME_LEN];
    if is_empty_name(name) {
        return Ok(field);
    }

    let encoded = encode(name)?;
    if encoded.len() > NAME_LEN {
        return Err(Error::NameTooLong {
            name: name.to_owned(),
            len: encoded.len(),
        });
    }
    field[..encoded.len()].copy_from_slice(&encoded);
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cyrillic_roundtrip() {
        let encoded = encode("Дом").unwrap();
        assert_eq!(&*encoded, &[0xC4, 0xEE, 0xEC]);
        assert_eq!(decode(&encoded), "Дом");
    }

    #[test]
    fn test_unencodable_text() {
        assert!(matches!(encode("日本"), Err(Error::Unencodable(_))));
    }

    #[test]
    fn test_name32_padding() {
        let field = encode_name32("wheel").unwrap();
        assert_eq!(&field[..5], b"wheel");
        assert!(field[5..].iter().all(|&b| b == 0));
        assert_eq!(decode_name32(&field), "wheel");
    }

    #[test]
    fn test_name32_sentinel_is_all_nul() {
        assert_eq!(encode_name32("~").unwrap(), [0u8; NAME_LEN]);
        assert_eq!(encode_name32("~~").unwrap(), [0u8; NAME_LEN]);
        assert_eq!(decode_name32(&[0u8; NAME_LEN]), "");
    }

    #[test]
    fn test_name32_full_width() {
        let name = "a".repeat(NAME_LEN);
        let field = encode_name32(&name).unwrap();
        assert_eq!(decode_name32(&field), name);
    }

    #[test]
    fn test_name32_too_long() {
        let name = "a".repeat(NAME_LEN + 1);
        assert!(matches!(
            encode_name32(&name),
            Err(Error::NameTooLong { len: 33, .. })
        ));
    }

    #[test]
    fn test_decode_stops_at_first_nul() {
        let mut field = [0u8; NAME_LEN];
        field[..3].copy_from_slice(b"abc");
        field[4..7].copy_from_slice(b"xyz");
        assert_eq!(decode_name32(&field), "abc");
    }
}
