//! UTF-8 validation with classified failures.

use crate::error::JsonErrorKind;

/// Validates `bytes` as UTF-8.
///
/// On failure, returns the error class and the length of the valid prefix.
/// The fast path defers to the core validator; classification only runs on
/// the first offending sequence.
pub(crate) fn validate(bytes: &[u8]) -> Result<&str, (JsonErrorKind, usize)> {
    match core::str::from_utf8(bytes) {
        Ok(text) => Ok(text),
        Err(err) => {
            let valid = err.valid_up_to();
            Err((classify(&bytes[valid..]), valid))
        }
    }
}

/// Classifies the malformed sequence at the start of `bytes`.
fn classify(bytes: &[u8]) -> JsonErrorKind {
    let lead = match bytes.first() {
        Some(&b) => b,
        None => return JsonErrorKind::ExpectedContinuationByte,
    };
    match lead {
        // A continuation byte in lead position.
        0x80..=0xbf => JsonErrorKind::IllegalCodepoint,
        // Two-byte encodings of U+0000..=U+007F.
        0xc0 | 0xc1 => JsonErrorKind::OverLongUtf8Sequence,
        0xc2..=0xdf => JsonErrorKind::ExpectedContinuationByte,
        0xe0 => match bytes.get(1) {
            Some(0x80..=0x9f) => JsonErrorKind::OverLongUtf8Sequence,
            _ => JsonErrorKind::ExpectedContinuationByte,
        },
        // 0xED introduces U+D800..=U+DFFF when the second byte is >= 0xA0:
        // the high half first, the low half from 0xB0.
        0xed => match bytes.get(1) {
            Some(0xa0..=0xaf) => JsonErrorKind::UnpairedHighSurrogate,
            Some(0xb0..=0xbf) => JsonErrorKind::IllegalSurrogateValue,
            _ => JsonErrorKind::ExpectedContinuationByte,
        },
        0xe1..=0xec | 0xee | 0xef => JsonErrorKind::ExpectedContinuationByte,
        0xf0 => match bytes.get(1) {
            Some(0x80..=0x8f) => JsonErrorKind::OverLongUtf8Sequence,
            _ => JsonErrorKind::ExpectedContinuationByte,
        },
        0xf1..=0xf3 => JsonErrorKind::ExpectedContinuationByte,
        // 0xF4 with a second byte >= 0x90 encodes past U+10FFFF.
        0xf4 => match bytes.get(1) {
            Some(0x90..=0xbf) => JsonErrorKind::IllegalCodepoint,
            _ => JsonErrorKind::ExpectedContinuationByte,
        },
        0xf5..=0xff => JsonErrorKind::IllegalCodepoint,
        // Unreachable: 0x00..=0x7F never fails validation.
        _ => JsonErrorKind::IllegalCodepoint,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_sequences() {
        assert_eq!(validate("𝄞 héllo".as_bytes()).unwrap(), "𝄞 héllo");
        assert_eq!(validate(b"").unwrap(), "");
    }

    #[test]
    fn classifies_overlong() {
        assert_eq!(
            validate(b"a\xc0\xaf"),
            Err((JsonErrorKind::OverLongUtf8Sequence, 1))
        );
        assert_eq!(
            validate(b"\xe0\x80\x80"),
            Err((JsonErrorKind::OverLongUtf8Sequence, 0))
        );
    }

    #[test]
    fn classifies_surrogates() {
        // U+D800 (a high surrogate) encoded directly.
        assert_eq!(
            validate(b"\xed\xa0\x80"),
            Err((JsonErrorKind::UnpairedHighSurrogate, 0))
        );
        // U+DC00 (a low surrogate) encoded directly.
        assert_eq!(
            validate(b"\xed\xb0\x80"),
            Err((JsonErrorKind::IllegalSurrogateValue, 0))
        );
    }

    #[test]
    fn classifies_missing_continuation() {
        assert_eq!(
            validate(b"\xc3Z"),
            Err((JsonErrorKind::ExpectedContinuationByte, 0))
        );
        assert_eq!(
            validate(b"ab\xe2\x82"),
            Err((JsonErrorKind::ExpectedContinuationByte, 2))
        );
    }

    #[test]
    fn classifies_out_of_range() {
        assert_eq!(
            validate(b"\xf4\x90\x80\x80"),
            Err((JsonErrorKind::IllegalCodepoint, 0))
        );
        assert_eq!(validate(b"\xff"), Err((JsonErrorKind::IllegalCodepoint, 0)));
    }
}
