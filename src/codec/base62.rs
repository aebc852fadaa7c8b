//! Base62 codec
//!
//! Digits first, then lowercase, then uppercase, so `0` always encodes as `"0"`
//! and fixed-width fields pad with `'0'`.

use crate::errors::{Result, TracklinkError};

/// 62 个符号：0-9、a-z、A-Z
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

const BASE: u64 = 62;

#[inline]
fn digit_value(byte: u8) -> Option<u64> {
    match byte {
        b'0'..=b'9' => Some((byte - b'0') as u64),
        b'a'..=b'z' => Some((byte - b'a') as u64 + 10),
        b'A'..=b'Z' => Some((byte - b'A') as u64 + 36),
        _ => None,
    }
}

/// Encode a non-negative integer, most-significant digit first.
pub fn encode_base62(mut n: u64) -> String {
    if n == 0 {
        return (BASE62_ALPHABET[0] as char).to_string();
    }

    // u64::MAX 最多 11 位
    let mut digits = Vec::with_capacity(11);
    while n > 0 {
        digits.push(BASE62_ALPHABET[(n % BASE) as usize]);
        n /= BASE;
    }
    digits.iter().rev().map(|&b| b as char).collect()
}

/// Signed entry point for callers holding an `i64`; negatives are a caller bug.
pub fn encode_base62_signed(n: i64) -> Result<String> {
    if n < 0 {
        return Err(TracklinkError::negative_input(format!(
            "cannot base62-encode negative value {}",
            n
        )));
    }
    Ok(encode_base62(n as u64))
}

/// Encode into exactly `width` characters.
///
/// Keeps the `width` least-significant digits and left-pads with `'0'`, so
/// values at or above `62^width` wrap.
pub fn encode_base62_fixed(mut n: u64, width: usize) -> String {
    let mut buf = vec![BASE62_ALPHABET[0]; width];
    for slot in buf.iter_mut().rev() {
        *slot = BASE62_ALPHABET[(n % BASE) as usize];
        n /= BASE;
    }
    buf.into_iter().map(char::from).collect()
}

/// Decode a base62 string.
///
/// # Errors
/// * empty input
/// * any character outside [`BASE62_ALPHABET`]
/// * values that do not fit in `u64`
pub fn decode_base62(s: &str) -> Result<u64> {
    if s.is_empty() {
        return Err(TracklinkError::invalid_base62("empty base62 string"));
    }

    let mut value: u64 = 0;
    for (pos, ch) in s.char_indices() {
        let digit = u8::try_from(ch)
            .ok()
            .and_then(digit_value)
            .ok_or_else(|| {
                TracklinkError::invalid_base62(format!(
                    "invalid character '{}' at position {} in '{}'",
                    ch, pos, s
                ))
            })?;
        value = value
            .checked_mul(BASE)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| TracklinkError::overflow(format!("base62 value '{}' exceeds u64", s)))?;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_first_symbol() {
        assert_eq!(encode_base62(0), "0");
        assert_eq!(decode_base62("0").unwrap(), 0);
    }

    #[test]
    fn test_known_values() {
        assert_eq!(encode_base62(9), "9");
        assert_eq!(encode_base62(10), "a");
        assert_eq!(encode_base62(35), "z");
        assert_eq!(encode_base62(36), "A");
        assert_eq!(encode_base62(61), "Z");
        assert_eq!(encode_base62(62), "10");
        assert_eq!(encode_base62(3843), "ZZ");
        assert_eq!(encode_base62(3844), "100");
    }

    #[test]
    fn test_alphabet_is_unique() {
        let mut seen = std::collections::HashSet::new();
        for b in BASE62_ALPHABET {
            assert!(seen.insert(*b), "duplicate symbol {}", *b as char);
        }
        assert_eq!(seen.len(), 62);
    }

    #[test]
    fn test_fixed_width_pads_and_wraps() {
        assert_eq!(encode_base62_fixed(1, 2), "01");
        assert_eq!(encode_base62_fixed(0, 2), "00");
        assert_eq!(encode_base62_fixed(3843, 2), "ZZ");
        // 3844 = "100"，只保留低两位
        assert_eq!(encode_base62_fixed(3844, 2), "00");
        assert_eq!(encode_base62_fixed(63, 1), "1");
        assert_eq!(encode_base62_fixed(5, 0), "");
    }

    #[test]
    fn test_decode_rejects_bad_input() {
        assert!(matches!(
            decode_base62(""),
            Err(TracklinkError::InvalidBase62(_))
        ));
        assert!(matches!(
            decode_base62("ab-c"),
            Err(TracklinkError::InvalidBase62(_))
        ));
        assert!(matches!(
            decode_base62("é"),
            Err(TracklinkError::InvalidBase62(_))
        ));
        assert!(matches!(
            decode_base62("ZZZZZZZZZZZZZZZZ"),
            Err(TracklinkError::Overflow(_))
        ));
    }

    #[test]
    fn test_signed_rejects_negative() {
        assert!(matches!(
            encode_base62_signed(-1),
            Err(TracklinkError::NegativeInput(_))
        ));
        assert_eq!(encode_base62_signed(62).unwrap(), "10");
    }

    #[test]
    fn test_u64_max_round_trip() {
        let encoded = encode_base62(u64::MAX);
        assert_eq!(decode_base62(&encoded).unwrap(), u64::MAX);
    }
}
