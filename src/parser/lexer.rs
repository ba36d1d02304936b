//! ID Lexer
//!
//! Strict recognition of LOCString ID numbers.
//! Works on the characters alone, so arbitrarily long IDs never overflow.

/// Check whether `value` is a non-negative integer without leading zeros.
///
/// Accepts `0` and anything matching `[1-9][0-9]*`. Signs, whitespace and
/// non-ASCII digits are rejected.
pub fn is_integer(value: &str) -> bool {
    let bytes = value.as_bytes();

    match bytes {
        [] => false,
        // Zero prefixes are not allowed (just a zero is fine though)
        [b'0', _, ..] => false,
        _ => bytes.iter().all(u8::is_ascii_digit),
    }
}
