use std::str::FromStr;

use anyhow::{anyhow, Result};

/// Parses an `i32` value from a given string.
///
/// Unlike a lenient prefix parse, the whole (trimmed) string must be an
/// integer: `"2023abc"` and `"20.5"` are rejected.
///
/// # Example
///
/// ```
/// let year = parse_i32(" 2023 ").unwrap();
/// assert_eq!(year, 2023);
/// ```
pub fn parse_i32(s: &str) -> Result<i32> {
    let cleaned = s.trim();
    i32::from_str(cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as i32 because: {:?}", cleaned, why))
}

/// Parses a finite `f64` value from a given string.
///
/// `NaN` and the infinities are accepted by `f64::from_str` but never
/// describe a price, so they are reported as errors here.
pub fn parse_f64(s: &str) -> Result<f64> {
    let cleaned = s.trim();
    let value = f64::from_str(cleaned)
        .map_err(|why| anyhow!("Failed to parse '{}' as f64 because: {:?}", cleaned, why))?;

    if !value.is_finite() {
        return Err(anyhow!("'{}' is not a finite number", cleaned));
    }

    Ok(value)
}

/// Parses the leading integer of a string, ignoring whatever follows it.
///
/// Leading whitespace and one `+`/`-` sign are accepted, so `" 2023abc"`
/// yields `Some(2023)`. Returns `None` when no digit follows, or when the
/// digits do not fit in an `i64`.
pub fn parse_int_prefix(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (sign, rest) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if end == 0 {
        return None;
    }

    i64::from_str(&rest[..end]).ok().map(|n| sign * n)
}
