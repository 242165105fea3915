use alloc::string::String;
use core::str::{self, FromStr};

use num_bigint::BigInt;
use rust_decimal::Decimal;

/// Longest integer literal that is still parsed as a [`BigInt`].
pub(crate) const MAX_BIG_INTEGER_LEN: usize = 380;

/// Outcome of a strict integer parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum IntParse<T> {
    Value(T),
    /// Every byte was a digit but the value does not fit.
    Overflow,
    Invalid,
}

pub(crate) fn parse_i64(bytes: &[u8]) -> IntParse<i64> {
    let (negative, digits) = match bytes {
        [b'-', rest @ ..] => (true, rest),
        _ => (false, bytes),
    };
    if digits.is_empty() {
        return IntParse::Invalid;
    }

    let mut value: i64 = 0;
    let mut overflow = false;
    for &b in digits {
        if !b.is_ascii_digit() {
            return IntParse::Invalid;
        }
        if overflow {
            continue;
        }
        let digit = i64::from(b - b'0');
        let next = value.checked_mul(10).and_then(|v| {
            if negative {
                v.checked_sub(digit)
            } else {
                v.checked_add(digit)
            }
        });
        match next {
            Some(v) => value = v,
            None => overflow = true,
        }
    }

    if overflow {
        IntParse::Overflow
    } else {
        IntParse::Value(value)
    }
}

pub(crate) fn parse_i32(bytes: &[u8]) -> IntParse<i32> {
    match parse_i64(bytes) {
        IntParse::Value(v) => i32::try_from(v).map_or(IntParse::Overflow, IntParse::Value),
        IntParse::Overflow => IntParse::Overflow,
        IntParse::Invalid => IntParse::Invalid,
    }
}

/// Radix and digits of a `0x…` or leading-`0` octal literal.
fn split_radix(bytes: &[u8]) -> Option<(u32, &str)> {
    let text = str::from_utf8(bytes).ok()?;
    match text.get(..2) {
        Some("0x" | "0X") => Some((16, &text[2..])),
        _ => Some((8, text)),
    }
}

/// Parses a hex or octal literal. Values above `i64::MAX` wrap to negative
/// numbers, matching a two's complement reinterpretation of the bits.
pub(crate) fn parse_radix_i64(bytes: &[u8]) -> Option<i64> {
    let (radix, digits) = split_radix(bytes)?;
    u64::from_str_radix(digits, radix)
        .ok()
        .map(|v| v as i64)
}

pub(crate) fn parse_radix_i32(bytes: &[u8]) -> Option<i32> {
    let (radix, digits) = split_radix(bytes)?;
    u32::from_str_radix(digits, radix)
        .ok()
        .map(|v| v as i32)
}

fn is_float_text(bytes: &[u8]) -> bool {
    bytes
        .iter()
        .all(|b| matches!(b, b'0'..=b'9' | b'.' | b'e' | b'E' | b'+' | b'-'))
}

/// Parses a floating point literal using only the invariant number grammar.
pub(crate) fn parse_f64_invariant(bytes: &[u8]) -> Option<f64> {
    if bytes.is_empty() || !is_float_text(bytes) {
        return None;
    }
    str::from_utf8(bytes).ok()?.parse().ok()
}

pub(crate) fn parse_decimal(bytes: &[u8]) -> Option<Decimal> {
    if bytes.is_empty() || !is_float_text(bytes) {
        return None;
    }
    let text = str::from_utf8(bytes).ok()?;
    if text.contains(['e', 'E']) {
        Decimal::from_scientific(text).ok()
    } else {
        Decimal::from_str(text).ok()
    }
}

pub(crate) fn parse_big(bytes: &[u8]) -> Option<BigInt> {
    BigInt::parse_bytes(bytes, 10)
}

fn without_commas(text: &str) -> String {
    text.chars().filter(|&c| c != ',').collect()
}

/// Quoted-number conversion used by `read_as_int32`.
pub(crate) fn i32_from_text(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

/// Quoted-number conversion used by `read_as_decimal`.
pub(crate) fn decimal_from_text(text: &str) -> Option<Decimal> {
    let cleaned = without_commas(text.trim());
    let cleaned = cleaned.strip_prefix('+').unwrap_or(&cleaned);
    parse_decimal(cleaned.as_bytes())
}

/// Quoted-number conversion used by `read_as_double`.
pub(crate) fn f64_from_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    match trimmed {
        "NaN" => return Some(f64::NAN),
        "Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    parse_f64_invariant(without_commas(trimmed).as_bytes())
}

pub(crate) fn bool_from_text(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
