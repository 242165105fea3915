//! Decoding of `\uXXXX` escapes into UTF-16 code units.
//!
//! Unlike a plain `char` decoder, [`UnicodeEscapeBuffer`] yields raw `u16`
//! units so that surrogate halves can be paired (or repaired to U+FFFD) by
//! the string scanner.

/// U+FFFD, substituted for unpaired surrogates.
pub(crate) const REPLACEMENT: char = '\u{FFFD}';

/// Accumulates exactly four ASCII hexadecimal digits into a code unit.
#[derive(Debug, Default)]
pub(crate) struct UnicodeEscapeBuffer {
    acc: u16,
    len: u8,
}

impl UnicodeEscapeBuffer {
    pub fn new() -> Self {
        Self { acc: 0, len: 0 }
    }

    pub fn reset(&mut self) {
        self.acc = 0;
        self.len = 0;
    }

    #[inline]
    fn hex_val(b: u8) -> Option<u16> {
        match b {
            b'0'..=b'9' => Some(u16::from(b - b'0')),
            b'a'..=b'f' => Some(u16::from(b - b'a' + 10)),
            b'A'..=b'F' => Some(u16::from(b - b'A' + 10)),
            _ => None,
        }
    }

    /// Feeds one hex digit.
    ///
    /// Returns `Ok(Some(unit))` once the fourth digit arrives and resets for
    /// the next escape. A non-hex byte returns `Err(())` and also resets.
    pub fn feed(&mut self, b: u8) -> Result<Option<u16>, ()> {
        let Some(d) = Self::hex_val(b) else {
            self.reset();
            return Err(());
        };
        self.acc = (self.acc << 4) | d;
        self.len += 1;
        if self.len < 4 {
            return Ok(None);
        }
        let unit = self.acc;
        self.reset();
        Ok(Some(unit))
    }

    /// Decodes a complete four-digit group.
    pub fn decode(digits: &[u8]) -> Option<u16> {
        let mut buf = Self::new();
        let mut out = None;
        for &b in digits {
            out = buf.feed(b).ok()?;
        }
        out
    }
}

#[inline]
pub(crate) fn is_high_surrogate(unit: u16) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

#[inline]
pub(crate) fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Joins a high and a low surrogate into the scalar they encode.
#[inline]
pub(crate) fn combine_surrogates(high: u16, low: u16) -> char {
    let code = 0x10000 + ((u32::from(high) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
    char::from_u32(code).unwrap_or(REPLACEMENT)
}

/// Converts a non-surrogate unit to a `char`, repairing surrogates.
#[inline]
pub(crate) fn unit_to_char(unit: u16) -> char {
    char::from_u32(u32::from(unit)).unwrap_or(REPLACEMENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_decoding() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'0').unwrap(), None);
        assert_eq!(buf.feed(b'4').unwrap(), None);
        assert_eq!(buf.feed(b'1').unwrap(), Some(0x41));
    }

    #[test]
    fn mixed_case_hex() {
        assert_eq!(UnicodeEscapeBuffer::decode(b"AbCd"), Some(0xABCD));
    }

    #[test]
    fn reset_clears_buffer() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert!(buf.feed(b'F').unwrap().is_none());
        buf.reset();
        assert_eq!(UnicodeEscapeBuffer::decode(b"0000"), Some(0));
    }

    #[test]
    fn invalid_hex_error() {
        let mut buf = UnicodeEscapeBuffer::new();
        assert!(buf.feed(b'G').is_err());
        assert_eq!(UnicodeEscapeBuffer::decode(b"12G4"), None);
    }

    #[test]
    fn surrogates_yield_units_not_errors() {
        assert_eq!(UnicodeEscapeBuffer::decode(b"D800"), Some(0xD800));
        assert!(is_high_surrogate(0xD800));
        assert!(is_low_surrogate(0xDC00));
        assert_eq!(combine_surrogates(0xD83D, 0xDE00), '😀');
        assert_eq!(unit_to_char(0xDC00), REPLACEMENT);
    }
}
