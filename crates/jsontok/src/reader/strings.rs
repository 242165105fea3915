//! Quoted strings: escape decoding, surrogate repair and the string-valued
//! token forms (plain text, dates and byte payloads).

use alloc::{borrow::Cow, format, string::String};

use super::{JsonTokenizer, ReadRequest, Slot};
use crate::{
    buffer::StringRef,
    coerce::{bytes::bytes_from_text, dates::parse_date},
    error::{EndSite, ErrorKind, ReaderError},
    escape_buffer::{
        REPLACEMENT, UnicodeEscapeBuffer, combine_surrogates, is_high_surrogate,
        is_low_surrogate, unit_to_char,
    },
    options::DateParseHandling,
    source::CharSource,
    token::{JsonToken, Value},
};

/// Where the text of the last scanned string lives.
#[derive(Debug, Clone, Copy)]
pub(super) enum Scanned {
    /// No escapes: the text is a slice of the input buffer.
    Buffer(StringRef),
    /// Escapes were decoded into the reader's scratch buffer.
    Scratch,
}

impl<S: CharSource> JsonTokenizer<S> {
    pub(super) fn scanned_text(&self, scanned: Scanned) -> Result<Cow<'_, str>, ReaderError> {
        match scanned {
            Scanned::Buffer(r) => self.resolve_text(&r),
            Scanned::Scratch => Ok(String::from_utf8_lossy(&self.scratch)),
        }
    }

    fn push_char(&mut self, c: char) {
        let mut utf8 = [0u8; 4];
        self.scratch
            .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
    }

    /// Scans a string body up to and including the closing `quote`. The
    /// cursor must be just past the opening quote.
    pub(super) async fn read_string_into_buffer(&mut self, quote: u8) -> Result<Scanned, ReaderError> {
        let start = self.buffer.pos();
        let mut last_write = start;
        let mut escaped = false;
        self.scratch.clear();

        loop {
            let run = self
                .buffer
                .unread()
                .iter()
                .position(|&b| b == quote || matches!(b, b'\\' | b'\r' | b'\n'));
            let Some(run) = run else {
                let rest = self.buffer.unread().len();
                self.buffer.advance(rest);
                if !self.ensure_chars(0, true).await? {
                    return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::String(quote))));
                }
                continue;
            };
            self.buffer.advance(run);

            match self.buffer.peek() {
                Some(b'\\') => {
                    let escape_start = self.buffer.pos();
                    self.buffer.advance(1);
                    let Some((code, width)) = self.char_at(0, true).await? else {
                        return Err(
                            self.error(ErrorKind::UnexpectedEndOfInput(EndSite::String(quote)))
                        );
                    };
                    self.scratch
                        .extend_from_slice(self.buffer.bytes(last_write, escape_start));
                    escaped = true;
                    self.buffer.advance(width);

                    match code {
                        'b' => self.scratch.push(b'\x08'),
                        't' => self.scratch.push(b'\t'),
                        'n' => self.scratch.push(b'\n'),
                        'f' => self.scratch.push(b'\x0C'),
                        'r' => self.scratch.push(b'\r'),
                        '\\' | '"' | '\'' | '/' => self.push_char(code),
                        'u' => self.read_unicode_escape().await?,
                        _ => {
                            return Err(self.error(ErrorKind::InvalidEscapeSequence(format!(
                                "Bad JSON escape sequence: \\{code}."
                            ))));
                        }
                    }
                    last_write = self.buffer.pos();
                }
                Some(b'\r') => self.process_carriage_return(true).await?,
                Some(b'\n') => self.process_line_feed(),
                _ => {
                    let end = self.buffer.pos();
                    self.buffer.advance(1);
                    return Ok(if escaped {
                        self.scratch
                            .extend_from_slice(self.buffer.bytes(last_write, end));
                        Scanned::Scratch
                    } else {
                        Scanned::Buffer(self.buffer.string_ref(start, end))
                    });
                }
            }
        }
    }

    /// Decodes the digits of a `\u` escape, pairing surrogates where possible
    /// and substituting U+FFFD where not.
    async fn read_unicode_escape(&mut self) -> Result<(), ReaderError> {
        let unit = self.parse_unicode().await?;
        if is_low_surrogate(unit) {
            self.push_char(REPLACEMENT);
            return Ok(());
        }
        if !is_high_surrogate(unit) {
            self.push_char(unit_to_char(unit));
            return Ok(());
        }

        let mut high = unit;
        loop {
            let followed_by_escape = self.ensure_chars(1, true).await?
                && self.buffer.peek() == Some(b'\\')
                && self.buffer.peek_at(1) == Some(b'u');
            if !followed_by_escape {
                self.push_char(REPLACEMENT);
                return Ok(());
            }
            self.buffer.advance(2);
            let next = self.parse_unicode().await?;
            if is_low_surrogate(next) {
                self.push_char(combine_surrogates(high, next));
                return Ok(());
            }
            self.push_char(REPLACEMENT);
            if is_high_surrogate(next) {
                high = next;
            } else {
                self.push_char(unit_to_char(next));
                return Ok(());
            }
        }
    }

    /// Reads the four hex digits of a `\u` escape.
    async fn parse_unicode(&mut self) -> Result<u16, ReaderError> {
        if !self.ensure_chars(3, true).await? {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::UnicodeEscape)));
        }
        let start = self.buffer.pos();
        let digits = self.buffer.bytes(start, start + 4);
        match UnicodeEscapeBuffer::decode(digits) {
            Some(unit) => {
                self.buffer.advance(4);
                Ok(unit)
            }
            None => {
                let digits = String::from_utf8_lossy(digits).into_owned();
                Err(self.error(ErrorKind::InvalidEscapeSequence(format!(
                    "Invalid Unicode escape sequence: \\u{digits}."
                ))))
            }
        }
    }

    /// Scans a string value starting at the opening quote under the cursor
    /// and publishes it in the form `request` asks for.
    pub(super) async fn parse_string(&mut self, quote: u8, request: ReadRequest) -> Result<(), ReaderError> {
        self.buffer.advance(1);
        self.buffer.shift_if_needed();
        let scanned = self.read_string_into_buffer(quote).await?;
        self.parse_read_string(quote, scanned, request)
    }

    fn parse_read_string(
        &mut self,
        quote: u8,
        scanned: Scanned,
        request: ReadRequest,
    ) -> Result<(), ReaderError> {
        self.set_post_value_state(true);
        self.quote_char = Some(quote);

        let handling = match request {
            ReadRequest::Bytes => {
                let decoded = bytes_from_text(&self.scanned_text(scanned)?);
                let bytes = decoded.map_err(|msg| self.error(ErrorKind::InvalidBytes(msg)))?;
                return self.set_token(
                    JsonToken::Bytes,
                    Slot::Owned(Value::Bytes(Cow::Owned(bytes))),
                    false,
                );
            }
            ReadRequest::DateTime => DateParseHandling::DateTime,
            ReadRequest::DateTimeOffset => DateParseHandling::DateTimeOffset,
            ReadRequest::Read => self.options.date_parse_handling,
            _ => DateParseHandling::None,
        };

        if handling != DateParseHandling::None {
            let date = parse_date(&self.scanned_text(scanned)?, handling);
            if let Some(date) = date {
                return self.set_token(JsonToken::Date, Slot::Owned(Value::Date(date)), false);
            }
        }

        let value = match scanned {
            Scanned::Buffer(r) => Slot::Text(r),
            Scanned::Scratch => Slot::Owned(Value::String(Cow::Owned(
                String::from_utf8_lossy(&self.scratch).into_owned(),
            ))),
        };
        self.set_token(JsonToken::String, value, false)
    }
}
