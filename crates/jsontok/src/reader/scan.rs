//! Structural scanning: dispatch on the parser state, whitespace, comments,
//! literals, property names and constructors.

use alloc::{borrow::Cow, string::String, sync::Arc};
use core::str;

use super::{JsonTokenizer, ReadRequest, Slot, state::ParserState};
use crate::{
    error::{CharSite, EndSite, ErrorKind, Found, ReaderError},
    escape_buffer::REPLACEMENT,
    literal_buffer::{ExpectedLiteralBuffer, Literal, Step},
    source::CharSource,
    token::{JsonToken, Value},
};

/// Length of the UTF-8 sequence introduced by `lead`; `1` for bytes that
/// cannot start one.
fn utf8_width(lead: u8) -> usize {
    match lead {
        0xC2..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF4 => 4,
        _ => 1,
    }
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

impl<S: CharSource> JsonTokenizer<S> {
    pub(super) async fn read_core(&mut self) -> Result<bool, ReaderError> {
        loop {
            match self.state {
                ParserState::Start
                | ParserState::Property
                | ParserState::Array
                | ParserState::ArrayStart
                | ParserState::Constructor
                | ParserState::ConstructorStart => return self.parse_value().await,
                ParserState::Object | ParserState::ObjectStart => return self.parse_object().await,
                ParserState::PostValue => {
                    if self.parse_post_value(false).await? {
                        return Ok(true);
                    }
                }
                ParserState::Finished => {
                    let surface = self.options.surface_comments;
                    return self.parse_finished(surface).await;
                }
                ParserState::Closed => return Ok(false),
            }
        }
    }

    /// Decodes the character at `pos + rel`, fetching continuation bytes as
    /// needed. Malformed UTF-8 decodes as U+FFFD one byte at a time.
    pub(super) async fn char_at(
        &mut self,
        rel: usize,
        append: bool,
    ) -> Result<Option<(char, usize)>, ReaderError> {
        if !self.ensure_chars(rel, append).await? {
            return Ok(None);
        }
        let Some(lead) = self.buffer.peek_at(rel) else {
            return Ok(None);
        };
        if lead.is_ascii() {
            return Ok(Some((char::from(lead), 1)));
        }

        let width = utf8_width(lead);
        if width > 1 && self.ensure_chars(rel + width - 1, append).await? {
            let start = self.buffer.pos() + rel;
            if let Some(c) = str::from_utf8(self.buffer.bytes(start, start + width))
                .ok()
                .and_then(|s| s.chars().next())
            {
                return Ok(Some((c, width)));
            }
        }
        Ok(Some((REPLACEMENT, 1)))
    }

    /// The character under the cursor, for error reporting, and its width.
    pub(super) async fn found_at_cursor(&mut self) -> Result<(Found, usize), ReaderError> {
        Ok(match self.char_at(0, true).await? {
            Some((c, width)) => (Found::Char(c), width),
            None => (Found::EndOfInput, 0),
        })
    }

    pub(super) async fn unexpected_at_cursor(&mut self, site: CharSite) -> ReaderError {
        match self.found_at_cursor().await {
            Ok((found, _)) => self.error(ErrorKind::UnexpectedCharacter { site, found }),
            Err(e) => e,
        }
    }

    /// Width of the whitespace character under the cursor, if it is one.
    pub(super) async fn whitespace_width(
        &mut self,
        append: bool,
    ) -> Result<Option<usize>, ReaderError> {
        match self.buffer.peek() {
            None => Ok(None),
            Some(b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C) => Ok(Some(1)),
            Some(b) if b.is_ascii() => Ok(None),
            Some(_) => Ok(self
                .char_at(0, append)
                .await?
                .filter(|(c, _)| c.is_whitespace())
                .map(|(_, width)| width)),
        }
    }

    /// Consumes a CR and an LF directly after it as one newline.
    pub(super) async fn process_carriage_return(&mut self, append: bool) -> Result<(), ReaderError> {
        self.buffer.advance(1);
        if self.ensure_chars(0, append).await? && self.buffer.peek() == Some(b'\n') {
            self.buffer.advance(1);
        }
        self.lines.new_line(self.buffer.global_pos());
        Ok(())
    }

    pub(super) fn process_line_feed(&mut self) {
        self.buffer.advance(1);
        self.lines.new_line(self.buffer.global_pos());
    }

    pub(super) async fn eat_whitespace(&mut self) -> Result<(), ReaderError> {
        loop {
            match self.buffer.peek() {
                None => {
                    if !self.ensure_chars(0, false).await? {
                        return Ok(());
                    }
                }
                Some(b'\r') => self.process_carriage_return(false).await?,
                Some(b'\n') => self.process_line_feed(),
                Some(_) => match self.whitespace_width(false).await? {
                    Some(width) => self.buffer.advance(width),
                    None => return Ok(()),
                },
            }
        }
    }

    async fn parse_value(&mut self) -> Result<bool, ReaderError> {
        loop {
            let Some(b) = self.buffer.peek() else {
                if !self.ensure_chars(0, false).await? {
                    self.set_bare(JsonToken::None)?;
                    return Ok(false);
                }
                continue;
            };

            match b {
                b'"' | b'\'' => {
                    self.parse_string(b, ReadRequest::Read).await?;
                    return Ok(true);
                }
                b't' => {
                    self.parse_literal(Literal::True).await?;
                    return Ok(true);
                }
                b'f' => {
                    self.parse_literal(Literal::False).await?;
                    return Ok(true);
                }
                b'n' => {
                    if !self.ensure_chars(1, true).await? {
                        self.buffer.advance(1);
                        return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Value)));
                    }
                    match self.buffer.peek_at(1) {
                        Some(b'u') => self.parse_literal(Literal::Null).await?,
                        Some(b'e') => self.parse_constructor().await?,
                        _ => {
                            return Err(self.error(ErrorKind::UnexpectedCharacter {
                                site: CharSite::Value,
                                found: Found::Char('n'),
                            }));
                        }
                    }
                    return Ok(true);
                }
                b'N' => {
                    self.parse_special(Literal::NaN, ReadRequest::Read).await?;
                    return Ok(true);
                }
                b'I' => {
                    self.parse_special(Literal::Infinity, ReadRequest::Read).await?;
                    return Ok(true);
                }
                b'-' => {
                    if self.ensure_chars(1, true).await? && self.buffer.peek_at(1) == Some(b'I') {
                        self.parse_special(Literal::NegativeInfinity, ReadRequest::Read)
                            .await?;
                    } else {
                        self.parse_number(ReadRequest::Read).await?;
                    }
                    return Ok(true);
                }
                b'0'..=b'9' | b'.' => {
                    self.parse_number(ReadRequest::Read).await?;
                    return Ok(true);
                }
                b'u' => {
                    self.parse_literal(Literal::Undefined).await?;
                    return Ok(true);
                }
                b'/' => {
                    let surface = self.options.surface_comments;
                    self.parse_comment(surface).await?;
                    if surface {
                        return Ok(true);
                    }
                }
                b'{' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::StartObject)?;
                    return Ok(true);
                }
                b'[' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::StartArray)?;
                    return Ok(true);
                }
                b']' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndArray)?;
                    return Ok(true);
                }
                b')' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndConstructor)?;
                    return Ok(true);
                }
                // An elided value such as the middle of `[1,,2]`; the comma
                // is left for the post-value scan.
                b',' => {
                    self.set_bare(JsonToken::Undefined)?;
                    return Ok(true);
                }
                b'\r' => self.process_carriage_return(false).await?,
                b'\n' => self.process_line_feed(),
                _ => {
                    if let Some(width) = self.whitespace_width(false).await? {
                        self.buffer.advance(width);
                        continue;
                    }
                    if let Some((c, _)) = self.char_at(0, true).await? {
                        if c.is_numeric() {
                            self.parse_number(ReadRequest::Read).await?;
                            return Ok(true);
                        }
                    }
                    return Err(self.unexpected_at_cursor(CharSite::Value).await);
                }
            }
        }
    }

    async fn parse_object(&mut self) -> Result<bool, ReaderError> {
        loop {
            let Some(b) = self.buffer.peek() else {
                if !self.ensure_chars(0, false).await? {
                    self.set_bare(JsonToken::None)?;
                    return Ok(false);
                }
                continue;
            };

            match b {
                b'}' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndObject)?;
                    return Ok(true);
                }
                b'/' => {
                    let surface = self.options.surface_comments;
                    self.parse_comment(surface).await?;
                    if surface {
                        return Ok(true);
                    }
                }
                b'\r' => self.process_carriage_return(false).await?,
                b'\n' => self.process_line_feed(),
                _ => {
                    if let Some(width) = self.whitespace_width(false).await? {
                        self.buffer.advance(width);
                        continue;
                    }
                    self.parse_property().await?;
                    return Ok(true);
                }
            }
        }
    }

    async fn parse_property(&mut self) -> Result<(), ReaderError> {
        let quote = match self.buffer.peek() {
            Some(q @ (b'"' | b'\'')) => Some(q),
            _ => None,
        };

        let name: Arc<str> = if let Some(quote) = quote {
            self.buffer.advance(1);
            self.buffer.shift_if_needed();
            let scanned = self.read_string_into_buffer(quote).await?;
            self.intern(&self.scanned_text(scanned)?)
        } else {
            match self.char_at(0, true).await? {
                Some((c, _)) if is_identifier_char(c) => {}
                _ => return Err(self.unexpected_at_cursor(CharSite::PropertyStart).await),
            }
            self.buffer.shift_if_needed();
            let name = self.parse_unquoted_property().await?;
            self.intern(&self.resolve_text(&name)?)
        };

        self.eat_whitespace().await?;
        if self.buffer.peek() != Some(b':') {
            return Err(self.unexpected_at_cursor(CharSite::PropertyColon).await);
        }
        self.buffer.advance(1);

        self.set_token(JsonToken::PropertyName, Slot::Name(name), true)?;
        self.quote_char = quote;
        Ok(())
    }

    fn intern(&self, name: &str) -> Arc<str> {
        self.options
            .name_table
            .as_ref()
            .and_then(|table| table.get(name))
            .unwrap_or_else(|| Arc::from(name))
    }

    async fn parse_unquoted_property(&mut self) -> Result<crate::buffer::StringRef, ReaderError> {
        let start = self.buffer.pos();
        loop {
            let Some((c, width)) = self.char_at(0, true).await? else {
                return Err(self.error(ErrorKind::UnexpectedEndOfInput(
                    EndSite::UnquotedProperty,
                )));
            };
            if is_identifier_char(c) {
                self.buffer.advance(width);
            } else if c.is_whitespace() || c == ':' {
                return Ok(self.buffer.string_ref(start, self.buffer.pos()));
            } else {
                return Err(self.error(ErrorKind::UnexpectedCharacter {
                    site: CharSite::UnquotedProperty,
                    found: Found::Char(c),
                }));
            }
        }
    }

    /// Scans what follows a completed value. Returns `true` when a token was
    /// produced and `false` when only the state changed.
    pub(super) async fn parse_post_value(&mut self, ignore_comments: bool) -> Result<bool, ReaderError> {
        loop {
            let Some(b) = self.buffer.peek() else {
                if !self.ensure_chars(0, false).await? {
                    self.state = ParserState::Finished;
                    return Ok(false);
                }
                continue;
            };

            match b {
                b'}' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndObject)?;
                    return Ok(true);
                }
                b']' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndArray)?;
                    return Ok(true);
                }
                b')' => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::EndConstructor)?;
                    return Ok(true);
                }
                b'/' => {
                    let surface = !ignore_comments && self.options.surface_comments;
                    self.parse_comment(surface).await?;
                    if surface {
                        return Ok(true);
                    }
                }
                b',' => {
                    self.buffer.advance(1);
                    self.set_state_based_on_current();
                    return Ok(false);
                }
                b'\r' => self.process_carriage_return(false).await?,
                b'\n' => self.process_line_feed(),
                _ => {
                    if let Some(width) = self.whitespace_width(false).await? {
                        self.buffer.advance(width);
                    } else if self.options.allow_multiple_values && self.stack.is_empty() {
                        self.set_state_based_on_current();
                        return Ok(false);
                    } else {
                        return Err(self.unexpected_at_cursor(CharSite::AfterValue).await);
                    }
                }
            }
        }
    }

    /// Checks that only whitespace and comments follow the finished value.
    pub(super) async fn parse_finished(&mut self, surface_comments: bool) -> Result<bool, ReaderError> {
        loop {
            self.eat_whitespace().await?;
            match self.buffer.peek() {
                None => {
                    self.set_bare(JsonToken::None)?;
                    return Ok(false);
                }
                Some(b'/') => {
                    self.parse_comment(surface_comments).await?;
                    if surface_comments {
                        return Ok(true);
                    }
                }
                Some(_) => return Err(self.unexpected_at_cursor(CharSite::AfterContent).await),
            }
        }
    }

    /// Scans a comment starting at the `/` under the cursor and, if
    /// `set_token` is set, publishes it with surrounding whitespace trimmed.
    pub(super) async fn parse_comment(&mut self, set_token: bool) -> Result<(), ReaderError> {
        self.buffer.advance(1);
        if !self.ensure_chars(0, false).await? {
            return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Comment)));
        }
        let single_line = match self.buffer.peek() {
            Some(b'*') => false,
            Some(b'/') => true,
            _ => return Err(self.unexpected_at_cursor(CharSite::Comment).await),
        };
        self.buffer.advance(1);

        let start = self.buffer.pos();
        let end = loop {
            let Some(b) = self.buffer.peek() else {
                if self.ensure_chars(0, true).await? {
                    continue;
                }
                if !single_line {
                    return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Comment)));
                }
                break self.buffer.pos();
            };
            match b {
                b'*' if !single_line => {
                    self.buffer.advance(1);
                    if self.ensure_chars(0, true).await? && self.buffer.peek() == Some(b'/') {
                        let end = self.buffer.pos() - 1;
                        self.buffer.advance(1);
                        break end;
                    }
                }
                b'\r' | b'\n' if single_line => break self.buffer.pos(),
                b'\r' => self.process_carriage_return(true).await?,
                b'\n' => self.process_line_feed(),
                _ => self.buffer.advance(1),
            }
        };

        if set_token {
            let raw = self.buffer.bytes(start, end);
            let lead = raw.len() - raw.trim_ascii_start().len();
            let len = raw.trim_ascii().len();
            let text = self.buffer.string_ref(start + lead, start + lead + len);
            self.set_token(JsonToken::Comment, Slot::Text(text), true)?;
        }
        Ok(())
    }

    /// Matches `literal` at the cursor. A mismatch leaves the cursor on the
    /// first byte that differed.
    async fn match_value(&mut self, literal: Literal) -> Result<bool, ReaderError> {
        let mut expected = ExpectedLiteralBuffer::new(literal);
        if !self.ensure_chars(expected.remaining() - 1, true).await? {
            self.buffer.set_pos(self.buffer.used());
            return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Value)));
        }
        let mut offset = 0;
        loop {
            let b = self.buffer.peek_at(offset).unwrap_or_default();
            match expected.step(b) {
                Step::NeedMore => offset += 1,
                Step::Done => {
                    self.buffer.advance(offset + 1);
                    return Ok(true);
                }
                Step::Reject => {
                    self.buffer.advance(offset);
                    return Ok(false);
                }
            }
        }
    }

    pub(super) async fn match_value_with_trailing_separator(
        &mut self,
        literal: Literal,
    ) -> Result<bool, ReaderError> {
        if !self.match_value(literal).await? {
            return Ok(false);
        }
        if !self.ensure_chars(0, false).await? {
            return Ok(true);
        }
        self.is_separator().await
    }

    async fn is_separator(&mut self) -> Result<bool, ReaderError> {
        let Some(b) = self.buffer.peek() else {
            return Ok(true);
        };
        Ok(match b {
            b'}' | b']' | b',' => true,
            b'/' => {
                self.ensure_chars(1, false).await?
                    && matches!(self.buffer.peek_at(1), Some(b'*' | b'/'))
            }
            b')' => matches!(
                self.state,
                ParserState::Constructor | ParserState::ConstructorStart
            ),
            _ => self.whitespace_width(false).await?.is_some(),
        })
    }

    pub(super) async fn parse_literal(&mut self, literal: Literal) -> Result<(), ReaderError> {
        if !self.match_value_with_trailing_separator(literal).await? {
            return Err(self.error(ErrorKind::InvalidLiteral(literal)));
        }
        let value = match literal {
            Literal::True => Slot::Owned(Value::Boolean(true)),
            Literal::False => Slot::Owned(Value::Boolean(false)),
            _ => Slot::Empty,
        };
        self.set_token(literal.token(), value, true)
    }

    async fn parse_constructor(&mut self) -> Result<(), ReaderError> {
        if !self.match_value_with_trailing_separator(Literal::New).await? {
            return Err(self.error(ErrorKind::InvalidLiteral(Literal::New)));
        }
        self.eat_whitespace().await?;

        let start = self.buffer.pos();
        let end = loop {
            let Some((c, width)) = self.char_at(0, true).await? else {
                return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Constructor)));
            };
            if c.is_alphanumeric() {
                self.buffer.advance(width);
                continue;
            }
            let end = self.buffer.pos();
            match c {
                '(' => {}
                '\r' => self.process_carriage_return(true).await?,
                '\n' => self.process_line_feed(),
                _ if c.is_whitespace() => self.buffer.advance(width),
                _ => {
                    return Err(self.error(ErrorKind::UnexpectedCharacter {
                        site: CharSite::Constructor,
                        found: Found::Char(c),
                    }));
                }
            }
            break end;
        };
        let name = String::from_utf8_lossy(self.buffer.bytes(start, end)).into_owned();

        self.eat_whitespace().await?;
        if self.buffer.peek() != Some(b'(') {
            return Err(self.unexpected_at_cursor(CharSite::Constructor).await);
        }
        self.buffer.advance(1);
        self.set_token(
            JsonToken::StartConstructor,
            Slot::Owned(Value::String(Cow::Owned(name))),
            true,
        )
    }

    /// `n` in a typed read: either `null` or an error.
    pub(super) async fn handle_null(&mut self) -> Result<(), ReaderError> {
        if !self.ensure_chars(1, true).await? {
            self.buffer.set_pos(self.buffer.used());
            return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Value)));
        }
        if self.buffer.peek_at(1) == Some(b'u') {
            return self.parse_literal(Literal::Null).await;
        }
        let (c, width) = self.char_at(1, true).await?.unwrap_or((REPLACEMENT, 1));
        self.buffer.advance(1 + width);
        Err(self.error(ErrorKind::UnexpectedCharacter {
            site: CharSite::Value,
            found: Found::Char(c),
        }))
    }
}
