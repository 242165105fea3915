//! The shared loop behind the `read_as_*` methods.

use alloc::{borrow::Cow, format, string::String, vec::Vec};

use num_bigint::Sign;

use super::{JsonTokenizer, ReadRequest, Slot, state::ParserState};
use crate::{
    coerce::numbers::{bool_from_text, decimal_from_text, f64_from_text, i32_from_text},
    error::{CharSite, EndSite, ErrorKind, Found, ReaderError},
    literal_buffer::Literal,
    source::CharSource,
    token::{JsonToken, Value},
};

impl<S: CharSource> JsonTokenizer<S> {
    /// Reads the next value for a typed read and leaves it in the value
    /// slot. Comments are skipped. `null`, `]` and end of input leave the
    /// slot empty.
    pub(super) async fn read_typed(&mut self, request: ReadRequest) -> Result<(), ReaderError> {
        if self.state == ParserState::PostValue && self.parse_post_value(true).await? {
            return Ok(());
        }
        match self.state {
            ParserState::Start
            | ParserState::Property
            | ParserState::Array
            | ParserState::ArrayStart
            | ParserState::Constructor
            | ParserState::ConstructorStart => {}
            ParserState::Finished => {
                self.parse_finished(false).await?;
                return Ok(());
            }
            ParserState::Closed => return Ok(()),
            ParserState::Object | ParserState::ObjectStart | ParserState::PostValue => {
                return Err(self.error(ErrorKind::UnexpectedState(self.state)));
            }
        }

        loop {
            let Some(b) = self.buffer.peek() else {
                if !self.ensure_chars(0, false).await? {
                    return self.set_bare(JsonToken::None);
                }
                continue;
            };

            match b {
                b'"' | b'\'' => {
                    self.parse_string(b, request).await?;
                    return self.finish_quoted(request);
                }
                b'n' => return self.handle_null().await,
                b'N' => return self.parse_special(Literal::NaN, request).await,
                b'I' => return self.parse_special(Literal::Infinity, request).await,
                b'-' => {
                    if self.ensure_chars(1, true).await? && self.buffer.peek_at(1) == Some(b'I') {
                        return self.parse_special(Literal::NegativeInfinity, request).await;
                    }
                    return self.parse_typed_number(request).await;
                }
                b'0'..=b'9' | b'.' => return self.parse_typed_number(request).await,
                b't' | b'f' => return self.parse_typed_boolean(b == b't', request).await,
                b'[' if request == ReadRequest::Bytes => {
                    self.buffer.advance(1);
                    self.set_bare(JsonToken::StartArray)?;
                    return self.read_array_into_bytes().await;
                }
                b'/' => self.parse_comment(false).await?,
                b',' => self.process_value_comma()?,
                b']' => {
                    self.buffer.advance(1);
                    if matches!(
                        self.state,
                        ParserState::Array | ParserState::ArrayStart | ParserState::PostValue
                    ) {
                        return self.set_bare(JsonToken::EndArray);
                    }
                    return Err(self.error(ErrorKind::UnexpectedCharacter {
                        site: CharSite::Value,
                        found: Found::Char(']'),
                    }));
                }
                b'\r' => self.process_carriage_return(false).await?,
                b'\n' => self.process_line_feed(),
                _ => {
                    if let Some(width) = self.whitespace_width(false).await? {
                        self.buffer.advance(width);
                        continue;
                    }
                    let (found, width) = self.found_at_cursor().await?;
                    self.buffer.advance(width);
                    return Err(self.error(ErrorKind::UnexpectedCharacter {
                        site: CharSite::Value,
                        found,
                    }));
                }
            }
        }
    }

    /// A `,` in value position is an elided value: it is reported as
    /// `Undefined` and left unconsumed so the next read can resume.
    fn process_value_comma(&mut self) -> Result<(), ReaderError> {
        self.buffer.advance(1);
        if self.state != ParserState::PostValue {
            self.set_bare(JsonToken::Undefined)?;
            let err = self.error(ErrorKind::UnexpectedCharacter {
                site: CharSite::Value,
                found: Found::Char(','),
            });
            self.buffer.set_pos(self.buffer.pos() - 1);
            return Err(err);
        }
        self.set_state_based_on_current();
        Ok(())
    }

    async fn parse_typed_number(&mut self, request: ReadRequest) -> Result<(), ReaderError> {
        match request {
            ReadRequest::Bytes | ReadRequest::DateTime | ReadRequest::DateTimeOffset => {
                let (found, width) = self.found_at_cursor().await?;
                self.buffer.advance(width);
                Err(self.error(ErrorKind::UnexpectedCharacter {
                    site: CharSite::Value,
                    found,
                }))
            }
            ReadRequest::Boolean => {
                self.parse_number(ReadRequest::Read).await?;
                let truthy = match self.value() {
                    Some(Value::Integer(i)) => i != 0,
                    Some(Value::BigInteger(b)) => b.sign() != Sign::NoSign,
                    Some(Value::Float(f)) => f != 0.0,
                    Some(Value::Decimal(d)) => !d.is_zero(),
                    _ => false,
                };
                self.set_token(JsonToken::Boolean, Slot::Owned(Value::Boolean(truthy)), false)
            }
            _ => self.parse_number(request).await,
        }
    }

    async fn parse_typed_boolean(&mut self, value: bool, request: ReadRequest) -> Result<(), ReaderError> {
        if !matches!(request, ReadRequest::Boolean | ReadRequest::String) {
            let (found, width) = self.found_at_cursor().await?;
            self.buffer.advance(width);
            return Err(self.error(ErrorKind::UnexpectedCharacter {
                site: CharSite::Value,
                found,
            }));
        }
        let literal = if value { Literal::True } else { Literal::False };
        if !self.match_value_with_trailing_separator(literal).await? {
            return Err(self.unexpected_at_cursor(CharSite::Value).await);
        }
        let slot = if request == ReadRequest::Boolean {
            Slot::Owned(Value::Boolean(value))
        } else {
            Slot::Owned(Value::String(Cow::Borrowed(literal.text())))
        };
        let token = if request == ReadRequest::Boolean {
            JsonToken::Boolean
        } else {
            JsonToken::String
        };
        self.set_token(token, slot, true)
    }

    /// Converts a quoted string for the numeric and boolean reads.
    fn finish_quoted(&mut self, request: ReadRequest) -> Result<(), ReaderError> {
        let target = match request {
            ReadRequest::Int32 => "integer",
            ReadRequest::Decimal => "decimal",
            ReadRequest::Double => "double",
            ReadRequest::Boolean => "boolean",
            _ => return Ok(()),
        };
        let text: String = self
            .value()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        if text.is_empty() {
            return self.set_token(JsonToken::Null, Slot::Empty, false);
        }

        let converted = match request {
            ReadRequest::Int32 => {
                i32_from_text(&text).map(|v| (JsonToken::Integer, Value::Integer(v.into())))
            }
            ReadRequest::Decimal => {
                decimal_from_text(&text).map(|v| (JsonToken::Float, Value::Decimal(v)))
            }
            ReadRequest::Double => f64_from_text(&text).map(|v| (JsonToken::Float, Value::Float(v))),
            _ => bool_from_text(&text).map(|v| (JsonToken::Boolean, Value::Boolean(v))),
        };
        match converted {
            Some((token, value)) => self.set_token(token, Slot::Owned(value), false),
            None => Err(self.error(ErrorKind::NumberFormat(format!(
                "Could not convert string to {target}: {text}."
            )))),
        }
    }

    /// Collects `[1, 2, 3]` into bytes. The `[` has already been published.
    async fn read_array_into_bytes(&mut self) -> Result<(), ReaderError> {
        let mut bytes = Vec::new();
        loop {
            self.value = Slot::Empty;
            if !self.read_core().await? {
                self.set_bare(JsonToken::None)?;
            }
            match self.token {
                JsonToken::None => {
                    return Err(self.error(ErrorKind::UnexpectedEndOfInput(EndSite::Bytes)));
                }
                JsonToken::Integer => match self.value().and_then(|v| match v {
                    Value::Integer(i) => u8::try_from(i).ok(),
                    _ => None,
                }) {
                    Some(b) => bytes.push(b),
                    None => {
                        return Err(self.error(ErrorKind::InvalidBytes(String::from(
                            "Value was either too large or too small for an unsigned byte.",
                        ))));
                    }
                },
                JsonToken::EndArray => {
                    return self.set_token(
                        JsonToken::Bytes,
                        Slot::Owned(Value::Bytes(Cow::Owned(bytes))),
                        false,
                    );
                }
                JsonToken::Comment => {}
                other => return Err(self.error(ErrorKind::UnexpectedToken(other))),
            }
        }
    }
}
