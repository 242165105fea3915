//! The tokenizer.
//!
//! All scanning is written once as `async fn`s over a [`CharSource`]. The only
//! await point is [`JsonTokenizer::read_data`], which asks the source for
//! more bytes. The blocking API drives those futures with
//! [`pollster::block_on`] and is only offered for [`BlockingSource`]s, whose
//! futures never pend.

mod numbers;
mod scan;
mod state;
mod strings;
mod typed;

use alloc::{borrow::Cow, string::String, sync::Arc, vec::Vec};
use core::fmt;
use std::io;

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use tracing::{debug, trace};

pub use self::state::{ContainerKind, ParserState};
use self::state::Frame;
use crate::{
    buffer::{CharBuffer, StringRef},
    error::{ErrorKind, ReaderError},
    line_tracker::LineTracker,
    options::ReaderOptions,
    source::{BlockingSource, CancellationToken, CharSource, IoSource},
    token::{DateRead, JsonDate, JsonToken, Value},
};

/// Requested conversion for the value being read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadRequest {
    Read,
    Int32,
    Decimal,
    Double,
    String,
    Boolean,
    Bytes,
    DateTime,
    DateTimeOffset,
}

/// Storage behind [`JsonTokenizer::value`].
#[derive(Debug, Clone, Default)]
pub(crate) enum Slot {
    #[default]
    Empty,
    /// Unescaped text still sitting in the buffer.
    Text(StringRef),
    Name(Arc<str>),
    Owned(Value<'static>),
}

/// A pull-based JSON tokenizer over a [`CharSource`].
///
/// Each call to [`read`](Self::read) advances by one token. The token kind is
/// available through [`token_type`](Self::token_type) and its payload through
/// [`value`](Self::value). The typed `read_as_*` methods additionally coerce
/// the value and skip comments.
///
/// ```rust
/// use jsontok::{JsonToken, JsonTokenizer};
///
/// let mut reader = JsonTokenizer::from_text(r#"{"a": [1, true]}"#);
/// let mut tokens = Vec::new();
/// while reader.read().unwrap() {
///     tokens.push(reader.token_type());
/// }
/// assert_eq!(
///     tokens,
///     [
///         JsonToken::StartObject,
///         JsonToken::PropertyName,
///         JsonToken::StartArray,
///         JsonToken::Integer,
///         JsonToken::Boolean,
///         JsonToken::EndArray,
///         JsonToken::EndObject,
///     ]
/// );
/// ```
pub struct JsonTokenizer<S> {
    source: S,
    options: ReaderOptions,
    buffer: CharBuffer,
    lines: LineTracker,
    state: ParserState,
    token: JsonToken,
    value: Slot,
    quote_char: Option<u8>,
    stack: Vec<Frame>,
    /// Decoded text of a string that contained escapes.
    scratch: Vec<u8>,
    cancel: Option<CancellationToken>,
}

impl<S> fmt::Debug for JsonTokenizer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonTokenizer")
            .field("state", &self.state)
            .field("token", &self.token)
            .field("path", &self.path())
            .field("line", &self.lines.line())
            .field("buffer", &self.buffer)
            .finish_non_exhaustive()
    }
}

impl<S: CharSource> JsonTokenizer<S> {
    pub fn new(source: S) -> Self {
        Self::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(source: S, options: ReaderOptions) -> Self {
        let buffer = CharBuffer::new(options.initial_buffer_size, options.buffer_pool.clone());
        Self {
            source,
            options,
            buffer,
            lines: LineTracker::new(),
            state: ParserState::Start,
            token: JsonToken::None,
            value: Slot::Empty,
            quote_char: None,
            stack: Vec::new(),
            scratch: Vec::new(),
            cancel: None,
        }
    }
}

impl<R: io::Read> JsonTokenizer<IoSource<R>> {
    pub fn from_reader(reader: R) -> Self {
        Self::new(IoSource::new(reader))
    }

    pub fn from_reader_with_options(reader: R, options: ReaderOptions) -> Self {
        Self::with_options(IoSource::new(reader), options)
    }
}

impl<'a> JsonTokenizer<IoSource<&'a [u8]>> {
    pub fn from_text(text: &'a str) -> Self {
        Self::from_reader(text.as_bytes())
    }

    pub fn from_text_with_options(text: &'a str, options: ReaderOptions) -> Self {
        Self::from_reader_with_options(text.as_bytes(), options)
    }
}

#[cfg(feature = "tokio")]
impl<R: tokio::io::AsyncRead + Unpin> JsonTokenizer<crate::source::AsyncIoSource<R>> {
    pub fn from_async_reader(reader: R) -> Self {
        Self::new(crate::source::AsyncIoSource::new(reader))
    }

    pub fn from_async_reader_with_options(reader: R, options: ReaderOptions) -> Self {
        Self::with_options(crate::source::AsyncIoSource::new(reader), options)
    }
}

impl<S> JsonTokenizer<S> {
    pub fn token_type(&self) -> JsonToken {
        self.token
    }

    /// Payload of the current token, borrowed from the reader.
    ///
    /// Strings without escapes are returned as [`Cow::Borrowed`] straight from
    /// the input buffer.
    pub fn value(&self) -> Option<Value<'_>> {
        match &self.value {
            Slot::Empty => None,
            Slot::Text(r) => self.buffer.text(r).map(Value::String),
            Slot::Name(name) => Some(Value::String(Cow::Borrowed(name))),
            Slot::Owned(value) => Some(value.as_borrowed()),
        }
    }

    /// Whether `text` is a view into the reader's own buffer.
    #[cfg(test)]
    pub(crate) fn is_buffered(&self, text: &str) -> bool {
        self.buffer.holds(text.as_ptr())
    }

    /// Quote character of the most recent string or property name; `None`
    /// for unquoted property names.
    pub fn quote_char(&self) -> Option<char> {
        self.quote_char.map(char::from)
    }

    pub fn line_number(&self) -> usize {
        self.lines.line()
    }

    /// Byte offset of the cursor from the start of the current line.
    pub fn line_position(&self) -> usize {
        self.lines.position(self.buffer.global_pos())
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }
}

impl<S: CharSource> JsonTokenizer<S> {
    /// Releases the buffer and, when `close_input` is set, the source.
    /// Calling it again has no effect.
    pub fn close(&mut self) {
        if self.state == ParserState::Closed {
            return;
        }
        debug!(line = self.lines.line(), "closing reader");
        self.state = ParserState::Closed;
        self.token = JsonToken::None;
        self.value = Slot::Empty;
        self.stack.clear();
        self.buffer.release();
        if self.options.close_input {
            self.source.close();
        }
    }

    /// Consumes the reader and returns its source.
    pub fn into_inner(self) -> S {
        let Self { source, .. } = self;
        source
    }

    /// Fetches more input. Returns the number of bytes read; `0` at end of
    /// input.
    async fn read_data(&mut self, append: bool, required: usize) -> Result<usize, ReaderError> {
        if self.buffer.is_end_of_input() {
            return Ok(0);
        }
        if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
            return Err(self.error(ErrorKind::Cancelled));
        }

        self.buffer.make_room(required, append);
        let result = self.source.fill(self.buffer.spare_mut()).await;
        // A failed fetch leaves the stream open; the next read fetches again.
        let read = result.map_err(|e| self.error(ErrorKind::Io(e)))?;
        self.buffer.commit(read);
        trace!(read, used = self.buffer.used(), "fetched input");
        Ok(read)
    }

    /// Makes sure the byte at `pos + rel` is buffered.
    async fn ensure_chars(&mut self, rel: usize, append: bool) -> Result<bool, ReaderError> {
        while !self.buffer.has(rel) {
            let required = self.buffer.pos() + rel + 1 - self.buffer.used();
            if self.read_data(append, required).await? == 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Resolves a view taken during the current read.
    fn resolve_text(&self, r: &StringRef) -> Result<Cow<'_, str>, ReaderError> {
        self.buffer.text(r).ok_or_else(|| {
            self.error(ErrorKind::InternalInvariantViolation(String::from(
                "string view used after the buffer was compacted",
            )))
        })
    }

    fn set_cancel(&mut self, cancel: Option<&CancellationToken>) {
        self.cancel = cancel.cloned();
    }

    async fn read_inner(&mut self) -> Result<bool, ReaderError> {
        self.clear_value();
        self.read_core().await
    }

    fn clear_value(&mut self) {
        self.value = Slot::Empty;
    }

    /// Runs a typed read and hands back an owned copy of its value.
    async fn read_as(&mut self, request: ReadRequest) -> Result<Option<Value<'static>>, ReaderError> {
        self.clear_value();
        self.read_typed(request).await?;
        Ok(self.value().map(Value::into_owned))
    }
}

impl<S: BlockingSource> JsonTokenizer<S> {
    /// Advances to the next token. Returns `false` once the input is
    /// exhausted.
    pub fn read(&mut self) -> Result<bool, ReaderError> {
        self.set_cancel(None);
        pollster::block_on(self.read_inner())
    }
}

impl<S: CharSource> JsonTokenizer<S> {
    pub async fn read_async(&mut self, cancel: &CancellationToken) -> Result<bool, ReaderError> {
        self.set_cancel(Some(cancel));
        let result = self.read_inner().await;
        self.cancel = None;
        result
    }
}

fn as_i32(value: Value<'_>) -> Option<i32> {
    match value {
        Value::Integer(i) => i32::try_from(i).ok(),
        _ => None,
    }
}

fn as_decimal(value: Value<'_>) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(d),
        _ => None,
    }
}

fn as_f64(value: Value<'_>) -> Option<f64> {
    match value {
        Value::Float(f) => Some(f),
        _ => None,
    }
}

fn as_bool(value: Value<'_>) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(b),
        _ => None,
    }
}

fn as_string(value: Value<'_>) -> Option<String> {
    match value {
        Value::String(s) => Some(s.into_owned()),
        _ => None,
    }
}

fn as_bytes(value: Value<'_>) -> Option<Vec<u8>> {
    match value {
        Value::Bytes(b) => Some(b.into_owned()),
        _ => None,
    }
}

fn as_date(value: Value<'_>) -> Option<DateRead<JsonDate>> {
    match value {
        Value::Date(date) => Some(DateRead::Parsed(date)),
        Value::String(s) => Some(DateRead::Raw(s.into_owned())),
        _ => None,
    }
}

fn as_date_offset(value: Value<'_>) -> Option<DateRead<DateTime<FixedOffset>>> {
    match value {
        Value::Date(JsonDate::Offset(date)) => Some(DateRead::Parsed(date)),
        Value::String(s) => Some(DateRead::Raw(s.into_owned())),
        _ => None,
    }
}

/// Generates the blocking and async forms of a typed read.
macro_rules! typed_read {
    ($(#[$doc:meta])* $name:ident, $name_async:ident, $request:expr, $ty:ty, $convert:path) => {
        impl<S: BlockingSource> JsonTokenizer<S> {
            $(#[$doc])*
            pub fn $name(&mut self) -> Result<Option<$ty>, ReaderError> {
                self.set_cancel(None);
                pollster::block_on(self.read_as($request)).map(|v| v.and_then($convert))
            }
        }

        impl<S: CharSource> JsonTokenizer<S> {
            $(#[$doc])*
            pub async fn $name_async(
                &mut self,
                cancel: &CancellationToken,
            ) -> Result<Option<$ty>, ReaderError> {
                self.set_cancel(Some(cancel));
                let result = self.read_as($request).await;
                self.cancel = None;
                result.map(|v| v.and_then($convert))
            }
        }
    };
}

typed_read!(
    /// Reads the next value as an `i32`. `None` means `null`, the end of the
    /// enclosing array, or the end of input.
    read_as_int32,
    read_as_int32_async,
    ReadRequest::Int32,
    i32,
    as_i32
);
typed_read!(
    read_as_decimal,
    read_as_decimal_async,
    ReadRequest::Decimal,
    Decimal,
    as_decimal
);
typed_read!(
    read_as_double,
    read_as_double_async,
    ReadRequest::Double,
    f64,
    as_f64
);
typed_read!(
    /// Reads `true`/`false`, a number (nonzero is `true`) or a quoted boolean.
    read_as_boolean,
    read_as_boolean_async,
    ReadRequest::Boolean,
    bool,
    as_bool
);
typed_read!(
    /// Reads any scalar as text. Numbers are validated and returned as
    /// written.
    read_as_string,
    read_as_string_async,
    ReadRequest::String,
    String,
    as_string
);
typed_read!(
    /// Reads a Base64 string, a GUID string or an array of byte values.
    read_as_bytes,
    read_as_bytes_async,
    ReadRequest::Bytes,
    Vec<u8>,
    as_bytes
);
typed_read!(
    /// Reads a date. Text that is not a date comes back as
    /// [`DateRead::Raw`] and leaves the reader on a `String` token.
    read_as_date_time,
    read_as_date_time_async,
    ReadRequest::DateTime,
    DateRead<JsonDate>,
    as_date
);
typed_read!(
    read_as_date_time_offset,
    read_as_date_time_offset_async,
    ReadRequest::DateTimeOffset,
    DateRead<DateTime<FixedOffset>>,
    as_date_offset
);
