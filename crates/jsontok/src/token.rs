use alloc::{borrow::Cow, string::String, vec::Vec};
use core::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use num_bigint::BigInt;
use rust_decimal::Decimal;

/// The kind of lexical token the reader is positioned on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JsonToken {
    /// No token has been read, or the input is exhausted.
    #[default]
    None,
    StartObject,
    EndObject,
    StartArray,
    EndArray,
    /// `new Name(`; the value is the constructor name.
    StartConstructor,
    EndConstructor,
    PropertyName,
    String,
    Integer,
    Float,
    Boolean,
    Null,
    /// `undefined`, or an elided array element such as the middle of `[1,,2]`.
    Undefined,
    Date,
    Bytes,
    Comment,
}

impl JsonToken {
    #[must_use]
    pub fn is_start(self) -> bool {
        matches!(
            self,
            JsonToken::StartObject | JsonToken::StartArray | JsonToken::StartConstructor
        )
    }

    #[must_use]
    pub fn is_end(self) -> bool {
        matches!(
            self,
            JsonToken::EndObject | JsonToken::EndArray | JsonToken::EndConstructor
        )
    }

    /// Scalar tokens that complete a value in their enclosing container.
    #[must_use]
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            JsonToken::String
                | JsonToken::Integer
                | JsonToken::Float
                | JsonToken::Boolean
                | JsonToken::Null
                | JsonToken::Undefined
                | JsonToken::Date
                | JsonToken::Bytes
        )
    }
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A date produced by date coercion.
///
/// Which variant is produced depends on the configured
/// [`DateParseHandling`](crate::DateParseHandling) and on whether the text
/// carried a zone designator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonDate {
    /// No zone designator was present.
    Unspecified(NaiveDateTime),
    /// A zone was present and the instant was normalized to UTC.
    Utc(DateTime<Utc>),
    /// The instant together with the offset it was written in.
    Offset(DateTime<FixedOffset>),
}

/// The value carried by the current token.
///
/// String-like payloads borrow from the reader where possible: a string that
/// contained no escapes is handed out straight from the input buffer without
/// copying.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    String(Cow<'a, str>),
    Integer(i64),
    /// An integer literal too large for `i64`, produced only when
    /// `arbitrary_precision_integers` is enabled.
    BigInteger(Cow<'a, BigInt>),
    Float(f64),
    Decimal(Decimal),
    Boolean(bool),
    Date(JsonDate),
    Bytes(Cow<'a, [u8]>),
}

impl Value<'_> {
    /// Detaches the value from the reader's buffer.
    #[must_use]
    pub fn into_owned(self) -> Value<'static> {
        match self {
            Value::String(s) => Value::String(Cow::Owned(s.into_owned())),
            Value::BigInteger(b) => Value::BigInteger(Cow::Owned(b.into_owned())),
            Value::Bytes(b) => Value::Bytes(Cow::Owned(b.into_owned())),
            Value::Integer(i) => Value::Integer(i),
            Value::Float(f) => Value::Float(f),
            Value::Decimal(d) => Value::Decimal(d),
            Value::Boolean(b) => Value::Boolean(b),
            Value::Date(d) => Value::Date(d),
        }
    }

    /// Reborrows an owned value without cloning its heap data.
    #[must_use]
    pub fn as_borrowed(&self) -> Value<'_> {
        match self {
            Value::String(s) => Value::String(Cow::Borrowed(s.as_ref())),
            Value::BigInteger(b) => Value::BigInteger(Cow::Borrowed(b.as_ref())),
            Value::Bytes(b) => Value::Bytes(Cow::Borrowed(b.as_ref())),
            Value::Integer(i) => Value::Integer(*i),
            Value::Float(f) => Value::Float(*f),
            Value::Decimal(d) => Value::Decimal(*d),
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Date(d) => Value::Date(*d),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&'static str> for Value<'static> {
    fn from(value: &'static str) -> Self {
        Value::String(Cow::Borrowed(value))
    }
}

impl From<String> for Value<'static> {
    fn from(value: String) -> Self {
        Value::String(Cow::Owned(value))
    }
}

impl From<i64> for Value<'static> {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value<'static> {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<bool> for Value<'static> {
    fn from(value: bool) -> Self {
        Value::Boolean(value)
    }
}

impl From<Vec<u8>> for Value<'static> {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(Cow::Owned(value))
    }
}

/// Result of a lenient date read.
///
/// Text that does not parse as a date is not an error: the raw string is
/// returned instead and the reader is left on a `String` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateRead<T> {
    Parsed(T),
    Raw(String),
}

impl<T> DateRead<T> {
    #[must_use]
    pub fn parsed(self) -> Option<T> {
        match self {
            DateRead::Parsed(v) => Some(v),
            DateRead::Raw(_) => None,
        }
    }
}
