use core::fmt;

use crate::token::JsonToken;

/// Keyword literals recognised by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    True,
    False,
    Null,
    Undefined,
    NaN,
    Infinity,
    NegativeInfinity,
    New,
}

impl Literal {
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Literal::True => "true",
            Literal::False => "false",
            Literal::Null => "null",
            Literal::Undefined => "undefined",
            Literal::NaN => "NaN",
            Literal::Infinity => "Infinity",
            Literal::NegativeInfinity => "-Infinity",
            Literal::New => "new",
        }
    }

    /// Token produced for value literals. `new` and the float specials are
    /// resolved by the caller.
    #[must_use]
    pub(crate) const fn token(self) -> JsonToken {
        match self {
            Literal::True | Literal::False => JsonToken::Boolean,
            Literal::Null => JsonToken::Null,
            Literal::Undefined => JsonToken::Undefined,
            Literal::NaN | Literal::Infinity | Literal::NegativeInfinity => JsonToken::Float,
            Literal::New => JsonToken::StartConstructor,
        }
    }

    pub(crate) const fn float_value(self) -> f64 {
        match self {
            Literal::NaN => f64::NAN,
            Literal::NegativeInfinity => f64::NEG_INFINITY,
            _ => f64::INFINITY,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let what = match self {
            Literal::True | Literal::False => "boolean value",
            Literal::Null => "null value",
            Literal::Undefined => "undefined value",
            Literal::NaN => "NaN value",
            Literal::Infinity => "positive infinity value",
            Literal::NegativeInfinity => "negative infinity value",
            Literal::New => "constructor",
        };
        write!(f, "Error parsing {what}.")
    }
}

/// What happened after feeding one more byte into the literal matcher?
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Step {
    /// Byte matched, but the literal is not finished yet.
    NeedMore,
    /// Byte matched *and* it was the last byte of the literal.
    Done,
    /// Byte did **not** match the expected byte.
    Reject,
}

/// Byte-at-a-time matcher for one [`Literal`].
///
/// `remaining` shrinks as bytes are accepted; a rejected byte leaves the
/// matcher untouched so the caller can report how far the match got.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) struct ExpectedLiteralBuffer {
    remaining: &'static [u8],
}

impl ExpectedLiteralBuffer {
    pub(crate) fn new(literal: Literal) -> Self {
        Self {
            remaining: literal.text().as_bytes(),
        }
    }

    /// Number of bytes still expected.
    pub(crate) fn remaining(&self) -> usize {
        self.remaining.len()
    }

    pub(crate) fn step(&mut self, b: u8) -> Step {
        match self.remaining.split_first() {
            Some((expected, rest)) if *expected == b => {
                self.remaining = rest;
                if rest.is_empty() {
                    Step::Done
                } else {
                    Step::NeedMore
                }
            }
            _ => Step::Reject,
        }
    }
}
