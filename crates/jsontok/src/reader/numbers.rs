//! Number scanning and classification, plus the `NaN`/`Infinity` literals.

use alloc::{borrow::Cow, format, string::String};

use rust_decimal::Decimal;

use super::{JsonTokenizer, ReadRequest, Slot};
use crate::{
    buffer::StringRef,
    coerce::numbers::{
        IntParse, MAX_BIG_INTEGER_LEN, parse_big, parse_decimal, parse_f64_invariant, parse_i32,
        parse_i64, parse_radix_i32, parse_radix_i64,
    },
    error::{ErrorKind, ReaderError},
    literal_buffer::Literal,
    options::{FloatParseHandling, ReaderOptions},
    source::CharSource,
    token::{JsonToken, Value},
};

fn is_number_byte(b: u8) -> bool {
    matches!(
        b,
        b'0'..=b'9' | b'a'..=b'f' | b'A'..=b'F' | b'x' | b'X' | b'.' | b'-' | b'+'
    )
}

type Classified = Result<(JsonToken, Slot), String>;

fn float_policy(lexeme: &[u8], number: &str, options: &ReaderOptions) -> Classified {
    match options.float_parse_handling {
        FloatParseHandling::Decimal => parse_decimal(lexeme)
            .map(|d| (JsonToken::Float, Slot::Owned(Value::Decimal(d))))
            .ok_or_else(|| format!("Input string '{number}' is not a valid decimal.")),
        FloatParseHandling::Double => parse_f64_invariant(lexeme)
            .map(|f| (JsonToken::Float, Slot::Owned(Value::Float(f))))
            .ok_or_else(|| format!("Input string '{number}' is not a valid number.")),
    }
}

/// Turns a scanned number lexeme into the token `request` asks for.
fn classify(
    lexeme: &[u8],
    text: StringRef,
    request: ReadRequest,
    options: &ReaderOptions,
) -> Classified {
    let first = lexeme.first().copied().unwrap_or_default();
    let single_digit = lexeme.len() == 1 && first.is_ascii_digit();
    let non_base10 =
        first == b'0' && lexeme.len() > 1 && !matches!(lexeme[1], b'.' | b'e' | b'E');
    let number = String::from_utf8_lossy(lexeme);
    let integer = |v: i64| (JsonToken::Integer, Slot::Owned(Value::Integer(v)));

    match request {
        ReadRequest::String => {
            let valid = if non_base10 {
                parse_radix_i64(lexeme).is_some()
            } else {
                parse_f64_invariant(lexeme).is_some()
            };
            if valid {
                Ok((JsonToken::String, Slot::Text(text)))
            } else {
                Err(format!("Input string '{number}' is not a valid number."))
            }
        }
        ReadRequest::Int32 => {
            let invalid = || format!("Input string '{number}' is not a valid integer.");
            let value = if single_digit {
                i32::from(first - b'0')
            } else if non_base10 {
                parse_radix_i32(lexeme).ok_or_else(invalid)?
            } else {
                match parse_i32(lexeme) {
                    IntParse::Value(v) => v,
                    IntParse::Overflow => {
                        return Err(format!(
                            "JSON integer {number} is too large or small for an Int32."
                        ));
                    }
                    IntParse::Invalid => return Err(invalid()),
                }
            };
            Ok(integer(i64::from(value)))
        }
        ReadRequest::Decimal => {
            let value = if single_digit {
                Some(Decimal::from(first - b'0'))
            } else if non_base10 {
                parse_radix_i64(lexeme).map(Decimal::from)
            } else {
                parse_decimal(lexeme)
            };
            value
                .map(|d| (JsonToken::Float, Slot::Owned(Value::Decimal(d))))
                .ok_or_else(|| format!("Input string '{number}' is not a valid decimal."))
        }
        ReadRequest::Double => {
            let value = if single_digit {
                Some(f64::from(first - b'0'))
            } else if non_base10 {
                parse_radix_i64(lexeme).map(|v| v as f64)
            } else {
                parse_f64_invariant(lexeme)
            };
            value
                .map(|f| (JsonToken::Float, Slot::Owned(Value::Float(f))))
                .ok_or_else(|| format!("Input string '{number}' is not a valid double."))
        }
        _ => {
            if single_digit {
                return Ok(integer(i64::from(first - b'0')));
            }
            if non_base10 {
                return parse_radix_i64(lexeme)
                    .map(integer)
                    .ok_or_else(|| format!("Input string '{number}' is not a valid number."));
            }
            match parse_i64(lexeme) {
                IntParse::Value(v) => Ok(integer(v)),
                IntParse::Overflow if options.arbitrary_precision_integers => {
                    if lexeme.len() > MAX_BIG_INTEGER_LEN {
                        return Err(format!("JSON integer {number} is too large to parse."));
                    }
                    parse_big(lexeme)
                        .map(|b| {
                            (
                                JsonToken::Integer,
                                Slot::Owned(Value::BigInteger(Cow::Owned(b))),
                            )
                        })
                        .ok_or_else(|| format!("Input string '{number}' is not a valid number."))
                }
                IntParse::Overflow | IntParse::Invalid => float_policy(lexeme, &number, options),
            }
        }
    }
}

impl<S: CharSource> JsonTokenizer<S> {
    /// Scans the number under the cursor and publishes it.
    ///
    /// The reader moves to the post-value state before the lexeme is
    /// classified, so after a classification error the next read resumes
    /// behind the number.
    pub(super) async fn parse_number(&mut self, request: ReadRequest) -> Result<(), ReaderError> {
        self.buffer.shift_if_needed();
        let start = self.buffer.pos();
        self.read_number_into_buffer().await?;
        self.set_post_value_state(true);

        let end = self.buffer.pos();
        let text = self.buffer.string_ref(start, end);
        let classified = classify(self.buffer.bytes(start, end), text, request, &self.options);
        match classified {
            Ok((token, value)) => self.set_token(token, value, false),
            Err(message) => Err(self.number_error(message)),
        }
    }

    async fn read_number_into_buffer(&mut self) -> Result<(), ReaderError> {
        loop {
            let unread = self.buffer.unread();
            match unread.iter().position(|&b| !is_number_byte(b)) {
                Some(len) => {
                    self.buffer.advance(len);
                    break;
                }
                None => {
                    let len = unread.len();
                    self.buffer.advance(len);
                    if !self.ensure_chars(0, true).await? {
                        return Ok(());
                    }
                }
            }
        }

        match self.buffer.peek() {
            None | Some(b',' | b'}' | b']' | b')' | b'/') => Ok(()),
            Some(_) => {
                if self.whitespace_width(true).await?.is_some() {
                    return Ok(());
                }
                let (found, _) = self.found_at_cursor().await?;
                Err(self.number_error(format!(
                    "Unexpected character encountered while parsing number: {found}."
                )))
            }
        }
    }

    /// Marks the current token as `Undefined` and builds a number error.
    fn number_error(&mut self, message: String) -> ReaderError {
        self.token = JsonToken::Undefined;
        self.value = Slot::Empty;
        self.set_post_value_state(false);
        self.error(ErrorKind::NumberFormat(message))
    }

    /// `NaN`, `Infinity` or `-Infinity` under the cursor.
    pub(super) async fn parse_special(
        &mut self,
        literal: Literal,
        request: ReadRequest,
    ) -> Result<(), ReaderError> {
        if !self.match_value_with_trailing_separator(literal).await? {
            return Err(self.error(ErrorKind::InvalidLiteral(literal)));
        }
        let doubles = self.options.float_parse_handling == FloatParseHandling::Double;
        match request {
            ReadRequest::Read | ReadRequest::Double if doubles => self.set_token(
                JsonToken::Float,
                Slot::Owned(Value::Float(literal.float_value())),
                true,
            ),
            ReadRequest::String => self.set_token(
                JsonToken::String,
                Slot::Owned(Value::String(Cow::Borrowed(literal.text()))),
                true,
            ),
            _ => Err(self.error(ErrorKind::NumberFormat(format!(
                "Cannot read {} value.",
                literal.text()
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_read(text: &str, options: &ReaderOptions) -> Classified {
        let r = crate::buffer::CharBuffer::new(8, None).string_ref(0, 0);
        classify(text.as_bytes(), r, ReadRequest::Read, options)
    }

    fn integer_of(result: Classified) -> Option<i64> {
        match result {
            Ok((JsonToken::Integer, Slot::Owned(Value::Integer(i)))) => Some(i),
            _ => None,
        }
    }

    #[test]
    fn radix_and_single_digits() {
        let options = ReaderOptions::default();
        assert_eq!(integer_of(classify_read("7", &options)), Some(7));
        assert_eq!(integer_of(classify_read("0x1F", &options)), Some(31));
        assert_eq!(integer_of(classify_read("017", &options)), Some(15));
        assert_eq!(integer_of(classify_read("-12", &options)), Some(-12));
    }

    #[test]
    fn overflow_follows_float_policy() {
        let digits = "1234567890123456789012345";
        let expected: f64 = digits.parse().unwrap();
        let mut options = ReaderOptions::default();
        assert!(matches!(
            classify_read(digits, &options),
            Ok((JsonToken::Float, Slot::Owned(Value::Float(f)))) if f == expected
        ));

        options.float_parse_handling = FloatParseHandling::Decimal;
        assert!(matches!(
            classify_read(digits, &options),
            Ok((JsonToken::Float, Slot::Owned(Value::Decimal(_))))
        ));

        options.arbitrary_precision_integers = true;
        assert!(matches!(
            classify_read(digits, &options),
            Ok((JsonToken::Integer, Slot::Owned(Value::BigInteger(_))))
        ));
    }

    #[test]
    fn big_integers_have_a_length_limit() {
        let options = ReaderOptions {
            arbitrary_precision_integers: true,
            ..ReaderOptions::default()
        };
        let digits = "9".repeat(MAX_BIG_INTEGER_LEN + 1);
        assert!(
            classify_read(&digits, &options)
                .is_err_and(|msg| msg.ends_with("is too large to parse."))
        );
    }

    #[test]
    fn invalid_numbers_name_the_requested_type() {
        let options = ReaderOptions::default();
        let r = crate::buffer::CharBuffer::new(8, None).string_ref(0, 0);
        let err = classify(b"1.5", r, ReadRequest::Int32, &options).err();
        assert_eq!(err.as_deref(), Some("Input string '1.5' is not a valid integer."));
        let err = classify(b"3000000000", r, ReadRequest::Int32, &options).err();
        assert_eq!(
            err.as_deref(),
            Some("JSON integer 3000000000 is too large or small for an Int32.")
        );
        let err = classify(b"1e", r, ReadRequest::Double, &options).err();
        assert_eq!(err.as_deref(), Some("Input string '1e' is not a valid double."));
    }
}
