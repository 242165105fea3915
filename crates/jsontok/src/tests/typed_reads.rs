use alloc::{string::ToString, vec::Vec};

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;

use crate::{
    DateRead, ErrorKind, FloatParseHandling, JsonDate, JsonToken, JsonTokenizer, ParserState,
    ReaderOptions,
};

#[test]
fn int32_values() {
    let mut reader = JsonTokenizer::from_text(r#"[1, "2", null, "", /* c */ -3]"#);
    assert!(reader.read().unwrap());
    let mut got = Vec::new();
    for _ in 0..6 {
        got.push(reader.read_as_int32().unwrap());
    }
    assert_eq!(got, [Some(1), Some(2), None, None, Some(-3), None]);
    assert_eq!(reader.token_type(), JsonToken::EndArray);
    assert_eq!(reader.read_as_int32().unwrap(), None);
    assert_eq!(reader.token_type(), JsonToken::None);
}

#[test]
fn int32_errors() {
    let mut reader = JsonTokenizer::from_text("[3000000000]");
    reader.read().unwrap();
    assert_eq!(
        reader.read_as_int32().unwrap_err().kind().to_string(),
        "JSON integer 3000000000 is too large or small for an Int32."
    );

    let mut reader = JsonTokenizer::from_text(r#""abc""#);
    assert_eq!(
        reader.read_as_int32().unwrap_err().kind().to_string(),
        "Could not convert string to integer: abc."
    );
}

#[test]
fn decimal_values() {
    let mut reader = JsonTokenizer::from_text(r#"[1.25, "1,000.5", 7]"#);
    reader.read().unwrap();
    assert_eq!(reader.read_as_decimal().unwrap(), Some(Decimal::new(125, 2)));
    assert_eq!(reader.read_as_decimal().unwrap(), Some(Decimal::new(10005, 1)));
    assert_eq!(reader.read_as_decimal().unwrap(), Some(Decimal::from(7)));
    assert_eq!(reader.token_type(), JsonToken::Float);
}

#[test]
fn double_values() {
    let mut reader = JsonTokenizer::from_text(r#"[1, "NaN", Infinity, 2.5]"#);
    reader.read().unwrap();
    assert_eq!(reader.read_as_double().unwrap(), Some(1.0));
    assert!(reader.read_as_double().unwrap().is_some_and(f64::is_nan));
    assert_eq!(reader.read_as_double().unwrap(), Some(f64::INFINITY));
    assert_eq!(reader.read_as_double().unwrap(), Some(2.5));
}

#[test]
fn boolean_values() {
    let mut reader = JsonTokenizer::from_text(r#"[true, 0, 2, "False"]"#);
    reader.read().unwrap();
    let mut got = Vec::new();
    for _ in 0..4 {
        got.push(reader.read_as_boolean().unwrap());
    }
    assert_eq!(got, [Some(true), Some(false), Some(true), Some(false)]);
}

#[test]
fn string_values() {
    let mut reader = JsonTokenizer::from_text(r#"[1.50, true, "s", null, NaN]"#);
    reader.read().unwrap();
    assert_eq!(reader.read_as_string().unwrap().as_deref(), Some("1.50"));
    assert_eq!(reader.token_type(), JsonToken::String);
    assert_eq!(reader.read_as_string().unwrap().as_deref(), Some("true"));
    assert_eq!(reader.read_as_string().unwrap().as_deref(), Some("s"));
    assert_eq!(reader.read_as_string().unwrap(), None);
    assert_eq!(reader.read_as_string().unwrap().as_deref(), Some("NaN"));
}

#[test]
fn byte_values() {
    let mut reader = JsonTokenizer::from_text(r#"["SGVsbG8=", [72, 105], "d6b81a34-bd6c-4b0e-b5a5-a1d5ab3d0a3c"]"#);
    reader.read().unwrap();
    assert_eq!(reader.read_as_bytes().unwrap().as_deref(), Some(&b"Hello"[..]));
    assert_eq!(reader.token_type(), JsonToken::Bytes);
    assert_eq!(reader.read_as_bytes().unwrap().as_deref(), Some(&b"Hi"[..]));
    assert_eq!(reader.read_as_bytes().unwrap().map(|b| b.len()), Some(16));
    assert_eq!(reader.read_as_bytes().unwrap(), None);
}

#[test]
fn byte_errors() {
    let mut reader = JsonTokenizer::from_text("[256]");
    assert_eq!(
        reader.read_as_bytes().unwrap_err().kind().to_string(),
        "Value was either too large or too small for an unsigned byte."
    );

    let mut reader = JsonTokenizer::from_text("[1");
    assert!(matches!(
        reader.read_as_bytes().unwrap_err().into_kind(),
        ErrorKind::UnexpectedEndOfInput(crate::EndSite::Bytes)
    ));

    let mut reader = JsonTokenizer::from_text("12");
    assert!(matches!(
        reader.read_as_bytes().unwrap_err().into_kind(),
        ErrorKind::UnexpectedCharacter { .. }
    ));
}

#[test]
fn date_values() {
    let mut reader =
        JsonTokenizer::from_text(r#"["2012-02-03T10:20:30+02:00", "hello", "/Date(1000)/"]"#);
    reader.read().unwrap();
    let expected = Utc.with_ymd_and_hms(2012, 2, 3, 8, 20, 30).unwrap();
    assert_eq!(
        reader.read_as_date_time().unwrap(),
        Some(DateRead::Parsed(JsonDate::Utc(expected)))
    );
    assert_eq!(
        reader.read_as_date_time().unwrap(),
        Some(DateRead::Raw("hello".into()))
    );
    assert_eq!(reader.token_type(), JsonToken::String);
    let ms = reader.read_as_date_time().unwrap().and_then(DateRead::parsed);
    assert!(matches!(ms, Some(JsonDate::Utc(d)) if d.timestamp_millis() == 1000));
}

#[test]
fn date_offset_values() {
    let mut reader = JsonTokenizer::from_text(r#""2012-02-03T10:20:30+02:00""#);
    let Some(DateRead::Parsed(date)) = reader.read_as_date_time_offset().unwrap() else {
        panic!("expected a date");
    };
    assert_eq!(date.offset().local_minus_utc(), 7200);
    assert_eq!(date.timestamp(), Utc.with_ymd_and_hms(2012, 2, 3, 8, 20, 30).unwrap().timestamp());
}

#[test]
fn typed_reads_follow_property_names() {
    let mut reader = JsonTokenizer::from_text(r#"{"a": 1, "b": 2}"#);
    reader.read().unwrap();
    assert_eq!(
        reader.read_as_int32().unwrap_err().kind().to_string(),
        "Unexpected state: ObjectStart."
    );

    let mut reader = JsonTokenizer::from_text(r#"{"a": 1, "b": 2}"#);
    reader.read().unwrap();
    reader.read().unwrap();
    assert_eq!(reader.read_as_int32().unwrap(), Some(1));
    assert!(reader.read().unwrap());
    assert_eq!(reader.path(), "b");
    assert_eq!(reader.read_as_int32().unwrap(), Some(2));
}

#[test]
fn typed_read_in_place_of_a_property_name() {
    let mut reader = JsonTokenizer::from_text(r#"{"a":1,"b":2}"#);
    reader.read().unwrap();
    reader.read().unwrap();
    assert_eq!(reader.read_as_int32().unwrap(), Some(1));
    let err = reader.read_as_int32().unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::UnexpectedState(ParserState::Object)),
        "{err:?}"
    );
    assert_eq!(err.to_string(), "Unexpected state: Object. Path 'a', line 1, position 7.");
}

#[test]
fn specials_need_double_handling() {
    let options = ReaderOptions {
        float_parse_handling: FloatParseHandling::Decimal,
        ..ReaderOptions::default()
    };
    let mut reader = JsonTokenizer::from_text_with_options("NaN", options);
    assert_eq!(
        reader.read().unwrap_err().kind().to_string(),
        "Cannot read NaN value."
    );
}

#[test]
fn elided_value_in_typed_read() {
    let mut reader = JsonTokenizer::from_text("[,1]");
    reader.read().unwrap();
    let err = reader.read_as_int32().unwrap_err();
    assert!(matches!(
        err.kind(),
        ErrorKind::UnexpectedCharacter {
            found: crate::Found::Char(','),
            ..
        }
    ));
    assert_eq!(reader.token_type(), JsonToken::Undefined);
    assert_eq!(reader.read_as_int32().unwrap(), Some(1));
}
