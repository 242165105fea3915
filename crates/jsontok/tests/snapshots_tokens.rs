#![allow(missing_docs)]

mod common;

use core::fmt::Write;

use jsontok::{JsonDate, JsonTokenizer, Value, chunk_utils::ChunkedReader};

fn render_value(value: &Value<'_>) -> String {
    match value {
        Value::String(s) => format!("{s:?}"),
        Value::Integer(i) => i.to_string(),
        Value::BigInteger(b) => b.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Decimal(d) => d.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Date(JsonDate::Utc(d)) => d.to_string(),
        Value::Date(JsonDate::Offset(d)) => d.to_string(),
        Value::Date(JsonDate::Unspecified(d)) => d.to_string(),
        Value::Bytes(b) => format!("{b:?}"),
    }
}

fn render_tokens(text: &str, chunk: usize) -> String {
    let mut reader = JsonTokenizer::from_reader(ChunkedReader::new(text.as_bytes(), chunk));
    let mut out = String::new();
    while reader.read().expect("read error") {
        write!(out, "{:?}", reader.token_type()).unwrap();
        if let Some(value) = reader.value() {
            write!(out, " {}", render_value(&value)).unwrap();
        }
        writeln!(out, " @ '{}' ({})", reader.path(), reader.depth()).unwrap();
    }
    out
}

fn render_error(text: &str) -> String {
    let mut reader = JsonTokenizer::from_text(text);
    loop {
        match reader.read() {
            Ok(true) => {}
            Ok(false) => return String::from("no error"),
            Err(e) => return e.to_string(),
        }
    }
}

#[test]
fn snapshot_lenient_document() {
    let whole = render_tokens(common::LENIENT, common::LENIENT.len());
    assert_eq!(whole, render_tokens(common::LENIENT, 3));
    insta::assert_snapshot!(whole, @r#"
    StartObject @ '' (0)
    Comment "settings" @ '' (1)
    PropertyName "name" @ 'name' (1)
    String "demo" @ 'name' (1)
    PropertyName "tags" @ 'tags' (1)
    StartArray @ 'tags' (1)
    String "a" @ 'tags[0]' (2)
    String "b" @ 'tags[1]' (2)
    EndArray @ 'tags' (1)
    PropertyName "count" @ 'count' (1)
    Integer 3 @ 'count' (1)
    PropertyName "ratio" @ 'ratio' (1)
    Float 0.5 @ 'ratio' (1)
    PropertyName "when" @ 'when' (1)
    Date 2020-01-02 03:04:05 UTC @ 'when' (1)
    PropertyName "ctor" @ 'ctor' (1)
    StartConstructor "Point" @ 'ctor' (1)
    Integer 1 @ 'ctor[0]' (2)
    Integer 2 @ 'ctor[1]' (2)
    EndConstructor @ 'ctor' (1)
    PropertyName "none" @ 'none' (1)
    Null @ 'none' (1)
    EndObject @ '' (0)
    "#);
}

#[test]
fn snapshot_error_messages() {
    let mut out = String::new();
    for text in [r#"{"a": [1, 2}"#, "[1,\n  tru]", r#"{"a":}"#, r#"["ab"#] {
        writeln!(out, "{}", render_error(text)).unwrap();
    }
    insta::assert_snapshot!(out, @r#"
    JsonToken EndObject is not valid for closing JsonType Array. Path 'a', line 1, position 12.
    Error parsing boolean value. Path '[0]', line 2, position 5.
    Unexpected character encountered while parsing value: }. Path 'a', line 1, position 5.
    Unterminated string. Expected delimiter: ". Path '', line 1, position 4.
    "#);
}

#[test]
fn records_document_reads_to_the_end() {
    let text = common::records(200);
    let mut reader = JsonTokenizer::from_reader(ChunkedReader::new(text.as_bytes(), 61));
    let mut names = 0;
    while reader.read().unwrap() {
        if let Some(Value::String(name)) = reader.value() {
            if name.starts_with("item é") {
                names += 1;
            }
        }
    }
    assert_eq!(names, 200);
}
