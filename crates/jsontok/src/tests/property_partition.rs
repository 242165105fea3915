use alloc::{
    string::{String, ToString},
    vec::Vec,
};

use quickcheck::{Arbitrary, Gen, QuickCheck};
use serde_json::{Map, Value as Json};

use super::{Tokens, tokens_chunked};
use crate::{DateParseHandling, JsonToken, ReaderOptions, Value};

#[derive(Debug, Clone)]
struct Doc(Json);

impl Arbitrary for Doc {
    fn arbitrary(g: &mut Gen) -> Self {
        Doc(gen_value(g, 3))
    }
}

fn gen_value(g: &mut Gen, depth: usize) -> Json {
    let kinds = if depth == 0 { 5 } else { 7 };
    match u8::arbitrary(g) % kinds {
        0 => Json::Null,
        1 => Json::Bool(bool::arbitrary(g)),
        2 => Json::from(i64::arbitrary(g)),
        3 => Json::from(f64::arbitrary(g)),
        4 => Json::String(String::arbitrary(g)),
        5 => Json::Array(
            (0..usize::arbitrary(g) % 4)
                .map(|_| gen_value(g, depth - 1))
                .collect(),
        ),
        _ => Json::Object(
            (0..usize::arbitrary(g) % 4)
                .map(|_| (String::arbitrary(g), gen_value(g, depth - 1)))
                .collect(),
        ),
    }
}

enum Open {
    Array(Vec<Json>),
    Object(Map<String, Json>, Option<String>),
}

/// Rebuilds a document from its token stream.
fn rebuild(tokens: &Tokens) -> Option<Json> {
    let mut stack: Vec<Open> = Vec::new();
    let mut done = None;
    for (token, value) in tokens {
        let complete = match (token, value) {
            (JsonToken::StartArray, _) => {
                stack.push(Open::Array(Vec::new()));
                continue;
            }
            (JsonToken::StartObject, _) => {
                stack.push(Open::Object(Map::new(), None));
                continue;
            }
            (JsonToken::PropertyName, Some(Value::String(name))) => {
                if let Some(Open::Object(_, key)) = stack.last_mut() {
                    *key = Some(name.to_string());
                }
                continue;
            }
            (JsonToken::EndArray, _) => match stack.pop()? {
                Open::Array(items) => Json::Array(items),
                Open::Object(..) => return None,
            },
            (JsonToken::EndObject, _) => match stack.pop()? {
                Open::Object(map, _) => Json::Object(map),
                Open::Array(_) => return None,
            },
            (JsonToken::Null, _) => Json::Null,
            (JsonToken::Boolean, Some(Value::Boolean(b))) => Json::Bool(*b),
            (JsonToken::Integer, Some(Value::Integer(i))) => Json::from(*i),
            (JsonToken::Float, Some(Value::Float(f))) => Json::from(*f),
            (JsonToken::String, Some(Value::String(s))) => Json::String(s.to_string()),
            _ => return None,
        };
        match stack.last_mut() {
            Some(Open::Array(items)) => items.push(complete),
            Some(Open::Object(map, key)) => {
                map.insert(key.take()?, complete);
            }
            None => done = Some(complete),
        }
    }
    done
}

/// Property: the token stream does not depend on how the input is split
/// across fetches, and it describes the document that was serialized.
#[test]
fn partition_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(doc: Doc, chunk: usize) -> bool {
        let src = doc.0.to_string();
        let options = ReaderOptions {
            date_parse_handling: DateParseHandling::None,
            ..ReaderOptions::default()
        };
        let whole = tokens_chunked(&src, src.len(), options.clone()).unwrap();
        let split = tokens_chunked(&src, 1 + chunk % src.len(), options).unwrap();
        whole == split && rebuild(&split).as_ref() == Some(&doc.0)
    }

    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;

    QuickCheck::new()
        .tests(tests)
        .quickcheck(prop as fn(Doc, usize) -> bool);
}
