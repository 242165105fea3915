mod property_partition;
mod typed_reads;

use alloc::vec::Vec;

use crate::{
    JsonToken, JsonTokenizer, ReaderError, ReaderOptions, Value,
    chunk_utils::ChunkedReader,
};

pub(crate) type Tokens = Vec<(JsonToken, Option<Value<'static>>)>;

/// Reads every token of `text`, handing the reader `chunk` bytes per fetch.
pub(crate) fn tokens_chunked(
    text: &str,
    chunk: usize,
    options: ReaderOptions,
) -> Result<Tokens, ReaderError> {
    let mut reader =
        JsonTokenizer::from_reader_with_options(ChunkedReader::new(text.as_bytes(), chunk), options);
    let mut out = Vec::new();
    while reader.read()? {
        out.push((reader.token_type(), reader.value().map(Value::into_owned)));
    }
    Ok(out)
}

pub(crate) fn tokens(text: &str) -> Result<Tokens, ReaderError> {
    tokens_chunked(text, text.len().max(1), ReaderOptions::default())
}

pub(crate) fn kinds(text: &str) -> Vec<JsonToken> {
    tokens(text)
        .unwrap()
        .into_iter()
        .map(|(token, _)| token)
        .collect()
}
