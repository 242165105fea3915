//! An incremental, streaming JSON tokenizer.
//!
//! [`JsonTokenizer`] pulls bytes from a [`CharSource`] and yields one
//! [`JsonToken`] per [`read`](JsonTokenizer::read). Besides strict JSON it
//! accepts single-quoted strings, unquoted property names, comments,
//! `NaN`/`Infinity`, `undefined` and `new Name(...)` constructors.
//!
//! The same scanning code backs a blocking API (for [`IoSource`]s) and an
//! async API with cancellation (for any source, including
//! `AsyncIoSource` with the `tokio` feature).

#![allow(missing_docs)]
extern crate alloc;

mod buffer;
mod coerce;
mod error;
mod escape_buffer;
mod line_tracker;
mod literal_buffer;
mod name_table;
mod options;
mod pool;
mod reader;
mod source;
mod token;

#[doc(hidden)]
pub mod chunk_utils;

#[cfg(test)]
mod tests;

pub use error::{CharSite, ContainerName, EndSite, ErrorKind, Found, ReaderError};
pub use literal_buffer::Literal;
pub use name_table::{DefaultNameTable, NameTable};
pub use options::{DateParseHandling, FloatParseHandling, ReaderOptions};
pub use pool::{BufferPool, SharedPool};
pub use reader::{ContainerKind, JsonTokenizer, ParserState};
#[cfg(feature = "tokio")]
pub use source::AsyncIoSource;
pub use source::{BlockingSource, CancellationToken, CharSource, IoSource};
pub use token::{DateRead, JsonDate, JsonToken, Value};
