//! Helpers for feeding input in pieces, shared by tests, benches and the
//! fuzz target.

use alloc::vec::Vec;
use std::io;

/// Split `payload` into approximately equal-sized chunks without
/// breaking UTF-8 code points.
///
/// # Panics
///
/// Panics if `parts` is zero.
#[must_use]
pub fn produce_chunks(payload: &str, parts: usize) -> Vec<&str> {
    assert!(parts > 0);
    let len = payload.len();
    let chunk_size = len.div_ceil(parts);
    let mut chunks = Vec::new();
    let mut start = 0;
    while start < len {
        let mut end = core::cmp::min(start + chunk_size, len);
        while end < len && !payload.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(&payload[start..end]);
        start = end;
    }
    chunks
}

/// A reader that hands out at most `chunk` bytes per call, splitting
/// multi-byte characters and tokens wherever the boundary falls.
#[derive(Debug, Clone)]
pub struct ChunkedReader<'a> {
    data: &'a [u8],
    chunk: usize,
    reads: usize,
}

impl<'a> ChunkedReader<'a> {
    /// # Panics
    ///
    /// Panics if `chunk` is zero.
    #[must_use]
    pub fn new(data: &'a [u8], chunk: usize) -> Self {
        assert!(chunk > 0);
        Self {
            data,
            chunk,
            reads: 0,
        }
    }

    /// Number of `read` calls served so far.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads
    }
}

impl io::Read for ChunkedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads += 1;
        let n = self.chunk.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}
