//! Where the reader's bytes come from.
//!
//! A [`CharSource`] hands out bytes through a future so that the same
//! scanning code serves blocking and asynchronous callers. Blocking sources
//! complete that future on first poll, which is what lets the blocking API
//! drive it with `pollster`.

use alloc::sync::Arc;
use core::{
    future::{self, Future},
    sync::atomic::{AtomicBool, Ordering},
};
use std::io;

pub trait CharSource {
    /// Reads up to `buf.len()` bytes into `buf`. `Ok(0)` means the source is
    /// exhausted.
    fn fill(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>>;

    /// Releases the underlying stream. Called once by
    /// [`JsonTokenizer::close`](crate::JsonTokenizer::close) when
    /// `close_input` is set.
    fn close(&mut self) {}
}

/// A source whose [`CharSource::fill`] future is always ready, so the
/// blocking reader methods are available for it.
pub trait BlockingSource: CharSource {}

/// Adapts any [`std::io::Read`].
#[derive(Debug)]
pub struct IoSource<R> {
    inner: Option<R>,
}

impl<R> IoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    /// The wrapped reader, or `None` once the source has been closed.
    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

impl<R: io::Read> CharSource for IoSource<R> {
    fn fill(&mut self, buf: &mut [u8]) -> impl Future<Output = io::Result<usize>> {
        let result = match &mut self.inner {
            Some(reader) => loop {
                match reader.read(buf) {
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    other => break other,
                }
            },
            None => Ok(0),
        };
        future::ready(result)
    }

    fn close(&mut self) {
        self.inner = None;
    }
}

impl<R: io::Read> BlockingSource for IoSource<R> {}

/// Adapts a [`tokio::io::AsyncRead`].
#[cfg(feature = "tokio")]
#[derive(Debug)]
pub struct AsyncIoSource<R> {
    inner: Option<R>,
}

#[cfg(feature = "tokio")]
impl<R> AsyncIoSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner: Some(inner) }
    }

    pub fn into_inner(self) -> Option<R> {
        self.inner
    }
}

#[cfg(feature = "tokio")]
impl<R: tokio::io::AsyncRead + Unpin> CharSource for AsyncIoSource<R> {
    async fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        use tokio::io::AsyncReadExt;

        match &mut self.inner {
            Some(reader) => reader.read(buf).await,
            None => Ok(0),
        }
    }

    fn close(&mut self) {
        self.inner = None;
    }
}

/// A cloneable cancellation flag for the `*_async` reader methods.
///
/// The reader checks the flag immediately before each fetch from its source.
/// A token that is already fully buffered is completed even after
/// cancellation was requested.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_source_reports_exhaustion_after_close() {
        let mut source = IoSource::new(&b"abc"[..]);
        let mut buf = [0u8; 8];
        assert_eq!(pollster::block_on(source.fill(&mut buf)).unwrap(), 3);
        source.close();
        assert_eq!(pollster::block_on(source.fill(&mut buf)).unwrap(), 0);
        assert!(source.into_inner().is_none());
    }

    #[test]
    fn cancellation_is_shared_between_clones() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }
}
