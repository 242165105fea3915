//! The reader's single growable byte buffer.
//!
//! Layout:
//!
//! ```text
//! [ consumed | unread            | spare        ]
//!  0          pos                 used          data.len()
//! ```
//!
//! Bytes before `pos` have been tokenized; `[pos, used)` is lookahead that
//! has been fetched but not yet consumed; `[used, len)` is room for the next
//! fetch. End of valid data is detected by comparing against `used`, so a
//! NUL byte in the input is ordinary data.
//!
//! Making room comes in two flavours:
//!
//! - *append*: used while a token is being accumulated and earlier indices
//!   must stay meaningful. Capacity doubles (or grows to exactly what is
//!   needed) and nothing moves.
//! - *non-append*: used between tokens. The unread tail is moved to offset 0
//!   first and the buffer only grows if the tail plus the requirement still
//!   does not fit.
//!
//! Moving data invalidates every [`StringRef`] taken before the move. Each
//! move bumps `epoch`, and [`CharBuffer::resolve`] refuses views from an
//! older epoch.

use alloc::{borrow::Cow, string::String, sync::Arc, vec::Vec};
use core::fmt;

use bstr::BStr;
use tracing::trace;

use crate::pool::BufferPool;

/// Buffers at least this large are compacted before every string or number.
const LARGE_BUFFER_LEN: usize = 1024 * 1024;

/// A non-owning view of a lexeme inside [`CharBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StringRef {
    start: usize,
    len: usize,
    epoch: u32,
}

pub(crate) struct CharBuffer {
    data: Vec<u8>,
    pos: usize,
    used: usize,
    /// Global stream offset of `data[0]`.
    consumed: u64,
    epoch: u32,
    end_of_input: bool,
    pool: Option<Arc<dyn BufferPool>>,
}

impl fmt::Debug for CharBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CharBuffer")
            .field("capacity", &self.data.len())
            .field("pos", &self.pos)
            .field("used", &self.used)
            .field("consumed", &self.consumed)
            .field("epoch", &self.epoch)
            .field("end_of_input", &self.end_of_input)
            .field("unread", &BStr::new(self.unread()))
            .finish()
    }
}

impl CharBuffer {
    pub(crate) fn new(capacity: usize, pool: Option<Arc<dyn BufferPool>>) -> Self {
        let capacity = capacity.max(1);
        let data = match &pool {
            Some(pool) => pool.rent(capacity),
            None => alloc::vec![0; capacity],
        };
        Self {
            data,
            pos: 0,
            used: 0,
            consumed: 0,
            epoch: 0,
            end_of_input: false,
            pool,
        }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn set_pos(&mut self, pos: usize) {
        debug_assert!(pos <= self.used);
        self.pos = pos;
    }

    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.set_pos(self.pos + n);
    }

    #[inline]
    pub(crate) fn used(&self) -> usize {
        self.used
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub(crate) fn is_end_of_input(&self) -> bool {
        self.end_of_input
    }

    /// Byte under the cursor, or `None` when no unread data is buffered.
    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.at(self.pos)
    }

    /// Byte at `pos + rel`.
    #[inline]
    pub(crate) fn peek_at(&self, rel: usize) -> Option<u8> {
        self.at(self.pos + rel)
    }

    /// Byte at absolute index `idx`.
    #[inline]
    pub(crate) fn at(&self, idx: usize) -> Option<u8> {
        if idx < self.used {
            Some(self.data[idx])
        } else {
            None
        }
    }

    /// Whether `rel + 1` bytes past the cursor are buffered.
    #[inline]
    pub(crate) fn has(&self, rel: usize) -> bool {
        self.pos + rel < self.used
    }

    #[inline]
    pub(crate) fn unread(&self) -> &[u8] {
        &self.data[self.pos..self.used]
    }

    #[inline]
    pub(crate) fn bytes(&self, start: usize, end: usize) -> &[u8] {
        &self.data[start..end]
    }

    /// Global stream offset of absolute index `idx`.
    #[inline]
    pub(crate) fn global(&self, idx: usize) -> u64 {
        self.consumed + idx as u64
    }

    #[inline]
    pub(crate) fn global_pos(&self) -> u64 {
        self.global(self.pos)
    }

    pub(crate) fn string_ref(&self, start: usize, end: usize) -> StringRef {
        debug_assert!(start <= end && end <= self.used);
        StringRef {
            start,
            len: end - start,
            epoch: self.epoch,
        }
    }

    /// Bytes behind `r`, or `None` if the buffer was compacted since `r` was
    /// taken.
    pub(crate) fn resolve(&self, r: &StringRef) -> Option<&[u8]> {
        (r.epoch == self.epoch && r.start + r.len <= self.used)
            .then(|| &self.data[r.start..r.start + r.len])
    }

    /// Text behind `r`; borrowed unless the bytes are not valid UTF-8.
    pub(crate) fn text(&self, r: &StringRef) -> Option<Cow<'_, str>> {
        self.resolve(r).map(String::from_utf8_lossy)
    }

    /// Guarantees at least `required + 1` bytes of spare room after `used`.
    pub(crate) fn make_room(&mut self, required: usize, append: bool) {
        let len = self.data.len();
        if self.used + required < len {
            return;
        }

        if append {
            let new_len = len
                .saturating_mul(2)
                .max(self.used.saturating_add(required).saturating_add(1));
            trace!(from = len, to = new_len, "growing buffer (append)");
            self.reallocate(new_len, 0);
            return;
        }

        let remaining = self.used - self.pos;
        if remaining + required + 1 >= len {
            let new_len = remaining + required + 1;
            trace!(from = len, to = new_len, remaining, "growing buffer");
            self.reallocate(new_len, self.pos);
        } else if self.pos > 0 {
            trace!(shift = self.pos, remaining, "compacting buffer");
            self.data.copy_within(self.pos..self.used, 0);
        }
        self.rebase(remaining);
    }

    /// Compacts the unread tail to offset 0 when the cursor is deep into the
    /// buffer, so that long strings and numbers do not force growth.
    pub(crate) fn shift_if_needed(&mut self) {
        let len = self.data.len();
        if len - self.pos <= len / 10 || len >= LARGE_BUFFER_LEN {
            let remaining = self.used - self.pos;
            if self.pos > 0 {
                trace!(shift = self.pos, remaining, "shifting buffer before token");
                self.data.copy_within(self.pos..self.used, 0);
                self.rebase(remaining);
            }
        }
    }

    fn rebase(&mut self, remaining: usize) {
        if self.pos > 0 {
            self.consumed += self.pos as u64;
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.pos = 0;
        self.used = remaining;
    }

    /// Moves `data[from..used]` into a fresh buffer of `new_len` bytes.
    fn reallocate(&mut self, new_len: usize, from: usize) {
        let mut fresh = match &self.pool {
            Some(pool) => pool.rent(new_len),
            None => alloc::vec![0; new_len],
        };
        let count = self.used - from;
        fresh[..count].copy_from_slice(&self.data[from..self.used]);
        let old = core::mem::replace(&mut self.data, fresh);
        if let Some(pool) = &self.pool {
            pool.release(old);
        }
    }

    /// Whether `ptr` points into the filled part of the buffer.
    #[cfg(test)]
    pub(crate) fn holds(&self, ptr: *const u8) -> bool {
        self.data[..self.used].as_ptr_range().contains(&ptr)
    }

    /// Room to read fresh input into.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.data[self.used..]
    }

    /// Records `n` freshly read bytes; `0` marks the source as exhausted.
    pub(crate) fn commit(&mut self, n: usize) {
        debug_assert!(self.used + n <= self.data.len());
        self.used += n;
        if n == 0 {
            self.end_of_input = true;
        }
    }

    /// Gives the storage back to the pool (or drops it). Idempotent.
    pub(crate) fn release(&mut self) {
        let data = core::mem::take(&mut self.data);
        self.epoch = self.epoch.wrapping_add(1);
        self.pos = 0;
        self.used = 0;
        self.end_of_input = true;
        if data.is_empty() {
            return;
        }
        if let Some(pool) = &self.pool {
            pool.release(data);
        }
    }
}

impl Drop for CharBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::SharedPool;

    fn filled(capacity: usize, text: &[u8]) -> CharBuffer {
        let mut buf = CharBuffer::new(capacity, None);
        buf.make_room(text.len(), true);
        buf.spare_mut()[..text.len()].copy_from_slice(text);
        buf.commit(text.len());
        buf
    }

    #[test]
    fn append_growth_preserves_indices() {
        let mut buf = filled(8, b"abcdef");
        buf.advance(2);
        let r = buf.string_ref(2, 4);
        buf.make_room(16, true);
        assert!(buf.capacity() >= 6 + 16 + 1);
        assert_eq!(buf.pos(), 2);
        assert_eq!(buf.text(&r).unwrap(), "cd");
    }

    #[test]
    fn non_append_shifts_and_invalidates_views() {
        let mut buf = filled(16, b"0123456789abc");
        buf.advance(10);
        let r = buf.string_ref(10, 12);
        let before = buf.global_pos();
        buf.make_room(4, false);
        assert_eq!(buf.pos(), 0);
        assert_eq!(buf.unread(), b"abc");
        assert_eq!(buf.global_pos(), before);
        assert!(buf.resolve(&r).is_none());
    }

    #[test]
    fn non_append_grows_when_tail_does_not_fit() {
        let mut buf = filled(8, b"abcdefg");
        buf.advance(1);
        buf.make_room(8, false);
        assert_eq!(buf.capacity(), 6 + 8 + 1);
        assert_eq!(buf.unread(), b"bcdefg");
    }

    #[test]
    fn room_already_available_is_a_no_op() {
        let mut buf = filled(32, b"ab");
        buf.advance(1);
        let r = buf.string_ref(1, 2);
        buf.make_room(4, false);
        assert_eq!(buf.pos(), 1);
        assert_eq!(buf.text(&r).unwrap(), "b");
    }

    #[test]
    fn shift_if_needed_only_near_the_end() {
        let mut buf = filled(20, b"0123456789012345678");
        buf.advance(5);
        buf.shift_if_needed();
        assert_eq!(buf.pos(), 5);
        buf.advance(13);
        buf.shift_if_needed();
        assert_eq!(buf.pos(), 0);
        assert_eq!(buf.unread(), b"8");
    }

    #[test]
    fn commit_zero_marks_end() {
        let mut buf = CharBuffer::new(4, None);
        assert!(!buf.is_end_of_input());
        buf.commit(0);
        assert!(buf.is_end_of_input());
        assert_eq!(buf.peek(), None);
    }

    #[test]
    fn invalid_utf8_is_decoded_lossily() {
        let buf = filled(8, b"a\xFFb");
        let r = buf.string_ref(0, 3);
        assert_eq!(buf.text(&r).unwrap(), "a\u{FFFD}b");
    }

    #[test]
    fn pooled_buffers_return_on_release() {
        let pool = Arc::new(SharedPool::new());
        let mut buf = CharBuffer::new(8, Some(pool.clone()));
        buf.make_room(20, true);
        // The first buffer went back when the buffer grew.
        assert_eq!(pool.available(), 1);
        buf.release();
        buf.release();
        assert_eq!(pool.available(), 2);
        assert_eq!(pool.rents(), 2);
    }
}
