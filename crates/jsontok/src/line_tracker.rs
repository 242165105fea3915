/// Line bookkeeping for diagnostics.
///
/// Offsets are global stream offsets in bytes, so they stay valid across
/// buffer compaction.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LineTracker {
    line: usize,
    line_start: u64,
}

impl LineTracker {
    pub(crate) fn new() -> Self {
        Self {
            line: 1,
            line_start: 0,
        }
    }

    /// Records a newline whose first byte after it sits at `next_line_start`.
    pub(crate) fn new_line(&mut self, next_line_start: u64) {
        self.line += 1;
        self.line_start = next_line_start;
    }

    pub(crate) fn line(&self) -> usize {
        self.line
    }

    pub(crate) fn position(&self, cursor: u64) -> usize {
        usize::try_from(cursor.saturating_sub(self.line_start)).unwrap_or(usize::MAX)
    }
}
