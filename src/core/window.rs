// logsift - core/window.rs
//
// Pull-based line source with a small lookahead window.
//
// The window holds the three most recently read lines of the stream and
// shifts left by one line per scan step. Slots beyond end-of-stream are
// simply absent; callers evaluate markers only against populated slots.
// While a record block is open, lines are pulled straight from the source
// past the window, so memory stays bounded except inside an open block.
//
// Core layer: accepts BufRead trait objects, never touches the filesystem.

use crate::util::constants;
use crate::util::error::ScanError;
use std::collections::VecDeque;
use std::io::BufRead;

/// Lookahead window over a newline-delimited line source.
#[derive(Debug)]
pub struct LineWindow<R: BufRead> {
    source: R,
    slots: VecDeque<String>,
    /// Total lines pulled from the source so far.
    pulled: u64,
}

impl<R: BufRead> LineWindow<R> {
    /// Create a window over `source`, primed with up to
    /// [`constants::WINDOW_SIZE`] lines.
    pub fn new(source: R) -> Result<Self, ScanError> {
        let mut window = Self {
            source,
            slots: VecDeque::with_capacity(constants::WINDOW_SIZE),
            pulled: 0,
        };
        window.refill()?;
        Ok(window)
    }

    /// Read one line directly from the source, bypassing the window.
    ///
    /// Used while a record block or failure dump is open, when continuation
    /// lines must not pass through marker detection. Trailing `\n` / `\r\n`
    /// is stripped. Returns `None` at end of stream.
    pub fn pull(&mut self) -> Result<Option<String>, ScanError> {
        let mut line = String::new();
        let n = self
            .source
            .read_line(&mut line)
            .map_err(|source| ScanError::Read { source })?;
        if n == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        self.pulled += 1;
        Ok(Some(line))
    }

    /// Discard the oldest slot, shift the rest left, and pull one new line.
    /// Near end-of-stream the window simply shrinks.
    pub fn advance(&mut self) -> Result<(), ScanError> {
        self.slots.pop_front();
        if let Some(line) = self.pull()? {
            self.slots.push_back(line);
        }
        Ok(())
    }

    /// Drop any remaining slots and re-prime the window with freshly read
    /// lines. Called after a record block or failure dump completes.
    pub fn refill(&mut self) -> Result<(), ScanError> {
        self.slots.clear();
        while self.slots.len() < constants::WINDOW_SIZE {
            match self.pull()? {
                Some(line) => self.slots.push_back(line),
                None => break,
            }
        }
        Ok(())
    }

    /// The line in slot `idx` (0 = oldest), if populated.
    pub fn slot(&self, idx: usize) -> Option<&str> {
        self.slots.get(idx).map(String::as_str)
    }

    /// Remove and return the oldest slot without pulling a replacement.
    pub fn take_front(&mut self) -> Option<String> {
        self.slots.pop_front()
    }

    /// True once the source is exhausted and every slot has been consumed.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// 1-based line number of the oldest slot. Meaningful only while the
    /// window is populated.
    pub fn front_line_number(&self) -> u64 {
        self.pulled - self.slots.len() as u64 + 1
    }

    /// Total lines pulled from the source so far.
    pub fn lines_read(&self) -> u64 {
        self.pulled
    }
}
