//! Bounded sliding window over recent child output.
//!
//! Output rules are matched against the whole window rather than the latest
//! chunk, so a pattern split across two reads is still found. The window
//! keeps only the trailing `capacity` bytes; memory use is O(capacity), not
//! O(output size).

use bytes::{Buf, BytesMut};

/// Default window capacity in bytes.
pub const DEFAULT_WINDOW_CAPACITY: usize = 1000;

/// Sliding window of the most recent output bytes.
#[derive(Debug)]
pub struct OutputWindow {
    window: BytesMut,

    /// Maximum number of bytes retained.
    capacity: usize,
}

impl OutputWindow {
    /// Create a window retaining at most `capacity` bytes (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: BytesMut::with_capacity(capacity * 2),
            capacity,
        }
    }

    /// Append a chunk, then drop bytes from the front until the window fits.
    pub fn extend(&mut self, data: &[u8]) {
        self.window.extend_from_slice(data);

        // BytesMut::advance() is an O(1) pointer bump.
        if self.window.len() > self.capacity {
            let excess = self.window.len() - self.capacity;
            self.window.advance(excess);
        }
    }

    /// Get the window contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.window
    }

    /// Get the window contents as a string (lossy UTF-8 conversion).
    pub fn as_str_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.window)
    }

    /// Get the current window length.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    /// Check if the window is empty.
    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Forget everything seen so far. Called after a rule fires.
    pub fn clear(&mut self) {
        self.window.clear();
    }

    /// Get the capacity setting.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for OutputWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}
