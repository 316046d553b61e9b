//! Logical input line tracking.

use super::escape::{EscapeState, KeyEffect};

/// Printable bytes typed since the last Enter.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Create an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a typed character.
    pub fn push(&mut self, byte: u8) {
        self.buffer.push(byte);
    }

    /// Remove the last character. No-op on an empty line.
    pub fn pop(&mut self) {
        self.buffer.pop();
    }

    /// The line with surrounding whitespace trimmed, as rules see it.
    pub fn candidate(&self) -> String {
        String::from_utf8_lossy(self.buffer.trim_ascii()).into_owned()
    }

    /// Get the raw line contents.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer
    }

    /// Get the current line length.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if the line is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Clear the line.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

/// Combines the escape state machine with the line buffer.
///
/// [`feed`](Self::feed) applies every effect except Enter, which is handed
/// back to the caller so rules can run before the line is cleared with
/// [`finish_line`](Self::finish_line).
#[derive(Debug, Default)]
pub struct LineEditor {
    state: EscapeState,
    line: LineBuffer,
}

impl LineEditor {
    /// Create an editor in the `Normal` state with an empty line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process one byte and return its effect.
    pub fn feed(&mut self, byte: u8) -> KeyEffect {
        let (next, effect) = self.state.step(byte);
        self.state = next;
        match effect {
            KeyEffect::Append(b) => self.line.push(b),
            KeyEffect::Erase => self.line.pop(),
            KeyEffect::PassThrough | KeyEffect::Enter(_) => {}
        }
        effect
    }

    /// The trimmed text of the current line.
    pub fn candidate(&self) -> String {
        self.line.candidate()
    }

    /// Clear the line after an Enter.
    pub fn finish_line(&mut self) {
        self.line.clear();
    }

    /// Get the current line.
    pub fn line(&self) -> &LineBuffer {
        &self.line
    }

    /// Get the escape state.
    pub fn state(&self) -> EscapeState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::escape::{BACKSPACE, DELETE};

    fn feed_all(editor: &mut LineEditor, bytes: &[u8]) {
        for &b in bytes {
            editor.feed(b);
        }
    }

    #[test]
    fn test_candidate_is_trimmed() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, b"  hello  ");
        assert_eq!(editor.candidate(), "hello");
        assert_eq!(editor.line().len(), 9);
    }

    #[test]
    fn test_backspace_removes_last_character() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, b"helloo");
        editor.feed(DELETE);
        assert_eq!(editor.candidate(), "hello");
        editor.feed(BACKSPACE);
        assert_eq!(editor.candidate(), "hell");
    }

    #[test]
    fn test_backspace_on_empty_line_is_noop() {
        let mut editor = LineEditor::new();
        assert_eq!(editor.feed(DELETE), KeyEffect::Erase);
        assert!(editor.line().is_empty());
        feed_all(&mut editor, b"a");
        assert_eq!(editor.candidate(), "a");
    }

    #[test]
    fn test_escape_sequences_excluded_from_line() {
        let mut editor = LineEditor::new();
        // left arrow between characters, then a colour reset
        feed_all(&mut editor, b"he\x1b[Dllo\x1b[0m");
        assert_eq!(editor.candidate(), "hello");
        assert_eq!(editor.state(), EscapeState::Normal);
    }

    #[test]
    fn test_enter_leaves_line_for_caller() {
        let mut editor = LineEditor::new();
        feed_all(&mut editor, b"ls");
        assert_eq!(editor.feed(b'\r'), KeyEffect::Enter(b'\r'));
        assert_eq!(editor.candidate(), "ls");
        editor.finish_line();
        assert!(editor.line().is_empty());
    }
}
