//! Per-byte classification of keystrokes.
//!
//! The input pump sees raw bytes, so cursor keys and other terminal escape
//! sequences arrive as `ESC ... <letter>`. Those bytes must reach the child
//! untouched but must never end up in the line that rules match against.
//! [`EscapeState::step`] is the whole state machine; it does no I/O.

/// Escape byte that opens a sequence.
pub const ESC: u8 = 0x1b;

/// Backspace (Ctrl-H).
pub const BACKSPACE: u8 = 0x08;

/// Delete, which most terminals send for the Backspace key.
pub const DELETE: u8 = 0x7f;

/// Whether the byte stream is inside an escape sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeState {
    #[default]
    Normal,
    InEscape,
}

/// What the line editor should do with a byte. Every byte is forwarded
/// except an Enter that a rule suppresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEffect {
    /// Forward only.
    PassThrough,
    /// Append to the line and forward.
    Append(u8),
    /// Drop the last buffered character and forward.
    Erase,
    /// End of line: evaluate rules, then maybe forward.
    Enter(u8),
}

impl EscapeState {
    /// Advance by one byte, returning the next state and the effect of the byte.
    pub fn step(self, byte: u8) -> (EscapeState, KeyEffect) {
        match self {
            EscapeState::InEscape if byte.is_ascii_alphabetic() => {
                (EscapeState::Normal, KeyEffect::PassThrough)
            }
            EscapeState::InEscape => (EscapeState::InEscape, KeyEffect::PassThrough),
            EscapeState::Normal => match byte {
                ESC => (EscapeState::InEscape, KeyEffect::PassThrough),
                b'\r' | b'\n' => (EscapeState::Normal, KeyEffect::Enter(byte)),
                BACKSPACE | DELETE => (EscapeState::Normal, KeyEffect::Erase),
                0x20..=0x7e => (EscapeState::Normal, KeyEffect::Append(byte)),
                _ => (EscapeState::Normal, KeyEffect::PassThrough),
            },
        }
    }

    /// Check if a sequence is open.
    pub fn in_escape(self) -> bool {
        self == EscapeState::InEscape
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(bytes: &[u8]) -> (EscapeState, Vec<KeyEffect>) {
        let mut state = EscapeState::default();
        let mut effects = Vec::new();
        for &b in bytes {
            let (next, effect) = state.step(b);
            state = next;
            effects.push(effect);
        }
        (state, effects)
    }

    #[test]
    fn test_printable_appends() {
        let (state, effects) = run(b"a~ ");
        assert_eq!(state, EscapeState::Normal);
        assert_eq!(
            effects,
            vec![
                KeyEffect::Append(b'a'),
                KeyEffect::Append(b'~'),
                KeyEffect::Append(b' '),
            ]
        );
    }

    #[test]
    fn test_cursor_key_is_pass_through() {
        // Up arrow: ESC [ A
        let (state, effects) = run(b"\x1b[A");
        assert_eq!(state, EscapeState::Normal);
        assert!(effects.iter().all(|e| *e == KeyEffect::PassThrough));
    }

    #[test]
    fn test_sequence_closes_on_first_letter_only() {
        // ESC [ 1 ; 5 C (ctrl-right), then a normal 'x'
        let (state, effects) = run(b"\x1b[1;5Cx");
        assert_eq!(state, EscapeState::Normal);
        assert_eq!(effects.last(), Some(&KeyEffect::Append(b'x')));
        assert!(effects[..6].iter().all(|e| *e == KeyEffect::PassThrough));
    }

    #[test]
    fn test_enter_inside_escape_is_not_a_line_end() {
        let (state, effects) = run(b"\x1b[\r");
        assert!(state.in_escape());
        assert_eq!(effects[2], KeyEffect::PassThrough);
    }

    #[test]
    fn test_enter_and_erase() {
        assert_eq!(EscapeState::Normal.step(b'\r').1, KeyEffect::Enter(b'\r'));
        assert_eq!(EscapeState::Normal.step(b'\n').1, KeyEffect::Enter(b'\n'));
        assert_eq!(EscapeState::Normal.step(BACKSPACE).1, KeyEffect::Erase);
        assert_eq!(EscapeState::Normal.step(DELETE).1, KeyEffect::Erase);
    }

    #[test]
    fn test_control_and_non_ascii_pass_through() {
        for b in [0x03u8, b'\t', 0xc3, 0xa9] {
            assert_eq!(EscapeState::Normal.step(b), (EscapeState::Normal, KeyEffect::PassThrough));
        }
    }
}
