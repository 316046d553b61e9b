//! Channel layer: per-direction byte handling.
//!
//! Keystrokes go through the escape state machine and line editor; child
//! output goes through the sliding window.

mod escape;
mod line;
mod window;

pub use escape::{BACKSPACE, DELETE, ESC, EscapeState, KeyEffect};
pub use line::{LineBuffer, LineEditor};
pub use window::{DEFAULT_WINDOW_CAPACITY, OutputWindow};
