//! Rule actions and the verdicts they return.
//!
//! Actions never write to a stream themselves. They describe what should be
//! written as a [`Verdict`], and the pump that fired the rule performs the
//! writes. This keeps actions testable without a live writer.

use std::time::Duration;

use crate::channel::ESC;

/// A single side effect requested by a rule action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Write bytes into the child's input through the PTY bridge.
    Inject(Vec<u8>),

    /// Write bytes to the firing pump's own destination.
    ///
    /// For output rules this is the local terminal. For input rules it is the
    /// forward path toward the child.
    Forward(Vec<u8>),

    /// Sleep before performing the next step.
    Pause(Duration),
}

/// Outcome of a rule action: the writes to perform and whether the
/// triggering Enter should be withheld.
///
/// # Example
///
/// ```rust
/// use ttyhook::Verdict;
///
/// // Answer the line ourselves and swallow the user's Enter.
/// let verdict = Verdict::suppress().inject("ok\r");
/// assert!(verdict.is_suppressed());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    steps: Vec<Step>,
    suppress: bool,
}

impl Verdict {
    /// A verdict that lets the triggering Enter through.
    pub fn pass() -> Self {
        Self::default()
    }

    /// A verdict that withholds the triggering Enter.
    ///
    /// Only meaningful for input rules; output chunks are always forwarded.
    pub fn suppress() -> Self {
        Self {
            steps: Vec::new(),
            suppress: true,
        }
    }

    /// Interrupt the child, type `text` and press Enter.
    ///
    /// Sends ESC, waits `settle`, sends `text`, waits `settle` again, then
    /// sends `\r`. Nothing confirms the child handled the interrupt before
    /// the text arrives; `settle` is a best-effort delay only.
    pub fn replace_command(text: impl Into<Vec<u8>>, settle: Duration) -> Self {
        Self::pass()
            .inject(vec![ESC])
            .pause(settle)
            .inject(text)
            .pause(settle)
            .inject(b"\r".to_vec())
    }

    /// Append an injection into the child's input.
    pub fn inject(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push(Step::Inject(bytes.into()));
        self
    }

    /// Append a write to the pump's destination.
    pub fn forward(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.steps.push(Step::Forward(bytes.into()));
        self
    }

    /// Append a pause.
    pub fn pause(mut self, duration: Duration) -> Self {
        self.steps.push(Step::Pause(duration));
        self
    }

    /// Set the suppress flag.
    pub fn with_suppress(mut self, suppress: bool) -> Self {
        self.suppress = suppress;
        self
    }

    /// Whether the triggering Enter should be withheld.
    pub fn is_suppressed(&self) -> bool {
        self.suppress
    }

    /// The steps to perform, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Whether any step writes to the PTY bridge.
    pub fn injects(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, Step::Inject(_)))
    }
}

/// Trait for rule actions - closures by default, extensible for stateful handlers.
///
/// Actions run synchronously on the pump that matched. A slow action stalls
/// that direction only. Actions must not panic; failures inside an action
/// are the action's own business.
pub trait RuleAction: Send + Sync {
    /// Called with the matched text (the trimmed input line, or the output window).
    fn on_match(&self, text: &str) -> Verdict;
}

impl<F> RuleAction for F
where
    F: Fn(&str) -> Verdict + Send + Sync,
{
    fn on_match(&self, text: &str) -> Verdict {
        self(text)
    }
}

/// An action that returns the same verdict on every match.
#[derive(Debug, Clone)]
pub struct StaticReply(pub Verdict);

impl RuleAction for StaticReply {
    fn on_match(&self, _text: &str) -> Verdict {
        self.0.clone()
    }
}
