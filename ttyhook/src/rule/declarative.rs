//! Declarative rule descriptions.
//!
//! A [`RuleSpec`] is plain data that deserializes from any serde format, so
//! deployments can keep their rules in a config file instead of code.
//! Every spec compiles into a rule whose action always returns the same
//! verdict.
//!
//! ```rust
//! use ttyhook::rule::RuleSpec;
//!
//! let spec: RuleSpec = serde_json::from_str(r#"{
//!     "direction": "input",
//!     "pattern": "(?i)^goodbye$",
//!     "steps": [{ "kind": "inject", "text": "ok\r" }],
//!     "suppress": true
//! }"#).unwrap();
//! assert_eq!(spec.pattern, "(?i)^goodbye$");
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::verdict::{StaticReply, Verdict};
use super::{Direction, Rule};
use crate::error::Result;

/// A single step of a declarative rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepSpec {
    /// Write `text` into the child's input.
    Inject { text: String },
    /// Write `text` to the firing pump's destination.
    Forward { text: String },
    /// Wait before the next step.
    Pause { millis: u64 },
}

/// A rule described as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Which pump evaluates the rule.
    pub direction: Direction,

    /// Regular expression to match.
    pub pattern: String,

    /// Steps performed on every match.
    #[serde(default)]
    pub steps: Vec<StepSpec>,

    /// Withhold the triggering Enter (input rules only).
    #[serde(default)]
    pub suppress: bool,
}

impl RuleSpec {
    /// Build the verdict this spec returns on every match.
    pub fn verdict(&self) -> Verdict {
        self.steps
            .iter()
            .fold(Verdict::pass().with_suppress(self.suppress), |verdict, step| match step {
                StepSpec::Inject { text } => verdict.inject(text.as_bytes()),
                StepSpec::Forward { text } => verdict.forward(text.as_bytes()),
                StepSpec::Pause { millis } => verdict.pause(Duration::from_millis(*millis)),
            })
    }

    /// Compile into a [`Rule`].
    pub fn compile(&self) -> Result<Rule> {
        Rule::new(self.direction, &self.pattern, StaticReply(self.verdict()))
    }
}
