//! Rule engine: ordered, first-match-wins pattern rules for each direction.
//!
//! Patterns are compiled when a rule is registered, so a bad pattern is
//! reported before any traffic flows and can never silently no-op later.

mod declarative;
mod verdict;

pub use declarative::{RuleSpec, StepSpec};
pub use verdict::{RuleAction, StaticReply, Step, Verdict};

use std::fmt;
use std::sync::Arc;

use regex::bytes::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RuleError};

/// Traffic direction a rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Keystrokes flowing from the user toward the child.
    Input,
    /// Child output flowing toward the user's terminal.
    Output,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
        }
    }
}

/// A compiled pattern paired with its action.
#[derive(Clone)]
pub struct Rule {
    pattern: Regex,
    action: Arc<dyn RuleAction>,
}

impl Rule {
    /// Compile `pattern` and pair it with `action`.
    pub fn new(
        direction: Direction,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<Self> {
        let compiled = Regex::new(pattern).map_err(|source| RuleError::InvalidPattern {
            direction,
            pattern: pattern.to_string(),
            source,
        })?;

        Ok(Self {
            pattern: compiled,
            action: Arc::new(action),
        })
    }

    /// The source text of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Check whether the pattern matches anywhere in `haystack`.
    pub fn is_match(&self, haystack: &[u8]) -> bool {
        self.pattern.is_match(haystack)
    }

    /// Run the action on the matched text.
    pub fn fire(&self, text: &str) -> Verdict {
        self.action.on_match(text)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .field("action", &"<RuleAction>")
            .finish()
    }
}

/// Two independent, ordered rule lists.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    input: Vec<Rule>,
    output: Vec<Rule>,
}

impl RuleSet {
    /// Create an empty rule set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a rule for `direction`, after every rule already registered there.
    pub fn add(
        &mut self,
        direction: Direction,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<()> {
        let rule = Rule::new(direction, pattern, action)?;
        self.list_mut(direction).push(rule);
        Ok(())
    }

    /// Register an input rule.
    pub fn add_input_rule(
        &mut self,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<()> {
        self.add(Direction::Input, pattern, action)
    }

    /// Register an output rule.
    pub fn add_output_rule(
        &mut self,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<()> {
        self.add(Direction::Output, pattern, action)
    }

    /// Compile and register declarative rules in order.
    ///
    /// Stops at the first invalid pattern; rules before it stay registered.
    pub fn extend_from_specs(&mut self, specs: impl IntoIterator<Item = RuleSpec>) -> Result<()> {
        for spec in specs {
            let direction = spec.direction;
            let rule = spec.compile()?;
            self.list_mut(direction).push(rule);
        }
        Ok(())
    }

    /// Rules for `direction`, in registration order.
    pub fn rules(&self, direction: Direction) -> &[Rule] {
        match direction {
            Direction::Input => &self.input,
            Direction::Output => &self.output,
        }
    }

    /// The first rule for `direction` whose pattern matches `haystack`.
    pub fn first_match(&self, direction: Direction, haystack: &[u8]) -> Option<&Rule> {
        self.rules(direction).iter().find(|rule| rule.is_match(haystack))
    }

    /// Total number of registered rules.
    pub fn len(&self) -> usize {
        self.input.len() + self.output.len()
    }

    /// Check if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn list_mut(&mut self, direction: Direction) -> &mut Vec<Rule> {
        match direction {
            Direction::Input => &mut self.input,
            Direction::Output => &mut self.output,
        }
    }
}
