//! Builder for creating interceptors.

use tokio::io::AsyncWrite;

use super::{Interceptor, InterceptorConfig};
use crate::bridge::{AuditLog, BoxedWriter, PtyBridge};
use crate::error::{Error, Result};
use crate::rule::{Direction, RuleAction, RuleSet, RuleSpec};

/// Builder for constructing an [`Interceptor`].
///
/// Rules are compiled as they are added; the first invalid pattern is
/// reported by [`build`](Self::build).
///
/// # Example
///
/// ```rust
/// use ttyhook::{Interceptor, Verdict};
///
/// let interceptor = Interceptor::builder()
///     .window_capacity(4096)
///     .input_rule(r"(?i)^hello$", |_: &str| Verdict::suppress())
///     .output_rule(r"\[y/N\]\s*$", |_: &str| Verdict::pass().inject("n\r"))
///     .build()
///     .unwrap();
///
/// assert_eq!(interceptor.rules().len(), 2);
/// ```
#[derive(Default)]
pub struct InterceptorBuilder {
    config: InterceptorConfig,
    audit: Option<AuditLog>,
    pty: Option<BoxedWriter>,
    rules: RuleSet,
    error: Option<Error>,
}

impl InterceptorBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output window capacity in bytes (default: 1000).
    pub fn window_capacity(mut self, bytes: usize) -> Self {
        self.config.window_capacity = bytes;
        self
    }

    /// Set the maximum size of a single output read (default: 1024).
    pub fn read_chunk_size(mut self, bytes: usize) -> Self {
        self.config.read_chunk_size = bytes;
        self
    }

    /// Record rule hits and raw output to `audit`.
    pub fn audit_log(mut self, audit: AuditLog) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Attach the child's input stream up front.
    pub fn pty_writer(mut self, writer: impl AsyncWrite + Send + Unpin + 'static) -> Self {
        self.pty_writer_boxed(Box::new(writer))
    }

    /// Attach an already boxed child input stream up front.
    pub fn pty_writer_boxed(mut self, writer: BoxedWriter) -> Self {
        self.pty = Some(writer);
        self
    }

    /// Add an input rule.
    pub fn input_rule(self, pattern: &str, action: impl RuleAction + 'static) -> Self {
        self.rule(Direction::Input, pattern, action)
    }

    /// Add an output rule.
    pub fn output_rule(self, pattern: &str, action: impl RuleAction + 'static) -> Self {
        self.rule(Direction::Output, pattern, action)
    }

    /// Add declarative rules.
    pub fn rules(mut self, specs: impl IntoIterator<Item = RuleSpec>) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.rules.extend_from_specs(specs) {
                self.error = Some(e);
            }
        }
        self
    }

    fn rule(
        mut self,
        direction: Direction,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.rules.add(direction, pattern, action) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Build the interceptor.
    ///
    /// Fails with the first rule registration error, if any.
    pub fn build(self) -> Result<Interceptor> {
        if let Some(e) = self.error {
            return Err(e);
        }

        let mut interceptor = Interceptor::with_config(self.config, self.audit);
        interceptor.rules = self.rules;
        if let Some(writer) = self.pty {
            interceptor.pty = PtyBridge::with_boxed(writer);
        }
        Ok(interceptor)
    }
}
