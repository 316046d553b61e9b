//! The interception engine.
//!
//! An [`Interceptor`] owns the rules, the PTY bridge and the audit log for
//! one bridged terminal session. Its two pumps,
//! [`handle_input`](Interceptor::handle_input) and
//! [`handle_output`](Interceptor::handle_output), borrow it immutably and are
//! meant to run concurrently for the life of the session.

mod builder;
mod input;
mod output;

pub use builder::InterceptorBuilder;

use std::io;
use std::sync::atomic::{AtomicU8, Ordering};

use log::warn;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::bridge::{AuditLog, PtyBridge, PtyWriter};
use crate::channel::DEFAULT_WINDOW_CAPACITY;
use crate::error::{Result, StreamError};
use crate::rule::{Direction, RuleAction, RuleSet, RuleSpec, Step, Verdict};

/// Default size of a single output read.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 1024;

/// Tunables for an [`Interceptor`].
#[derive(Debug, Clone)]
pub struct InterceptorConfig {
    /// Bytes of recent output that output rules are matched against.
    pub window_capacity: usize,

    /// Maximum bytes read from the child per output read.
    pub read_chunk_size: usize,
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self {
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Terminal I/O interception engine for one session.
///
/// # Example
///
/// ```rust,no_run
/// use ttyhook::{Interceptor, Verdict};
///
/// # use tokio::process::{ChildStdin, ChildStdout};
/// # async fn example(child_in: ChildStdin, child_out: ChildStdout) -> Result<(), ttyhook::Error> {
/// let mut interceptor = Interceptor::new(None);
/// interceptor.add_input_rule(r"(?i)^goodbye$", |_: &str| Verdict::suppress().inject("exit\r"))?;
/// interceptor.set_pty_writer(child_in).await;
///
/// let (input, output) = tokio::join!(
///     interceptor.handle_input(tokio::io::stdin(), interceptor.pty_writer()),
///     interceptor.handle_output(child_out, tokio::io::stdout()),
/// );
/// input?;
/// output?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Interceptor {
    config: InterceptorConfig,
    rules: RuleSet,
    pty: PtyBridge,
    audit: Option<AuditLog>,

    /// Last Enter byte seen by the input pump; 0 until the first Enter.
    last_enter: AtomicU8,
}

impl Interceptor {
    /// Create an engine with default settings, logging to `audit` if given.
    pub fn new(audit: Option<AuditLog>) -> Self {
        Self::with_config(InterceptorConfig::default(), audit)
    }

    /// Create an engine with explicit settings.
    pub fn with_config(mut config: InterceptorConfig, audit: Option<AuditLog>) -> Self {
        config.window_capacity = config.window_capacity.max(1);
        config.read_chunk_size = config.read_chunk_size.max(1);
        Self {
            config,
            rules: RuleSet::new(),
            pty: PtyBridge::new(),
            audit,
            last_enter: AtomicU8::new(0),
        }
    }

    /// Start building an engine.
    pub fn builder() -> InterceptorBuilder {
        InterceptorBuilder::new()
    }

    /// Register an input rule, evaluated when Enter is pressed.
    ///
    /// Fails immediately if `pattern` is not a valid regex.
    pub fn add_input_rule(
        &mut self,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<()> {
        self.rules.add_input_rule(pattern, action)
    }

    /// Register an output rule, evaluated against the output window.
    ///
    /// Fails immediately if `pattern` is not a valid regex.
    pub fn add_output_rule(
        &mut self,
        pattern: &str,
        action: impl RuleAction + 'static,
    ) -> Result<()> {
        self.rules.add_output_rule(pattern, action)
    }

    /// Register declarative rules, in order.
    pub fn load_rules(&mut self, specs: impl IntoIterator<Item = RuleSpec>) -> Result<()> {
        self.rules.extend_from_specs(specs)
    }

    /// Attach the child's input stream. Must happen before any rule injects.
    pub async fn set_pty_writer(&self, writer: impl AsyncWrite + Send + Unpin + 'static) {
        self.pty.attach(writer).await;
    }

    /// A handle to the child's input, usable as the input pump's destination.
    ///
    /// Keystrokes written through it are serialized with rule injections.
    pub fn pty_writer(&self) -> PtyWriter {
        self.pty.writer()
    }

    /// Get the PTY bridge.
    pub fn pty(&self) -> &PtyBridge {
        &self.pty
    }

    /// The most recent `\r` or `\n` seen by the input pump.
    pub fn last_enter_byte(&self) -> Option<u8> {
        match self.last_enter.load(Ordering::Relaxed) {
            0 => None,
            b => Some(b),
        }
    }

    /// Get the registered rules.
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Get the configuration.
    pub fn config(&self) -> &InterceptorConfig {
        &self.config
    }

    /// Perform a verdict's steps in order.
    async fn perform<W>(&self, direction: Direction, verdict: &Verdict, dst: &mut W) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        for step in verdict.steps() {
            match step {
                Step::Inject(bytes) => self.inject(bytes).await?,
                Step::Forward(bytes) => write_flush(dst, bytes)
                    .await
                    .map_err(|source| StreamError::Write { direction, source })?,
                Step::Pause(duration) => tokio::time::sleep(*duration).await,
            }
        }
        Ok(())
    }

    /// Write action bytes into the child. Skipped with a warning while detached.
    async fn inject(&self, bytes: &[u8]) -> Result<()> {
        match self.pty.write_all(bytes).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotConnected => {
                warn!("no PTY writer attached, dropping {} injected bytes", bytes.len());
                Ok(())
            }
            Err(e) => Err(StreamError::Inject(e).into()),
        }
    }
}

impl Default for Interceptor {
    fn default() -> Self {
        Self::new(None)
    }
}

async fn write_flush<W>(dst: &mut W, bytes: &[u8]) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    dst.write_all(bytes).await?;
    dst.flush().await
}
