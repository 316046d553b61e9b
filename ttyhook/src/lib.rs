//! # ttyhook
//!
//! Pattern-based interception of interactive terminal sessions.
//!
//! ttyhook sits between a user's terminal and a child process running on a
//! pseudo-terminal. It lets rules inspect and rewrite traffic in both
//! directions without breaking echo, cursor movement or line editing.
//!
//! ## Features
//!
//! - Input rules evaluated on Enter against the logical line typed so far,
//!   with escape sequences and backspace handled byte by byte
//! - Output rules evaluated continuously over a bounded sliding window, so
//!   matches spanning reads are caught
//! - First-match-wins rule lists, compiled at registration time
//! - Actions return a [`Verdict`]: bytes to inject into the child, bytes to
//!   forward, pauses, and whether to withhold the Enter key
//! - Declarative rules via serde ([`rule::RuleSpec`])
//! - Optional audit log of rule hits and raw output
//!
//! Spawning the child and allocating its PTY are left to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ttyhook::{Interceptor, Verdict};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut child = tokio::process::Command::new("sh")
//!         .stdin(std::process::Stdio::piped())
//!         .stdout(std::process::Stdio::piped())
//!         .spawn()?;
//!     let child_in = child.stdin.take().ok_or("no stdin")?;
//!     let child_out = child.stdout.take().ok_or("no stdout")?;
//!
//!     let mut interceptor = Interceptor::new(None);
//!     interceptor.add_input_rule(r"(?i)^hello$", |_: &str| {
//!         Verdict::suppress().inject("echo hi there\r")
//!     })?;
//!     interceptor.set_pty_writer(child_in).await;
//!
//!     let (input, output) = tokio::join!(
//!         interceptor.handle_input(tokio::io::stdin(), interceptor.pty_writer()),
//!         interceptor.handle_output(child_out, tokio::io::stdout()),
//!     );
//!     input?;
//!     output?;
//!     Ok(())
//! }
//! ```

pub mod bridge;
pub mod channel;
pub mod error;
pub mod interceptor;
pub mod rule;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use bridge::{AuditLog, PtyBridge, PtyWriter};
pub use error::Error;
pub use interceptor::{Interceptor, InterceptorBuilder, InterceptorConfig};
pub use rule::{Direction, Rule, RuleAction, RuleSet, Step, Verdict};
