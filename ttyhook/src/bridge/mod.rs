//! Shared sinks used by both pumps.
//!
//! The input and output pumps run concurrently and share exactly two
//! things: the [`PtyBridge`] standing for the child's input, and the
//! optional [`AuditLog`].

mod audit;
mod pty;

pub use audit::AuditLog;
pub use pty::{BoxedWriter, PtyBridge, PtyWriter};
