//! Error types for ttyhook.

use std::io;
use thiserror::Error;

use crate::rule::Direction;

/// Main error type for ttyhook operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Rule registration errors
    #[error("Rule error: {0}")]
    Rule(#[from] RuleError),

    /// Stream errors raised by a running pump
    #[error("Stream error: {0}")]
    Stream(#[from] StreamError),
}

/// Rule registration errors.
///
/// These surface synchronously when a rule is added, before any traffic flows.
#[derive(Error, Debug)]
pub enum RuleError {
    /// Pattern failed to compile
    #[error("Invalid {direction} rule pattern '{pattern}': {source}")]
    InvalidPattern {
        direction: Direction,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Stream errors (read/write failures on either direction).
#[derive(Error, Debug)]
pub enum StreamError {
    /// Reading from the pump's source failed
    #[error("{direction} read failed: {source}")]
    Read {
        direction: Direction,
        #[source]
        source: io::Error,
    },

    /// Writing to the pump's destination failed
    #[error("{direction} write failed: {source}")]
    Write {
        direction: Direction,
        #[source]
        source: io::Error,
    },

    /// Injecting action bytes into the PTY failed
    #[error("PTY injection failed: {0}")]
    Inject(#[source] io::Error),
}

/// Result type alias using ttyhook's Error.
pub type Result<T> = std::result::Result<T, Error>;
