//! Audit trail of rule hits and raw child output.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use log::warn;

/// Shared, append-only log sink.
///
/// Both pumps write here concurrently; a single mutex serializes them so
/// lines are never interleaved. Write failures are logged and dropped,
/// they never stop a pump.
#[derive(Clone)]
pub struct AuditLog {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl AuditLog {
    /// Wrap a writer (typically a file) as an audit log.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Record an input rule hit, including the Enter byte that triggered it.
    pub fn input_match(&self, pattern: &str, enter: u8, text: &str) {
        self.write(
            format!("[input] matched /{pattern}/ enter=0x{enter:02x} text={text:?}\n").as_bytes(),
        );
    }

    /// Record an output rule hit.
    pub fn output_match(&self, pattern: &str) {
        self.write(format!("[output] matched /{pattern}/\n").as_bytes());
    }

    /// Mirror a raw output chunk verbatim.
    pub fn mirror(&self, chunk: &[u8]) {
        self.write(chunk);
    }

    fn write(&self, bytes: &[u8]) {
        let Ok(mut sink) = self.sink.lock() else {
            warn!("audit log lock poisoned, dropping {} bytes", bytes.len());
            return;
        };
        if let Err(e) = sink.write_all(bytes).and_then(|_| sink.flush()) {
            warn!("audit log write failed: {}", e);
        }
    }
}

impl fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditLog").finish_non_exhaustive()
    }
}
