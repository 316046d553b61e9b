//! Child output pump: child -> user terminal.
//!
//! Output is matched continuously rather than per line. Each chunk is added
//! to a bounded sliding window and the output rules run against the whole
//! window, so a pattern split across reads is still found. After a match
//! the window is emptied, which stops the same occurrence from firing twice
//! while still letting a later occurrence fire again.

use std::io;

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use super::{Interceptor, write_flush};
use crate::channel::OutputWindow;
use crate::error::{Result, StreamError};
use crate::rule::Direction;

impl Interceptor {
    /// Pump child output from `src` to `dst` until `src` ends.
    ///
    /// Every chunk is forwarded unchanged and mirrored to the audit log,
    /// whether or not a rule fired. Returns `Ok(())` on end of stream.
    pub async fn handle_output<R, W>(&self, mut src: R, mut dst: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut window = OutputWindow::new(self.config.window_capacity);
        let mut chunk = vec![0u8; self.config.read_chunk_size];

        debug!(
            "output pump started with {} rules",
            self.rules.rules(Direction::Output).len()
        );

        loop {
            let n = match src.read(&mut chunk).await {
                Ok(0) => {
                    debug!("output pump: end of stream");
                    return Ok(());
                }
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(StreamError::Read {
                        direction: Direction::Output,
                        source,
                    }
                    .into());
                }
            };
            let data = &chunk[..n];

            window.extend(data);

            if let Some(rule) = self.rules.first_match(Direction::Output, window.as_slice()) {
                let text = window.as_str_lossy().into_owned();
                window.clear();

                let verdict = rule.fire(&text);
                debug!("output rule /{}/ matched", rule.pattern());
                if let Some(audit) = &self.audit {
                    audit.output_match(rule.pattern());
                }
                self.perform(Direction::Output, &verdict, &mut dst).await?;
            }

            write_flush(&mut dst, data)
                .await
                .map_err(|source| StreamError::Write {
                    direction: Direction::Output,
                    source,
                })?;
            if let Some(audit) = &self.audit {
                audit.mirror(data);
            }

            trace!("output chunk: {} bytes, window: {} bytes", n, window.len());
        }
    }
}
