//! Keystroke pump: user terminal -> child.
//!
//! Bytes are read one at a time and forwarded straight away so echo, cursor
//! movement and line editing stay live. In parallel the pump tracks the
//! logical line being typed. On Enter it runs the input rules against that
//! line and may withhold the Enter byte.

use std::io;
use std::sync::atomic::Ordering;

use log::{debug, trace};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use super::{Interceptor, write_flush};
use crate::channel::{KeyEffect, LineEditor};
use crate::error::{Result, StreamError};
use crate::rule::Direction;

impl Interceptor {
    /// Pump keystrokes from `src` to `dst` until `src` ends.
    ///
    /// Returns `Ok(())` on end of stream. Any other read or write failure
    /// stops this pump only and is returned to the caller.
    ///
    /// Bytes written by rule actions are not fed back through the rules.
    pub async fn handle_input<R, W>(&self, mut src: R, mut dst: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut editor = LineEditor::new();
        let mut byte = [0u8; 1];

        debug!(
            "input pump started with {} rules",
            self.rules.rules(Direction::Input).len()
        );

        loop {
            match src.read(&mut byte).await {
                Ok(0) => {
                    debug!("input pump: end of stream");
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(source) => {
                    return Err(StreamError::Read {
                        direction: Direction::Input,
                        source,
                    }
                    .into());
                }
            }

            let forward = match editor.feed(byte[0]) {
                KeyEffect::Enter(enter) => {
                    let line = editor.candidate();
                    editor.finish_line();
                    self.on_enter(&line, enter, &mut dst).await?
                }
                _ => true,
            };

            if forward {
                write_flush(&mut dst, &byte)
                    .await
                    .map_err(|source| StreamError::Write {
                        direction: Direction::Input,
                        source,
                    })?;
            }
        }
    }

    /// Run the input rules for a finished line.
    ///
    /// Returns whether the Enter byte should be forwarded.
    async fn on_enter<W>(&self, line: &str, enter: u8, dst: &mut W) -> Result<bool>
    where
        W: AsyncWrite + Unpin,
    {
        self.last_enter.store(enter, Ordering::Relaxed);

        let Some(rule) = self.rules.first_match(Direction::Input, line.as_bytes()) else {
            trace!("input line {:?}: no rule matched", line);
            return Ok(true);
        };

        let verdict = rule.fire(line);
        debug!(
            "input rule /{}/ matched {:?} (enter=0x{:02x}, suppress={})",
            rule.pattern(),
            line,
            enter,
            verdict.is_suppressed()
        );
        if let Some(audit) = &self.audit {
            audit.input_match(rule.pattern(), enter, line);
        }

        self.perform(Direction::Input, &verdict, dst).await?;
        Ok(!verdict.is_suppressed())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::bridge::AuditLog;
    use crate::error::{Error, StreamError};
    use crate::rule::{Direction, Verdict};
    use crate::testing::SharedLog;
    use crate::Interceptor;

    /// Record every line an input rule sees.
    fn recorder(
        interceptor: &mut Interceptor,
        pattern: &str,
        verdict: Verdict,
    ) -> Arc<Mutex<Vec<String>>> {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        interceptor
            .add_input_rule(pattern, move |text: &str| {
                sink.lock().unwrap().push(text.to_string());
                verdict.clone()
            })
            .unwrap();
        seen
    }

    #[tokio::test]
    async fn test_unmatched_line_forwards_everything() {
        let mut interceptor = Interceptor::new(None);
        let seen = recorder(&mut interceptor, "^never$", Verdict::suppress());

        let mut dst = Vec::new();
        interceptor.handle_input(&b"echo hi\r"[..], &mut dst).await.unwrap();

        assert_eq!(dst, b"echo hi\r");
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(interceptor.last_enter_byte(), Some(b'\r'));
    }

    #[tokio::test]
    async fn test_suppressed_enter_is_withheld() {
        let mut interceptor = Interceptor::new(None);
        recorder(&mut interceptor, "(?i)^hello$", Verdict::suppress());

        let mut dst = Vec::new();
        interceptor.handle_input(&b"HeLLo\n"[..], &mut dst).await.unwrap();

        assert_eq!(dst, b"HeLLo");
        assert_eq!(interceptor.last_enter_byte(), Some(b'\n'));
    }

    #[tokio::test]
    async fn test_suppressing_rule_injects_reply() {
        let pty = SharedLog::default();
        let mut interceptor = Interceptor::new(None);
        interceptor
            .add_input_rule("(?i)^goodbye$", |_: &str| Verdict::suppress().inject("ok\r"))
            .unwrap();
        interceptor.set_pty_writer(pty.clone()).await;

        let mut dst = Vec::new();
        interceptor.handle_input(&b"goodbye\r"[..], &mut dst).await.unwrap();

        assert_eq!(pty.contents(), "ok\r");
        assert_eq!(dst, b"goodbye");
    }

    #[tokio::test]
    async fn test_pass_verdict_writes_before_enter() {
        let pty = SharedLog::default();
        let mut interceptor = Interceptor::new(None);
        interceptor
            .add_input_rule("^rm ", |_: &str| Verdict::pass().inject(" -i"))
            .unwrap();
        interceptor.set_pty_writer(pty.clone()).await;

        interceptor
            .handle_input(&b"rm x\r"[..], interceptor.pty_writer())
            .await
            .unwrap();

        assert_eq!(pty.contents(), "rm x -i\r");
    }

    #[tokio::test]
    async fn test_buffer_cleared_after_every_enter() {
        let mut interceptor = Interceptor::new(None);
        let seen = recorder(&mut interceptor, ".*", Verdict::pass());

        let mut dst = Vec::new();
        interceptor
            .handle_input(&b"first\rsecond\r\rthird\n"[..], &mut dst)
            .await
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["first", "second", "", "third"]);
        assert_eq!(dst, b"first\rsecond\r\rthird\n");
    }

    #[tokio::test]
    async fn test_escape_sequences_forwarded_but_not_matched() {
        let mut interceptor = Interceptor::new(None);
        let seen = recorder(&mut interceptor, "^hello$", Verdict::pass());

        let typed = b"\x1b[1;5Dhel\x1b[Clo\x1b[0m\r";
        let mut dst = Vec::new();
        interceptor.handle_input(&typed[..], &mut dst).await.unwrap();

        assert_eq!(dst, typed);
        assert_eq!(*seen.lock().unwrap(), vec!["hello"]);
    }

    #[tokio::test]
    async fn test_backspace_and_delete_edit_the_line() {
        let mut interceptor = Interceptor::new(None);
        let seen = recorder(&mut interceptor, ".*", Verdict::pass());

        let typed = b"\x7fhelloo\x7f\r  ab\x08c  \r";
        let mut dst = Vec::new();
        interceptor.handle_input(&typed[..], &mut dst).await.unwrap();

        assert_eq!(dst, typed);
        assert_eq!(*seen.lock().unwrap(), vec!["hello", "ac"]);
    }

    #[tokio::test]
    async fn test_only_first_matching_rule_fires() {
        let mut interceptor = Interceptor::new(None);
        let first = recorder(&mut interceptor, "^git", Verdict::pass());
        let second = recorder(&mut interceptor, "^git push$", Verdict::suppress());

        let mut dst = Vec::new();
        interceptor.handle_input(&b"git push\r"[..], &mut dst).await.unwrap();

        assert_eq!(*first.lock().unwrap(), vec!["git push"]);
        assert!(second.lock().unwrap().is_empty());
        assert_eq!(dst, b"git push\r");
    }

    #[tokio::test]
    async fn test_injection_without_pty_is_skipped() {
        let mut interceptor = Interceptor::new(None);
        interceptor
            .add_input_rule("^x$", |_: &str| Verdict::suppress().inject("y\r"))
            .unwrap();

        let mut dst = Vec::new();
        interceptor.handle_input(&b"x\r"[..], &mut dst).await.unwrap();

        assert_eq!(dst, b"x");
    }

    #[tokio::test]
    async fn test_matches_are_audited() {
        let log = SharedLog::default();
        let mut interceptor = Interceptor::new(Some(AuditLog::new(log.clone())));
        recorder(&mut interceptor, "(?i)^hello$", Verdict::suppress());

        let mut dst = Vec::new();
        interceptor.handle_input(&b"hello\rbye\r"[..], &mut dst).await.unwrap();

        assert_eq!(log.contents(), "[input] matched /(?i)^hello$/ enter=0x0d text=\"hello\"\n");
    }

    #[tokio::test]
    async fn test_read_error_stops_pump() {
        let src = tokio_test::io::Builder::new()
            .read(b"ab")
            .read_error(std::io::Error::other("tty vanished"))
            .build();

        let interceptor = Interceptor::new(None);
        let mut dst = Vec::new();
        let err = interceptor.handle_input(src, &mut dst).await.unwrap_err();

        assert!(matches!(err, Error::Stream(StreamError::Read { .. })));
        assert_eq!(dst, b"ab");
    }

    #[tokio::test]
    async fn test_write_error_stops_pump() {
        let dst = tokio_test::io::Builder::new()
            .write(b"a")
            .write_error(std::io::Error::other("child gone"))
            .build();

        let interceptor = Interceptor::new(None);
        let err = interceptor.handle_input(&b"ab\r"[..], dst).await.unwrap_err();

        assert!(matches!(
            err,
            Error::Stream(StreamError::Write { direction: Direction::Input, .. })
        ));
        assert_eq!(interceptor.last_enter_byte(), None);
    }
}
