//! Handle to the child's input stream.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A boxed async writer, as accepted by [`PtyBridge::attach_boxed`].
pub type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;

type Slot = Option<BoxedWriter>;

/// Shared owner of the child's input.
///
/// Every write into the child, whether a forwarded keystroke or a rule
/// injection, goes through one async mutex. A writer holds it for a whole
/// write-then-flush, so only one task at a time ever polls the inner writer
/// and injected sequences are never interleaved with keystrokes.
///
/// Writing while no writer is attached fails with
/// [`io::ErrorKind::NotConnected`].
#[derive(Clone, Default)]
pub struct PtyBridge {
    slot: Arc<Mutex<Slot>>,
}

impl PtyBridge {
    /// Create a bridge with no writer attached.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bridge already attached to `writer`.
    pub fn with_boxed(writer: BoxedWriter) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(writer))),
        }
    }

    /// Attach the child's input, replacing any previous writer.
    ///
    /// Waits for an in-flight write to finish first.
    pub async fn attach(&self, writer: impl AsyncWrite + Send + Unpin + 'static) {
        self.attach_boxed(Box::new(writer)).await;
    }

    /// Attach an already boxed writer.
    pub async fn attach_boxed(&self, writer: BoxedWriter) {
        *self.slot.lock().await = Some(writer);
    }

    /// Detach and return the current writer, if any.
    pub async fn detach(&self) -> Option<BoxedWriter> {
        self.slot.lock().await.take()
    }

    /// Check if a writer is attached.
    pub async fn is_attached(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Write `bytes` and flush while holding the bridge.
    pub async fn write_all(&self, bytes: &[u8]) -> io::Result<()> {
        let mut slot = self.slot.lock().await;
        let writer = (*slot).as_mut().ok_or_else(detached)?;
        writer.write_all(bytes).await?;
        writer.flush().await
    }

    /// A streaming handle, usable wherever an [`AsyncWrite`] is expected.
    pub fn writer(&self) -> PtyWriter {
        PtyWriter {
            slot: Arc::clone(&self.slot),
            state: WriteState::Idle,
        }
    }
}

impl std::fmt::Debug for PtyBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let attached = self.slot.try_lock().map(|slot| slot.is_some()).ok();
        f.debug_struct("PtyBridge")
            .field("attached", &attached)
            .finish()
    }
}

fn detached() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "PTY writer not attached")
}

type LockFuture = Pin<Box<dyn Future<Output = OwnedMutexGuard<Slot>> + Send>>;

enum WriteState {
    Idle,
    Locking(LockFuture),
    Locked(OwnedMutexGuard<Slot>),
}

/// [`AsyncWrite`] handle onto a [`PtyBridge`].
///
/// The bridge is taken on the first write and released when the write is
/// flushed, shut down or fails. Always flush after writing, or other
/// handles stay blocked.
pub struct PtyWriter {
    slot: Arc<Mutex<Slot>>,
    state: WriteState,
}

impl PtyWriter {
    fn poll_lock(&mut self, cx: &mut Context<'_>) -> Poll<()> {
        loop {
            match &mut self.state {
                WriteState::Idle => {
                    let lock = Arc::clone(&self.slot).lock_owned();
                    self.state = WriteState::Locking(Box::pin(lock));
                }
                WriteState::Locking(lock) => {
                    let guard = ready!(lock.as_mut().poll(cx));
                    self.state = WriteState::Locked(guard);
                }
                WriteState::Locked(_) => return Poll::Ready(()),
            }
        }
    }

    fn locked_writer(&mut self) -> Option<&mut BoxedWriter> {
        match &mut self.state {
            WriteState::Locked(guard) => (**guard).as_mut(),
            _ => None,
        }
    }

    fn release(&mut self) {
        self.state = WriteState::Idle;
    }
}

impl AsyncWrite for PtyWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_lock(cx));
        let result = match this.locked_writer() {
            Some(writer) => ready!(Pin::new(writer).poll_write(cx, buf)),
            None => Err(detached()),
        };
        if result.is_err() {
            this.release();
        }
        Poll::Ready(result)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_lock(cx));
        let result = match this.locked_writer() {
            Some(writer) => ready!(Pin::new(writer).poll_flush(cx)),
            None => Err(detached()),
        };
        this.release();
        Poll::Ready(result)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_lock(cx));
        let result = match this.locked_writer() {
            Some(writer) => ready!(Pin::new(writer).poll_shutdown(cx)),
            None => Ok(()),
        };
        this.release();
        Poll::Ready(result)
    }
}

impl std::fmt::Debug for PtyWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.state {
            WriteState::Idle => "idle",
            WriteState::Locking(_) => "locking",
            WriteState::Locked(_) => "locked",
        };
        f.debug_struct("PtyWriter").field("state", &state).finish()
    }
}
