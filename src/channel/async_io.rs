//! Async adapter for [`ControlChannel`].
//!
//! Uses `futures_io::AsyncRead`/`AsyncWrite`, so it works with any runtime.
//! The interpreter runs after every accepted write and after every read
//! that freed output space. Back-pressure turns into `Poll::Pending`:
//!
//! - a write refused for lack of chunks parks until a read drains output
//!   (which lets the interpreter drain input);
//! - a read with nothing buffered parks until the next write, or returns
//!   `Ok(0)` once the channel is closed.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::io::{AsyncReadExt, AsyncWriteExt};
//! use confbuf::{AsyncControlChannel, BufferConfig};
//!
//! async fn demo(channel: AsyncControlChannel<Echo>) -> std::io::Result<()> {
//!     let mut channel = channel;
//!     channel.write_all(b"ping").await?;
//!
//!     let mut reply = [0u8; 4];
//!     channel.read_exact(&mut reply).await?;
//!     Ok(())
//! }
//! ```

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, Waker};

use futures_io::{AsyncRead, AsyncWrite};
use parking_lot::Mutex;
use tracing::trace;

use super::control::{ControlChannel, Interpreter, NoopInterpreter};
use crate::config::BufferConfig;

/// Wakers parked by back-pressure.
#[derive(Debug, Default)]
struct Parked {
    reader: Option<Waker>,
    writer: Option<Waker>,
}

/// A [`ControlChannel`] usable as an async byte stream.
///
/// Implements `AsyncRead` and `AsyncWrite` both for the channel itself and
/// for shared references to it, so one task can write while another reads
/// through an `Arc`.
#[derive(Debug)]
pub struct AsyncControlChannel<I: Interpreter = NoopInterpreter> {
    channel: ControlChannel<I>,
    // Held across every channel operation so a waker is never parked after
    // the event that should have woken it.
    parked: Mutex<Parked>,
}

impl AsyncControlChannel<NoopInterpreter> {
    /// Creates an async channel whose interpreter does nothing.
    pub fn new(config: BufferConfig) -> Self {
        Self::from_channel(ControlChannel::new(config))
    }
}

impl<I: Interpreter> AsyncControlChannel<I> {
    /// Creates an async channel with the given interpreter.
    pub fn with_interpreter(config: BufferConfig, interpreter: I) -> Self {
        Self::from_channel(ControlChannel::with_interpreter(config, interpreter))
    }

    /// Wraps an existing channel.
    pub fn from_channel(channel: ControlChannel<I>) -> Self {
        Self {
            channel,
            parked: Mutex::new(Parked::default()),
        }
    }

    /// Returns the wrapped channel.
    pub fn channel(&self) -> &ControlChannel<I> {
        &self.channel
    }

    fn poll_write_shared(&self, cx: &mut Context<'_>, buf: &[u8]) -> Poll<io::Result<usize>> {
        let mut parked = self.parked.lock();

        let result = match self.channel.write(buf) {
            Err(e) if e.is_retryable() => {
                // The interpreter may be able to make room.
                self.channel.parse();
                self.channel.write(buf)
            }
            other => other,
        };

        match result {
            Ok(n) => {
                self.channel.parse();
                if let Some(reader) = parked.reader.take() {
                    reader.wake();
                }
                Poll::Ready(Ok(n))
            }
            Err(e) if e.is_retryable() => {
                trace!(len = buf.len(), "write parked on back-pressure");
                parked.writer = Some(cx.waker().clone());
                Poll::Pending
            }
            Err(e) => Poll::Ready(Err(e.into())),
        }
    }

    fn poll_read_shared(&self, cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<io::Result<usize>> {
        if buf.is_empty() {
            return Poll::Ready(Ok(0));
        }

        let mut parked = self.parked.lock();

        let n = self.channel.read(buf);
        if n > 0 {
            self.channel.parse();
            if let Some(writer) = parked.writer.take() {
                writer.wake();
            }
            return Poll::Ready(Ok(n));
        }

        if self.channel.is_closed() {
            return Poll::Ready(Ok(0));
        }

        trace!("read parked, nothing buffered");
        parked.reader = Some(cx.waker().clone());
        Poll::Pending
    }

    fn poll_close_shared(&self) -> Poll<io::Result<()>> {
        let mut parked = self.parked.lock();
        self.channel.shutdown();

        if let Some(reader) = parked.reader.take() {
            reader.wake();
        }
        if let Some(writer) = parked.writer.take() {
            writer.wake();
        }
        Poll::Ready(Ok(()))
    }
}

impl<I: Interpreter> AsyncWrite for AsyncControlChannel<I> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.poll_write_shared(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_close_shared()
    }
}

impl<I: Interpreter> AsyncRead for AsyncControlChannel<I> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        self.poll_read_shared(cx, buf)
    }
}

impl<I: Interpreter> AsyncWrite for &AsyncControlChannel<I> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.poll_write_shared(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        self.poll_close_shared()
    }
}

impl<I: Interpreter> AsyncRead for &AsyncControlChannel<I> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut [u8],
    ) -> Poll<io::Result<usize>> {
        self.poll_read_shared(cx, buf)
    }
}
