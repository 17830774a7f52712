//! Control channel - a pair of staging buffers behind one lock.
//!
//! The peer's writes land in the `input` buffer; an [`Interpreter`] turns
//! input into replies in the `output` buffer; the peer's reads drain
//! `output`. The interpreter also runs one last time on shutdown, before
//! both buffers are destroyed, so nothing buffered is dropped unseen.
//!
//! # Example
//!
//! ```
//! use confbuf::{BufferConfig, ControlChannel, Interpreter, StagingBuffer};
//!
//! struct Echo;
//!
//! impl Interpreter for Echo {
//!     fn interpret(&mut self, input: &mut StagingBuffer, output: &mut StagingBuffer) {
//!         while let Ok(region) = output.reserve_short(input.len()) {
//!             if region.is_empty() {
//!                 break;
//!             }
//!             input.read_into(region);
//!         }
//!     }
//! }
//!
//! let channel = ControlChannel::with_interpreter(BufferConfig::default(), Echo);
//! channel.write(b"ping")?;
//! channel.parse();
//!
//! let mut reply = [0u8; 4];
//! assert_eq!(channel.read(&mut reply), 4);
//! assert_eq!(&reply, b"ping");
//! # Ok::<(), confbuf::BufferError>(())
//! ```

use parking_lot::Mutex;
use tracing::debug;

use crate::buffer::StagingBuffer;
use crate::config::BufferConfig;
use crate::error::BufferError;

/// Consumes buffered input and produces output.
///
/// Called with the channel lock held, so it sees both buffers in a
/// consistent state and must not block.
pub trait Interpreter: Send {
    /// Processes whatever is buffered in `input`, writing replies to `output`.
    fn interpret(&mut self, input: &mut StagingBuffer, output: &mut StagingBuffer);
}

/// An interpreter that leaves both buffers untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInterpreter;

impl Interpreter for NoopInterpreter {
    fn interpret(&mut self, _input: &mut StagingBuffer, _output: &mut StagingBuffer) {}
}

/// Buffered byte counts and chunk usage of a channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ChannelStats {
    /// Unread bytes waiting in the input buffer.
    pub input_bytes: usize,
    /// Live chunks in the input buffer.
    pub input_chunks: usize,
    /// Unread bytes waiting in the output buffer.
    pub output_bytes: usize,
    /// Live chunks in the output buffer.
    pub output_chunks: usize,
}

#[derive(Debug)]
struct ChannelState<I> {
    input: StagingBuffer,
    output: StagingBuffer,
    interpreter: I,
    closed: bool,
}

impl<I: Interpreter> ChannelState<I> {
    fn parse(&mut self) {
        self.interpreter.interpret(&mut self.input, &mut self.output);
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }

        self.parse();
        self.input.destroy();
        self.output.destroy();
        self.closed = true;
        debug!("control channel shut down");
    }
}

/// A bidirectional control channel built from two staging buffers.
///
/// Both directions share a single mutex, matching the staging buffer's
/// contract that the caller serializes every access. All methods take
/// `&self`, so the channel can be shared between threads behind an `Arc`.
#[derive(Debug)]
pub struct ControlChannel<I: Interpreter = NoopInterpreter> {
    state: Mutex<ChannelState<I>>,
}

impl ControlChannel<NoopInterpreter> {
    /// Creates a channel whose interpreter does nothing.
    pub fn new(config: BufferConfig) -> Self {
        Self::with_interpreter(config, NoopInterpreter)
    }
}

impl<I: Interpreter> ControlChannel<I> {
    /// Creates a channel; both directions use `config`.
    pub fn with_interpreter(config: BufferConfig, interpreter: I) -> Self {
        Self {
            state: Mutex::new(ChannelState {
                input: StagingBuffer::new(config),
                output: StagingBuffer::new(config),
                interpreter,
                closed: false,
            }),
        }
    }

    /// Stages bytes written by the peer.
    ///
    /// Returns how many bytes were accepted, which may be fewer than
    /// `data.len()` when the input buffer fills up.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ChannelClosed`] after [`shutdown`](Self::shutdown).
    /// - [`BufferError::ResourceExhausted`] or
    ///   [`BufferError::AllocationFailure`] if no byte fit; try again once
    ///   the interpreter has drained input.
    pub fn write(&self, data: &[u8]) -> Result<usize, BufferError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(BufferError::ChannelClosed);
        }
        state.input.append(data)
    }

    /// Copies pending replies into `out`.
    ///
    /// Returns 0 when no reply is buffered right now, or when the channel
    /// is closed.
    pub fn read(&self, out: &mut [u8]) -> usize {
        self.state.lock().output.read_into(out)
    }

    /// Runs the interpreter over the buffered input.
    pub fn parse(&self) {
        let mut state = self.state.lock();
        if !state.closed {
            state.parse();
        }
    }

    /// Gives the interpreter a last pass, then releases both buffers.
    ///
    /// Subsequent calls are no-ops.
    pub fn shutdown(&self) {
        self.state.lock().shutdown();
    }

    /// Returns true once the channel has been shut down.
    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    /// Runs `f` with both buffers under the channel lock.
    pub fn with_buffers<R>(
        &self,
        f: impl FnOnce(&mut StagingBuffer, &mut StagingBuffer) -> R,
    ) -> R {
        let mut state = self.state.lock();
        let state = &mut *state;
        f(&mut state.input, &mut state.output)
    }

    /// Returns current buffer usage.
    pub fn stats(&self) -> ChannelStats {
        let state = self.state.lock();
        ChannelStats {
            input_bytes: state.input.len(),
            input_chunks: state.input.chunk_count(),
            output_bytes: state.output.len(),
            output_chunks: state.output.chunk_count(),
        }
    }
}

impl<I: Interpreter> Drop for ControlChannel<I> {
    fn drop(&mut self) {
        self.state.get_mut().shutdown();
    }
}
