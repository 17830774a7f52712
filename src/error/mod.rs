//! Error types for confbuf.

use std::fmt;
use std::io;

/// Errors that can occur while staging bytes.
///
/// Reading from an empty buffer is not an error; it yields a zero-length run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A new chunk was required but the chunk-count bound is reached.
    ResourceExhausted {
        /// The configured bound.
        max_chunks: usize,
    },

    /// Memory for a new chunk could not be allocated.
    AllocationFailure {
        /// The chunk capacity that was attempted.
        size: usize,
    },

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The control channel has been shut down.
    ChannelClosed,
}

impl BufferError {
    /// Returns true if the caller may retry once space has been drained.
    ///
    /// Both exhaustion and allocation failure mean "cannot reserve space now".
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BufferError::ResourceExhausted { .. } | BufferError::AllocationFailure { .. }
        )
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::ResourceExhausted { max_chunks } => {
                write!(f, "buffer exhausted: {} chunks in use", max_chunks)
            }
            BufferError::AllocationFailure { size } => {
                write!(f, "failed to allocate {} byte chunk", size)
            }
            BufferError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            BufferError::ChannelClosed => write!(f, "channel closed"),
        }
    }
}

impl std::error::Error for BufferError {}

impl From<BufferError> for io::Error {
    fn from(e: BufferError) -> Self {
        let kind = match e {
            BufferError::ResourceExhausted { .. } => io::ErrorKind::WouldBlock,
            BufferError::AllocationFailure { .. } => io::ErrorKind::OutOfMemory,
            BufferError::InvalidConfig { .. } => io::ErrorKind::InvalidInput,
            BufferError::ChannelClosed => io::ErrorKind::BrokenPipe,
        };
        io::Error::new(kind, e)
    }
}
