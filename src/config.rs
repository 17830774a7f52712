//! Configuration for staging buffers.
//!
//! - [`BufferConfig`] - Chunk count bound and default chunk size

use crate::error::BufferError;

/// Default maximum number of live chunks per buffer.
pub const DEFAULT_MAX_CHUNKS: usize = 4;

/// Default chunk size (1 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Tunables for a [`StagingBuffer`](crate::StagingBuffer).
///
/// `max_chunks` is the back-pressure bound: once that many chunks are alive,
/// any reservation that needs a fresh chunk is refused. `chunk_size` is the
/// capacity of every newly allocated chunk, except for exact-size requests
/// larger than it, which get a chunk sized to the request.
///
/// Both values must be non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferConfig {
    max_chunks: usize,
    chunk_size: usize,
}

impl BufferConfig {
    /// Creates a new configuration.
    ///
    /// Returns error if either value is zero.
    pub fn new(max_chunks: usize, chunk_size: usize) -> Result<Self, BufferError> {
        if max_chunks == 0 {
            return Err(BufferError::InvalidConfig {
                message: "max_chunks must be non-zero",
            });
        }

        if chunk_size == 0 {
            return Err(BufferError::InvalidConfig {
                message: "chunk_size must be non-zero",
            });
        }

        Ok(Self {
            max_chunks,
            chunk_size,
        })
    }

    /// Sets the maximum number of live chunks.
    pub fn with_max_chunks(mut self, max_chunks: usize) -> Self {
        self.max_chunks = max_chunks;
        self
    }

    /// Sets the default chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Returns the maximum number of live chunks.
    pub fn max_chunks(&self) -> usize {
        self.max_chunks
    }

    /// Returns the default chunk size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Validates the current configuration.
    pub fn validate(&self) -> Result<(), BufferError> {
        Self::new(self.max_chunks, self.chunk_size).map(|_| ())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            max_chunks: DEFAULT_MAX_CHUNKS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}
