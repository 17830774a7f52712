//! The staging buffer - chunk allocation on the write side, drain and
//! release on the read side.
//!
//! Producers reserve contiguous regions at the tail with
//! [`StagingBuffer::reserve_write`]; consumers take contiguous runs from the
//! head with [`StagingBuffer::peek_read`]. Both calls move their cursor
//! immediately, so the caller fills (or copies out of) the returned region
//! before touching the buffer again.
//!
//! # Example
//!
//! ```
//! use confbuf::{BufferConfig, StagingBuffer};
//!
//! let mut buf = StagingBuffer::new(BufferConfig::new(2, 8)?);
//!
//! buf.reserve_write(5, false)?.copy_from_slice(b"hello");
//! assert_eq!(buf.peek_read(100), b"hello");
//! assert!(buf.peek_read(100).is_empty());
//! # Ok::<(), confbuf::BufferError>(())
//! ```

use std::ops::Range;

use tracing::{debug, trace};

use crate::chunk::{Chunk, ChunkChain};
use crate::config::BufferConfig;
use crate::error::BufferError;

/// A bounded byte queue made of a chain of heap chunks.
///
/// Bytes are appended at the tail and consumed at the head, strictly in
/// order. At most [`max_chunks`](BufferConfig::max_chunks) chunks are alive at
/// once; when a reservation needs one more, it fails with
/// [`BufferError::ResourceExhausted`] and the buffered data is left untouched.
///
/// # Concurrency
///
/// `StagingBuffer` does no locking. Producer and consumer both mutate the
/// cursors and the chain, so a buffer shared between threads must sit behind
/// a single lock covering both paths (see
/// [`ControlChannel`](crate::ControlChannel)).
#[derive(Debug)]
pub struct StagingBuffer {
    chain: ChunkChain,
    write_offset: usize,
    read_offset: usize,
    config: BufferConfig,
}

impl StagingBuffer {
    /// Creates an empty buffer. No chunk is allocated until the first write.
    ///
    /// # Example
    ///
    /// ```
    /// use confbuf::{BufferConfig, StagingBuffer};
    ///
    /// let buf = StagingBuffer::new(BufferConfig::default());
    /// assert_eq!(buf.chunk_count(), 0);
    /// assert!(buf.is_empty());
    /// ```
    pub fn new(config: BufferConfig) -> Self {
        Self {
            chain: ChunkChain::new(),
            write_offset: 0,
            read_offset: 0,
            config,
        }
    }

    /// Creates an empty buffer from the two tunables.
    ///
    /// Returns error if either value is zero.
    pub fn with_limits(max_chunks: usize, chunk_size: usize) -> Result<Self, BufferError> {
        BufferConfig::new(max_chunks, chunk_size).map(Self::new)
    }

    /// Reserves a contiguous writable region at the tail.
    ///
    /// With `allow_short == false` the region is exactly `requested` bytes
    /// long. If the tail cannot hold that many, a new chunk is allocated: of
    /// the default size, or of exactly `requested` bytes when the request
    /// exceeds the default size.
    ///
    /// With `allow_short == true` any free space left in the tail is handed
    /// out, up to `requested` bytes, without allocating. Only a full (or
    /// missing) tail causes a new default-size chunk.
    ///
    /// The write cursor advances by the granted length before returning, so
    /// the whole region counts as produced data.
    ///
    /// # Errors
    ///
    /// - [`BufferError::ResourceExhausted`] if a new chunk is needed and the
    ///   chunk bound is reached.
    /// - [`BufferError::AllocationFailure`] if the chunk could not be
    ///   allocated.
    ///
    /// On error the buffer is left exactly as it was.
    pub fn reserve_write(
        &mut self,
        requested: usize,
        allow_short: bool,
    ) -> Result<&mut [u8], BufferError> {
        if requested == 0 {
            return Ok(Default::default());
        }

        let free = self.tail_free();
        if free == 0 || (free < requested && !allow_short) {
            self.grow(requested, allow_short)?;
        }

        let start = self.write_offset;
        let Some(tail) = self.chain.tail_mut() else {
            return Ok(Default::default());
        };
        let granted = requested.min(tail.capacity() - start);
        self.write_offset = start + granted;

        trace!(requested, granted, allow_short, "reserved write region");
        Ok(tail.region_mut(start..start + granted))
    }

    /// Reserves exactly `requested` bytes. See [`reserve_write`](Self::reserve_write).
    pub fn reserve_exact(&mut self, requested: usize) -> Result<&mut [u8], BufferError> {
        self.reserve_write(requested, false)
    }

    /// Reserves up to `requested` bytes. See [`reserve_write`](Self::reserve_write).
    pub fn reserve_short(&mut self, requested: usize) -> Result<&mut [u8], BufferError> {
        self.reserve_write(requested, true)
    }

    /// Takes the next contiguous run of unread bytes, at most `max_size` long.
    ///
    /// A run never crosses a chunk boundary. Chunks that turn out to be fully
    /// consumed are released on the way, which is what frees room for new
    /// writes. An empty slice means nothing is buffered right now; it does
    /// not mean the stream has ended.
    pub fn peek_read(&mut self, max_size: usize) -> &[u8] {
        match self.take_readable(max_size) {
            Some(range) => self
                .chain
                .head()
                .map(|head| head.region(range))
                .unwrap_or_default(),
            None => &[],
        }
    }

    /// Reads a single byte, or `None` if nothing is buffered.
    pub fn read_byte(&mut self) -> Option<u8> {
        self.peek_read(1).first().copied()
    }

    /// Appends as much of `data` as currently fits.
    ///
    /// Uses short reservations, so partially filled chunks are topped up
    /// before new ones are allocated. Returns the number of bytes copied.
    ///
    /// # Errors
    ///
    /// Fails only if not a single byte could be stored; a partial append
    /// returns `Ok` with the shorter count.
    pub fn append(&mut self, data: &[u8]) -> Result<usize, BufferError> {
        let mut written = 0;

        while written < data.len() {
            match self.reserve_write(data.len() - written, true) {
                Ok(region) => {
                    let n = region.len();
                    region.copy_from_slice(&data[written..written + n]);
                    written += n;
                }
                Err(e) if written == 0 => return Err(e),
                Err(_) => break,
            }
        }

        Ok(written)
    }

    /// Drains bytes into `out` across chunk boundaries.
    ///
    /// Returns the number of bytes copied, which is less than `out.len()`
    /// only if the buffer ran dry. Head chunks left fully consumed are
    /// released before returning, so their slots are free for writers.
    pub fn read_into(&mut self, out: &mut [u8]) -> usize {
        let mut filled = 0;

        while filled < out.len() {
            let run = self.peek_read(out.len() - filled);
            if run.is_empty() {
                break;
            }
            out[filled..filled + run.len()].copy_from_slice(run);
            filled += run.len();
        }

        // Zero-length take: releases exhausted heads, consumes nothing.
        self.take_readable(0);
        filled
    }

    /// Releases every chunk and resets all cursors.
    ///
    /// Safe to call on an empty buffer and safe to call repeatedly. The
    /// configuration is kept, so the buffer can be reused.
    pub fn destroy(&mut self) {
        let released = self.chain.clear();
        self.write_offset = 0;
        self.read_offset = 0;

        if released > 0 {
            debug!(released, "destroyed staging buffer");
        }
    }

    /// Returns the number of unread bytes.
    pub fn len(&self) -> usize {
        self.chain
            .iter()
            .enumerate()
            .map(|(i, chunk)| {
                let start = if i == 0 { self.read_offset } else { 0 };
                chunk.readable_len(self.write_offset).saturating_sub(start)
            })
            .sum()
    }

    /// Returns true if there is nothing to read.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of live chunks.
    pub fn chunk_count(&self) -> usize {
        self.chain.len()
    }

    /// Returns the chunk-count bound.
    pub fn max_chunks(&self) -> usize {
        self.config.max_chunks()
    }

    /// Returns the default chunk size.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size()
    }

    /// Returns the next free offset in the tail chunk.
    pub fn write_offset(&self) -> usize {
        self.write_offset
    }

    /// Returns the next unread offset in the head chunk.
    pub fn read_offset(&self) -> usize {
        self.read_offset
    }

    /// Returns the free space left in the tail chunk.
    pub fn tail_free(&self) -> usize {
        self.chain
            .tail()
            .map_or(0, |tail| tail.capacity() - self.write_offset)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &BufferConfig {
        &self.config
    }

    /// Returns the underlying chain.
    pub fn chunk_chain(&self) -> &ChunkChain {
        &self.chain
    }

    /// Returns the first non-empty run without consuming it.
    pub(crate) fn first_run(&self) -> &[u8] {
        for (i, chunk) in self.chain.iter().enumerate() {
            let start = if i == 0 { self.read_offset } else { 0 };
            let end = chunk.readable_len(self.write_offset);
            if start < end {
                return chunk.region(start..end);
            }
        }
        &[]
    }

    /// Appends a new tail chunk sized for `requested`.
    fn grow(&mut self, requested: usize, allow_short: bool) -> Result<(), BufferError> {
        let max_chunks = self.config.max_chunks();
        if self.chain.len() >= max_chunks {
            debug!(max_chunks, requested, "chunk bound reached, refusing write");
            return Err(BufferError::ResourceExhausted { max_chunks });
        }

        let chunk_size = self.config.chunk_size();
        let size = if requested > chunk_size && !allow_short {
            requested
        } else {
            chunk_size
        };
        let chunk = Chunk::try_alloc(size)?;

        if let Some(tail) = self.chain.tail_mut() {
            tail.seal(self.write_offset);
            trace!(sealed_len = self.write_offset, "sealed previous tail");
        }
        self.chain.push_tail(chunk);
        self.write_offset = 0;

        debug!(
            capacity = size,
            chunk_count = self.chain.len(),
            "allocated chunk"
        );
        Ok(())
    }

    /// Advances the read cursor and returns the range consumed in the head.
    ///
    /// Exhausted head chunks are released until a readable one is found or
    /// the chain is empty.
    fn take_readable(&mut self, max_size: usize) -> Option<Range<usize>> {
        loop {
            let end = self.chain.head()?.readable_len(self.write_offset);

            if self.read_offset < end {
                let start = self.read_offset;
                let n = max_size.min(end - start);
                self.read_offset = start + n;
                return Some(start..start + n);
            }

            self.release_head();
        }
    }

    fn release_head(&mut self) {
        let was_tail = self.chain.head_is_tail();
        if let Some(chunk) = self.chain.pop_head() {
            trace!(
                capacity = chunk.capacity(),
                chunk_count = self.chain.len(),
                "released drained chunk"
            );
        }

        self.read_offset = 0;
        if was_tail {
            self.write_offset = 0;
        }
    }
}

impl Default for StagingBuffer {
    fn default() -> Self {
        Self::new(BufferConfig::default())
    }
}
