//! The Chunk type - one fixed-capacity block in a staging chain.

use std::fmt;
use std::ops::Range;

use crate::error::BufferError;

/// A block of raw storage plus its fill bookkeeping.
///
/// The physical `capacity` is fixed at allocation and the storage is never
/// reallocated. The logical size starts out unset: while a chunk is the tail
/// of its chain, its valid extent is whatever the owning buffer's write
/// offset says. When a newer chunk takes over as tail the old one is
/// sealed at the amount actually written, and that length never changes
/// again.
///
/// # Example
///
/// ```
/// use confbuf::Chunk;
///
/// let chunk = Chunk::try_alloc(16)?;
/// assert_eq!(chunk.capacity(), 16);
/// assert_eq!(chunk.sealed_len(), None);
/// assert_eq!(chunk.readable_len(5), 5);
/// # Ok::<(), confbuf::BufferError>(())
/// ```
pub struct Chunk {
    storage: Box<[u8]>,
    sealed_len: Option<usize>,
}

impl Chunk {
    /// Allocates a zeroed chunk of exactly `capacity` bytes.
    ///
    /// Allocation is fallible: an allocator refusal is reported as
    /// [`BufferError::AllocationFailure`] instead of aborting.
    pub fn try_alloc(capacity: usize) -> Result<Self, BufferError> {
        let mut storage = Vec::<u8>::new();
        storage
            .try_reserve_exact(capacity)
            .map_err(|_| BufferError::AllocationFailure { size: capacity })?;
        storage.resize(capacity, 0);

        Ok(Self {
            storage: storage.into_boxed_slice(),
            sealed_len: None,
        })
    }

    /// Returns the physical capacity.
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the logical size, if the chunk has been superseded.
    pub fn sealed_len(&self) -> Option<usize> {
        self.sealed_len
    }

    /// Returns true once the chunk will receive no more writes.
    pub fn is_sealed(&self) -> bool {
        self.sealed_len.is_some()
    }

    /// Returns the end of valid data.
    ///
    /// `live_len` is the owning buffer's write offset and only applies while
    /// the chunk is unsealed.
    pub fn readable_len(&self, live_len: usize) -> usize {
        self.sealed_len.unwrap_or(live_len)
    }

    /// Returns the whole physical storage.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    /// Fixes the logical size. A sealed chunk is never resealed.
    pub(crate) fn seal(&mut self, len: usize) {
        debug_assert!(self.sealed_len.is_none(), "chunk sealed twice");
        debug_assert!(len <= self.capacity());
        self.sealed_len = Some(len.min(self.capacity()));
    }

    pub(crate) fn region(&self, range: Range<usize>) -> &[u8] {
        &self.storage[range]
    }

    pub(crate) fn region_mut(&mut self, range: Range<usize>) -> &mut [u8] {
        &mut self.storage[range]
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("capacity", &self.capacity())
            .field("sealed_len", &self.sealed_len)
            .finish()
    }
}
