//! Ordered chain of chunks.

use std::collections::VecDeque;

use super::Chunk;

/// An ordered sequence of chunks, oldest first.
///
/// The chain exclusively owns its chunks. New chunks are appended at the
/// tail and chunks are released only from the head, so the order in which
/// bytes were produced is the order in which they are consumed.
#[derive(Debug, Default)]
pub struct ChunkChain {
    chunks: VecDeque<Chunk>,
}

impl ChunkChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
        }
    }

    /// Returns the number of live chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true if the chain holds no chunks.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Returns the oldest chunk.
    pub fn head(&self) -> Option<&Chunk> {
        self.chunks.front()
    }

    /// Returns the chunk currently receiving writes.
    pub fn tail(&self) -> Option<&Chunk> {
        self.chunks.back()
    }

    pub(crate) fn tail_mut(&mut self) -> Option<&mut Chunk> {
        self.chunks.back_mut()
    }

    /// Returns true if the head and tail are the same chunk.
    pub fn head_is_tail(&self) -> bool {
        self.chunks.len() == 1
    }

    /// Iterates over the chunks from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub(crate) fn push_tail(&mut self, chunk: Chunk) {
        self.chunks.push_back(chunk);
    }

    pub(crate) fn pop_head(&mut self) -> Option<Chunk> {
        self.chunks.pop_front()
    }

    /// Releases every chunk, returning how many were freed.
    pub(crate) fn clear(&mut self) -> usize {
        let released = self.chunks.len();
        self.chunks.clear();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(capacity: usize) -> Chunk {
        Chunk::try_alloc(capacity).unwrap()
    }

    #[test]
    fn test_empty_chain() {
        let chain = ChunkChain::new();
        assert!(chain.is_empty());
        assert!(chain.head().is_none());
        assert!(chain.tail().is_none());
        assert!(!chain.head_is_tail());
    }

    #[test]
    fn test_fifo_order() {
        let mut chain = ChunkChain::new();
        chain.push_tail(chunk(1));
        assert!(chain.head_is_tail());

        chain.push_tail(chunk(2));
        chain.push_tail(chunk(3));
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.head().map(Chunk::capacity), Some(1));
        assert_eq!(chain.tail().map(Chunk::capacity), Some(3));

        let order: Vec<_> = chain.iter().map(Chunk::capacity).collect();
        assert_eq!(order, vec![1, 2, 3]);

        assert_eq!(chain.pop_head().map(|c| c.capacity()), Some(1));
        assert_eq!(chain.head().map(Chunk::capacity), Some(2));
    }

    #[test]
    fn test_clear() {
        let mut chain = ChunkChain::new();
        chain.push_tail(chunk(4));
        chain.push_tail(chunk(4));
        assert_eq!(chain.clear(), 2);
        assert!(chain.is_empty());
        assert_eq!(chain.clear(), 0);
    }
}
