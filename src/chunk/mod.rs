//! Chunk types.
//!
//! - [`Chunk`] - Fixed-capacity block of raw bytes with a sealable logical size
//! - [`ChunkChain`] - FIFO chain of chunks, head at the front, tail at the back

mod chain;
mod data;

pub use chain::ChunkChain;
pub use data::Chunk;
